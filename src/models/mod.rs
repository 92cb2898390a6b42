pub mod image;
pub mod product;

pub use image::{ImageParseError, ImageSource};
pub use product::{Product, ProductDraft, ProductSpecs};
