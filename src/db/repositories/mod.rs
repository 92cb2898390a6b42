pub mod credentials;
pub mod product;
