pub mod prelude;

pub mod admin_credentials;
pub mod products;
