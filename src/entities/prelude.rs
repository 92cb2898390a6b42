pub use super::admin_credentials::Entity as AdminCredentials;
pub use super::products::Entity as Products;
