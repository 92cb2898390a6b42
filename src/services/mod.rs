pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AdminInfo, AuthError, AuthService};
pub use auth_service_impl::DefaultAuthService;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{CatalogError, CatalogQuery, CatalogService, ProductListing};
pub use catalog_service_impl::DefaultCatalogService;

pub mod password;
