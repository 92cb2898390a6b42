//! Domain service for the admin credential pair.
//!
//! There is exactly one admin. Until a credential record has been written
//! the placeholder pair from [`crate::constants::credentials`] is accepted.

use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Admin identity as reported to clients. Never carries the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminInfo {
    pub username: String,
    /// `true` while the placeholder pair is still in effect.
    pub using_default_credentials: bool,
    pub updated_at: Option<String>,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if either part does not match.
    async fn login(&self, username: &str, password: &str) -> Result<AdminInfo, AuthError>;

    async fn admin_info(&self) -> Result<AdminInfo, AuthError>;

    /// Replaces username and password in a single write.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the new pair is unusable and
    /// [`AuthError::InvalidCredentials`] if `current_password` does not match.
    /// Neither changes stored state.
    async fn rotate_credentials(
        &self,
        current_password: &str,
        new_username: &str,
        new_password: &str,
    ) -> Result<AdminInfo, AuthError>;
}
