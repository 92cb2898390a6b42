//! `CredentialStore`-backed implementation of the `AuthService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::constants::credentials::{DEFAULT_PASSWORD, DEFAULT_USERNAME};
use crate::db::{CredentialRecord, CredentialStore, now_timestamp};
use crate::services::auth_service::{AdminInfo, AuthError, AuthService};
use crate::services::password::{hash_password_blocking, verify_password_blocking};

pub struct DefaultAuthService {
    credentials: Arc<dyn CredentialStore>,
    security: SecurityConfig,
}

impl DefaultAuthService {
    #[must_use]
    pub const fn new(credentials: Arc<dyn CredentialStore>, security: SecurityConfig) -> Self {
        Self {
            credentials,
            security,
        }
    }

    /// Checks `password` against whatever pair is currently in effect.
    async fn password_matches(
        &self,
        record: Option<&CredentialRecord>,
        password: &str,
    ) -> Result<bool, AuthError> {
        match record {
            Some(record) => Ok(verify_password_blocking(password, &record.password_hash).await?),
            None => Ok(password == DEFAULT_PASSWORD),
        }
    }

    fn info_for(record: Option<&CredentialRecord>) -> AdminInfo {
        record.map_or_else(
            || AdminInfo {
                username: DEFAULT_USERNAME.to_string(),
                using_default_credentials: true,
                updated_at: None,
            },
            |r| AdminInfo {
                username: r.username.clone(),
                using_default_credentials: false,
                updated_at: Some(r.updated_at.clone()),
            },
        )
    }

    fn validate_new_pair(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::Validation("New username is required".to_string()));
        }
        if username.trim() != username {
            return Err(AuthError::Validation(
                "New username must not start or end with whitespace".to_string(),
            ));
        }
        if password.chars().count() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "New password must be at least {} characters",
                self.security.min_password_length
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthService for DefaultAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<AdminInfo, AuthError> {
        let record = self.credentials.get().await?;
        let info = Self::info_for(record.as_ref());

        let username_ok = info.username == username;
        let password_ok = self.password_matches(record.as_ref(), password).await?;

        if !(username_ok && password_ok) {
            warn!(username = %username, "Rejected admin login");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(info)
    }

    async fn admin_info(&self) -> Result<AdminInfo, AuthError> {
        let record = self.credentials.get().await?;
        Ok(Self::info_for(record.as_ref()))
    }

    async fn rotate_credentials(
        &self,
        current_password: &str,
        new_username: &str,
        new_password: &str,
    ) -> Result<AdminInfo, AuthError> {
        self.validate_new_pair(new_username, new_password)?;

        let record = self.credentials.get().await?;
        if !self
            .password_matches(record.as_ref(), current_password)
            .await?
        {
            warn!("Credential rotation rejected: current password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let replacement = CredentialRecord {
            username: new_username.to_string(),
            password_hash: hash_password_blocking(new_password, &self.security).await?,
            updated_at: now_timestamp(),
        };
        self.credentials.set(&replacement).await?;

        info!(username = %replacement.username, "Admin credentials rotated");
        Ok(Self::info_for(Some(&replacement)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::JsonFileStore;

    async fn service() -> (tempfile::TempDir, DefaultAuthService) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(
            dir.path().join("products.json"),
            dir.path().join("credentials.json"),
        )
        .await
        .unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        (dir, DefaultAuthService::new(Arc::new(store), security))
    }

    #[tokio::test]
    async fn test_placeholder_pair_before_first_rotation() {
        let (_dir, auth) = service().await;

        let info = auth.login("admin", "admin123").await.unwrap();
        assert!(info.using_default_credentials);
        assert!(matches!(
            auth.login("admin", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("root", "admin123").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_rotation_replaces_both_parts() {
        let (_dir, auth) = service().await;

        let info = auth
            .rotate_credentials("admin123", "owner", "new-secret-1")
            .await
            .unwrap();
        assert_eq!(info.username, "owner");
        assert!(!info.using_default_credentials);

        assert!(auth.login("owner", "new-secret-1").await.is_ok());
        assert!(matches!(
            auth.login("admin", "admin123").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.rotate_credentials("admin123", "again", "another-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_wrong_current_password_changes_nothing() {
        let (_dir, auth) = service().await;

        let err = auth
            .rotate_credentials("guess", "owner", "new-secret-1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(auth.admin_info().await.unwrap().using_default_credentials);
    }

    #[tokio::test]
    async fn test_rejects_unusable_new_pair() {
        let (_dir, auth) = service().await;

        assert!(matches!(
            auth.rotate_credentials("admin123", "  ", "long-enough").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            auth.rotate_credentials("admin123", "owner", "short").await,
            Err(AuthError::Validation(_))
        ));
    }
}
