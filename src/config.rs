use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub storage: StorageConfig,

    pub images: ImagesConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Admin sessions expire after this much inactivity.
    pub session_inactivity_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            secure_cookies: true,
            session_inactivity_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file holding the whole product list.
    Json,
    /// A SeaORM-managed database.
    Database,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    pub json_path: String,

    pub credentials_path: String,

    pub database_url: String,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            json_path: "data/products.json".to_string(),
            credentials_path: "data/credentials.json".to_string(),
            database_url: "sqlite:data/laptopstore.db".to_string(),
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageBackend {
    Local,
    S3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub backend: ImageBackend,

    /// Directory for the local backend; served under `public_prefix`.
    pub local_path: String,

    pub public_prefix: String,

    /// Largest accepted decoded image, in bytes (default: 5 MiB)
    pub max_image_bytes: usize,

    pub s3: S3Config,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            backend: ImageBackend::Local,
            local_path: "data/images".to_string(),
            public_prefix: "/images".to_string(),
            max_image_bytes: 5 * 1024 * 1024,
            s3: S3Config::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub bucket: String,

    pub region: String,

    /// Custom endpoint for S3-compatible providers (MinIO, R2, Storj...)
    pub endpoint: Option<String>,

    /// Static credentials. When unset the default AWS provider chain is used.
    pub access_key_id: Option<String>,

    pub secret_access_key: Option<String>,

    /// Public URL prefix that hosted references are built from.
    pub public_base_url: String,

    pub key_prefix: String,

    pub force_path_style: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            public_base_url: String::new(),
            key_prefix: "products".to_string(),
            force_path_style: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    pub min_password_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            min_password_length: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "laptopstore".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("laptopstore").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".laptopstore").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.storage.backend {
            StorageBackend::Json => {
                if self.storage.json_path.trim().is_empty() {
                    anyhow::bail!("storage.json_path cannot be empty for the json backend");
                }
                if self.storage.credentials_path.trim().is_empty() {
                    anyhow::bail!("storage.credentials_path cannot be empty for the json backend");
                }
            }
            StorageBackend::Database => {
                if self.storage.database_url.trim().is_empty() {
                    anyhow::bail!("storage.database_url cannot be empty for the database backend");
                }
                if self.storage.max_db_connections == 0 {
                    anyhow::bail!("storage.max_db_connections must be > 0");
                }
                if self.storage.min_db_connections > self.storage.max_db_connections {
                    anyhow::bail!(
                        "storage.min_db_connections cannot exceed storage.max_db_connections"
                    );
                }
            }
        }

        match self.images.backend {
            ImageBackend::Local => {
                if self.images.local_path.trim().is_empty() {
                    anyhow::bail!("images.local_path cannot be empty for the local backend");
                }
                let prefix = self.images.public_prefix.trim_end_matches('/');
                if !prefix.starts_with('/') || prefix.len() < 2 {
                    anyhow::bail!("images.public_prefix must be an absolute path like /images");
                }
            }
            ImageBackend::S3 => {
                if self.images.s3.bucket.trim().is_empty() {
                    anyhow::bail!("images.s3.bucket cannot be empty for the s3 backend");
                }
                if self.images.s3.public_base_url.trim().is_empty() {
                    anyhow::bail!("images.s3.public_base_url cannot be empty for the s3 backend");
                }
            }
        }

        if self.images.max_image_bytes == 0 {
            anyhow::bail!("images.max_image_bytes must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.images.backend, ImageBackend::Local);
        assert_eq!(config.images.public_prefix, "/images");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[images]"));
        assert!(toml_str.contains("backend = \"json\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [storage]
            backend = "database"
            database_url = "sqlite::memory:"

            [images.s3]
            bucket = "laptops"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.storage.backend, StorageBackend::Database);
        assert_eq!(config.images.s3.bucket, "laptops");
        assert_eq!(config.images.s3.region, "us-east-1");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_validate_rejects_incomplete_s3() {
        let mut config = Config::default();
        config.images.backend = ImageBackend::S3;
        assert!(config.validate().is_err());

        config.images.s3.bucket = "laptops".to_string();
        config.images.s3.public_base_url = "https://cdn.example.com".to_string();
        assert!(config.validate().is_ok());
    }
}
