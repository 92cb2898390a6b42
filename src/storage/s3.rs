use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, info};

use super::{ObjectStore, StorageError, object_name};
use crate::config::S3Config;

/// Images in an S3-compatible bucket, addressed publicly through
/// `public_base_url`.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    key_prefix: String,
    public_base_url: String,
}

impl S3ObjectStore {
    pub async fn new(config: &S3Config) -> anyhow::Result<Self> {
        if config.bucket.is_empty() {
            anyhow::bail!("S3 bucket name cannot be empty");
        }

        let region = Region::new(config.region.clone());

        let mut builder = match (&config.access_key_id, &config.secret_access_key) {
            (Some(key_id), Some(secret)) => {
                let credentials = Credentials::new(key_id, secret, None, None, "laptopstore");
                aws_sdk_s3::config::Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .credentials_provider(credentials)
            }
            _ => {
                let shared = aws_config::defaults(BehaviorVersion::latest()).load().await;
                aws_sdk_s3::config::Builder::from(&shared)
            }
        };

        builder = builder
            .region(region)
            .force_path_style(config.force_path_style);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(builder.build());

        info!(bucket = %config.bucket, "S3 client configured");

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            key_prefix: config.key_prefix.trim_matches('/').to_string(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn object_key(&self, name: &str) -> String {
        if self.key_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.key_prefix, name)
        }
    }

    fn key_for_reference<'a>(&self, reference: &'a str) -> Result<&'a str, StorageError> {
        reference
            .strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
            .ok_or_else(|| StorageError::ForeignReference(reference.to_string()))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(&self, bytes: Vec<u8>, mime_type: &str) -> Result<String, StorageError> {
        let key = self.object_key(&object_name(mime_type));
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(mime_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                let detail = e.message().unwrap_or("no message").to_string();
                StorageError::S3(format!("Failed to upload {key}: {e} ({detail})"))
            })?;

        info!(bucket = %self.bucket, key = %key, size, "Uploaded image");
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        let key = self.key_for_reference(reference)?;

        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => {
                debug!(bucket = %self.bucket, key = %key, "Deleted image");
                Ok(())
            }
            Err(e) if matches!(e.code(), Some("NoSuchKey" | "NotFound")) => {
                Err(StorageError::NotFound(reference.to_string()))
            }
            Err(e) => Err(StorageError::S3(format!("Failed to delete {key}: {e}"))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> S3Config {
        S3Config {
            bucket: "catalog".to_string(),
            region: "us-east-1".to_string(),
            endpoint: Some("http://localhost:9000".to_string()),
            access_key_id: Some("key".to_string()),
            secret_access_key: Some("secret".to_string()),
            public_base_url: "https://cdn.example.com/".to_string(),
            key_prefix: "/products/".to_string(),
            force_path_style: true,
        }
    }

    #[tokio::test]
    async fn test_reference_key_mapping() {
        let store = S3ObjectStore::new(&config()).await.unwrap();

        assert_eq!(store.object_key("a.png"), "products/a.png");
        assert_eq!(
            store
                .key_for_reference("https://cdn.example.com/products/a.png")
                .unwrap(),
            "products/a.png"
        );
        assert!(matches!(
            store.key_for_reference("https://elsewhere.example.com/a.png"),
            Err(StorageError::ForeignReference(_))
        ));
        assert!(store.key_for_reference("https://cdn.example.com/").is_err());
    }

    #[tokio::test]
    async fn test_empty_bucket_is_rejected() {
        let mut config = config();
        config.bucket.clear();
        assert!(S3ObjectStore::new(&config).await.is_err());
    }
}
