//! S3 API client implementation.

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use aws_types::region::Region;
use tokio::io::AsyncRead;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Object storage operations used by the download and export pipelines.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file to `bucket/key`.
    async fn upload_file(&self, bucket: &str, path: &Path, key: &str) -> StorageResult<()>;

    /// Download `bucket/key` to a local file, creating parent directories.
    async fn download_file(&self, bucket: &str, key: &str, path: &Path) -> StorageResult<()>;

    /// Whether `bucket/key` exists.
    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool>;
}

/// Configuration for the S3 client.
#[derive(Debug, Clone, Default)]
pub struct S3Config {
    /// Custom endpoint (R2, MinIO); `None` uses AWS
    pub endpoint_url: Option<String>,
    /// Static credentials; when unset the default AWS provider chain is used
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: String,
    /// Path-style addressing, required by most non-AWS endpoints
    pub force_path_style: bool,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let access_key_id = non_empty("S3_ACCESS_KEY_ID");
        let secret_access_key = non_empty("S3_SECRET_ACCESS_KEY");
        if access_key_id.is_some() != secret_access_key.is_some() {
            return Err(StorageError::config_error(
                "S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY must be set together",
            ));
        }

        let endpoint_url = non_empty("S3_ENDPOINT_URL");
        Ok(Self {
            force_path_style: non_empty("S3_FORCE_PATH_STYLE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(endpoint_url.is_some()),
            endpoint_url,
            access_key_id,
            secret_access_key,
            region: non_empty("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        })
    }
}

/// Content type for an artifact, by file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => "application/json",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// S3-compatible storage client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Create a new client from configuration.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let mut builder = match (&config.access_key_id, &config.secret_access_key) {
            (Some(key), Some(secret)) => Builder::new()
                .behavior_version(BehaviorVersion::latest())
                .credentials_provider(Credentials::new(key, secret, None, None, "static")),
            _ => {
                let shared = aws_config::defaults(BehaviorVersion::latest()).load().await;
                Builder::from(&shared)
            }
        };

        builder = builder
            .region(Region::new(config.region))
            .force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        Self::new(S3Config::from_env()?).await
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn upload_file(&self, bucket: &str, path: &Path, key: &str) -> StorageResult<()> {
        debug!("Uploading {} to {}/{}", path.display(), bucket, key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type_for(path))
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to {}/{}", path.display(), bucket, key);
        Ok(())
    }

    async fn download_file(&self, bucket: &str, key: &str, path: &Path) -> StorageResult<()> {
        debug!("Downloading {}/{} to {}", bucket, key, path.display());

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("NoSuchKey") {
                    StorageError::not_found(key)
                } else {
                    StorageError::download_failed(e.to_string())
                }
            })?;

        let written = write_stream(response.body.into_async_read(), path).await?;

        info!("Downloaded {} to {} ({} bytes)", key, path.display(), written);
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(StorageError::AwsSdk(e.to_string()))
                }
            }
        }
    }
}

/// Stream `reader` into `path` via a `.part` sibling that is renamed on
/// success and removed on failure.
async fn write_stream<R: AsyncRead>(reader: R, path: &Path) -> StorageResult<u64> {
    tokio::pin!(reader);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = std::path::PathBuf::from(part);

    let mut file = tokio::fs::File::create(&part).await?;
    let copied = match tokio::io::copy(&mut reader, &mut file).await {
        Ok(n) => n,
        Err(e) => {
            drop(file);
            let _ = tokio::fs::remove_file(&part).await;
            return Err(StorageError::download_failed(e.to_string()));
        }
    };
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&part, path).await?;
    Ok(copied)
}
