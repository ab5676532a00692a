//! Object storage backends for uploaded materials.
//!
//! Two implementations of [`ObjectStorage`]:
//! - [`SupabaseStorageBackend`] reads from Supabase Storage over HTTP with the
//!   service role key.
//! - [`FilesystemBackend`] reads `{base_path}/{bucket}/{path}` from disk, for
//!   local development and tests.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use studia_core::defaults::MAX_FILE_BYTES;
use studia_core::{Error, ObjectStorage, Result};

/// Reject paths that could escape the bucket directory.
fn validate_object_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::InvalidInput("Storage path is empty".to_string()));
    }
    let escapes = Path::new(path)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(Error::InvalidInput(format!(
            "Storage path must be relative without '..': {}",
            path
        )));
    }
    Ok(())
}

// =============================================================================
// FILESYSTEM
// =============================================================================

/// Filesystem storage backend.
pub struct FilesystemBackend {
    base_path: PathBuf,
    max_object_bytes: usize,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given base directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            max_object_bytes: MAX_FILE_BYTES,
        }
    }

    /// Refuse objects larger than `limit` without reading them.
    pub fn with_max_object_bytes(mut self, limit: usize) -> Self {
        self.max_object_bytes = limit;
        self
    }

    fn full_path(&self, bucket: &str, path: &str) -> Result<PathBuf> {
        validate_object_path(bucket)?;
        validate_object_path(path)?;
        Ok(self.base_path.join(bucket).join(path))
    }

    /// Check that the base directory exists and is readable.
    ///
    /// Run at startup to catch misconfigured mounts early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let meta = fs::metadata(&self.base_path)
            .await
            .map_err(|e| format!("metadata({:?}): {}", self.base_path, e))?;
        if !meta.is_dir() {
            return Err(format!("{:?} is not a directory", self.base_path));
        }
        fs::read_dir(&self.base_path)
            .await
            .map_err(|e| format!("read_dir({:?}): {}", self.base_path, e))?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for FilesystemBackend {
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(bucket, path)?;
        debug!(storage_path = %path, full_path = %full_path.display(), "file_storage: read");
        if let Ok(meta) = fs::metadata(&full_path).await {
            let size = usize::try_from(meta.len()).unwrap_or(usize::MAX);
            if size > self.max_object_bytes {
                return Err(Error::FileTooLarge {
                    size,
                    limit: self.max_object_bytes,
                });
            }
        }
        fs::read(&full_path).await.map_err(|e| {
            warn!(full_path = %full_path.display(), error = %e, "file_storage: read failed");
            Error::Storage(format!("Failed to read {}/{}: {}", bucket, path, e))
        })
    }

    fn name(&self) -> &str {
        "filesystem"
    }
}

// =============================================================================
// SUPABASE STORAGE
// =============================================================================

/// Supabase Storage backend.
///
/// Downloads with `GET {url}/storage/v1/object/{bucket}/{path}` using the
/// service role key. Callers must have verified ownership beforehand.
pub struct SupabaseStorageBackend {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    max_object_bytes: usize,
}

impl SupabaseStorageBackend {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            service_key: service_key.into(),
            max_object_bytes: MAX_FILE_BYTES,
        })
    }

    /// Stop downloading once an object exceeds `limit` bytes.
    pub fn with_max_object_bytes(mut self, limit: usize) -> Self {
        self.max_object_bytes = limit;
        self
    }

    /// Create from `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::Config("SUPABASE_URL is not set".to_string()))?;
        let service_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .map_err(|_| Error::Config("SUPABASE_SERVICE_ROLE_KEY is not set".to_string()))?;
        Self::new(base_url, service_key)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(bucket),
            encoded.join("/")
        )
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorageBackend {
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>> {
        validate_object_path(path)?;
        let url = self.object_url(bucket, path);
        debug!(storage_path = %path, bucket, "supabase_storage: download");

        let mut response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Download request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "Storage returned {} for {}/{}: {}",
                status, bucket, path, body
            )));
        }

        let limit = self.max_object_bytes;
        if let Some(declared) = response.content_length() {
            let size = usize::try_from(declared).unwrap_or(usize::MAX);
            if size > limit {
                return Err(Error::FileTooLarge { size, limit });
            }
        }

        let mut data = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::Storage(format!("Failed to read download body: {}", e)))?
        {
            if data.len() + chunk.len() > limit {
                return Err(Error::FileTooLarge {
                    size: data.len() + chunk.len(),
                    limit,
                });
            }
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }

    fn name(&self) -> &str {
        "supabase"
    }
}
