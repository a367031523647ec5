//! Artifact stores: where exported SVGs end up.
//!
//! The engine only needs "put these bytes, give me a URL". The HTTP store
//! POSTs the raw body to `{base}/{name}` and expects `{"url": "..."}` back;
//! the directory store writes files and returns their paths.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while persisting an artifact.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("upload request failed: {0}")]
    Request(String),

    #[error("upload rejected: status {status}")]
    Status { status: u16, body: String },

    #[error("upload response parse failed: {0}")]
    Parse(String),

    #[error("invalid artifact name {0:?}")]
    InvalidName(String),

    #[error("artifact write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Persists one artifact and returns where it can be fetched.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`UploadError`] when the artifact could not be stored.
    async fn put(&self, name: &str, content_type: &str, body: Vec<u8>) -> Result<String, UploadError>;
}

// =============================================================================
// HTTP
// =============================================================================

pub struct HttpArtifactStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpArtifactStore {
    /// # Errors
    ///
    /// `HttpClientBuild` when the TLS backend cannot be initialized.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| UploadError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string() })
    }
}

#[async_trait::async_trait]
impl ArtifactStore for HttpArtifactStore {
    async fn put(&self, name: &str, content_type: &str, body: Vec<u8>) -> Result<String, UploadError> {
        let response = self
            .http
            .post(format!("{}/{name}", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| UploadError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(UploadError::Status { status, body: text });
        }
        parse_upload_response(&text)
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

/// Extract the artifact URL from an upload response body.
pub(crate) fn parse_upload_response(text: &str) -> Result<String, UploadError> {
    let parsed: UploadResponse = serde_json::from_str(text).map_err(|e| UploadError::Parse(e.to_string()))?;
    if parsed.url.trim().is_empty() {
        return Err(UploadError::Parse("empty url".into()));
    }
    Ok(parsed.url)
}

// =============================================================================
// DIRECTORY
// =============================================================================

/// Writes artifacts under a root directory; the "URL" is the file path.
pub struct DirectoryArtifactStore {
    root: PathBuf,
}

impl DirectoryArtifactStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl ArtifactStore for DirectoryArtifactStore {
    async fn put(&self, name: &str, _content_type: &str, body: Vec<u8>) -> Result<String, UploadError> {
        let relative = Path::new(name);
        if name.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(UploadError::InvalidName(name.to_string()));
        }
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, body).await?;
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
