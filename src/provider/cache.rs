//! On-disk response cache keyed by a cache seed.
//!
//! Identical requests under the same seed return the stored response without
//! reaching the backend; a different seed gets a separate directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::WorkbenchError;

use super::{ModelProvider, ProviderRequest, ProviderResponse};

/// Cache directory for a seed, relative to the working directory.
pub fn default_cache_dir(seed: u64) -> PathBuf {
    PathBuf::from(".cache").join(seed.to_string())
}

/// Provider wrapper that memoizes responses on disk.
pub struct CachedProvider<P> {
    inner: P,
    dir: PathBuf,
}

impl<P: ModelProvider> CachedProvider<P> {
    pub fn new(inner: P, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Hex SHA-256 over the model id and the serialized request.
    pub fn cache_key(&self, request: &ProviderRequest) -> Result<String, WorkbenchError> {
        let mut hasher = Sha256::new();
        hasher.update(self.inner.model_id().as_bytes());
        hasher.update([0u8]);
        hasher.update(serde_json::to_vec(request)?);
        Ok(format!("{:x}", hasher.finalize()))
    }

    async fn read(&self, path: &Path) -> Option<ProviderResponse> {
        let bytes = tokio::fs::read(path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    async fn write(&self, path: &Path, response: &ProviderResponse) -> Result<(), WorkbenchError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(path, serde_json::to_vec_pretty(response)?).await?;
        Ok(())
    }
}

#[async_trait]
impl<P: ModelProvider> ModelProvider for CachedProvider<P> {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse, WorkbenchError> {
        let key = self.cache_key(request)?;
        let path = self.dir.join(format!("{key}.json"));

        if let Some(hit) = self.read(&path).await {
            debug!(key = %key, "Response cache hit");
            return Ok(hit);
        }

        let response = self.inner.generate_text(request).await?;

        match self.write(&path, &response).await {
            Ok(()) => debug!(key = %key, "Response cached"),
            Err(e) => warn!(path = %path.display(), error = %e, "Could not store cache entry"),
        }

        Ok(response)
    }
}
