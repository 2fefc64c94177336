use crate::provider::{AudioSource, ProviderError, SpeechProvider};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "provider::saved";

/// Replays a provider response saved to disk, for offline analysis.
#[derive(Clone, Debug)]
pub struct SavedResponseProvider {
    path: PathBuf,
}

impl SavedResponseProvider {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SpeechProvider for SavedResponseProvider {
    fn analyze(&self, source: AudioSource) -> BoxFuture<'_, Result<Value, ProviderError>> {
        async move {
            tracing::debug!(
                target: LOG_TARGET,
                path = %self.path.display(),
                ignored_source = %source,
                "loading saved response"
            );
            let raw = tokio::fs::read_to_string(&self.path).await?;
            serde_json::from_str(&raw).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
        }
        .boxed()
    }
}
