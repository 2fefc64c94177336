use crate::util::is_http_retryable;
use futures::future::BoxFuture;
use serde_json::Value;
use std::path::PathBuf;
use url::Url;

mod deepgram;
mod saved;

pub use deepgram::DeepgramClient;
pub use saved::SavedResponseProvider;

/// Audio handed to a speech provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioSource {
    File(PathBuf),
    Url(Url),
}

impl std::fmt::Display for AudioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("no Deepgram API key configured")]
    MissingApiKey,

    #[error("invalid provider url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("http error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error {0}: {1}")]
    HttpStatus(u16, String),

    #[error("input exceeds the provider's analysis limit: {0}")]
    InputTooLarge(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Maps a non-success response onto an error. Rejections of oversized
    /// input come back as 400 or 413 with a body mentioning the token limit.
    pub fn from_status(status: u16, body: String) -> Self {
        if matches!(status, 400 | 413) && body.to_lowercase().contains("token") {
            Self::InputTooLarge(body)
        } else {
            Self::HttpStatus(status, body)
        }
    }

    /// Transient failures: connect and timeout errors plus retryable statuses.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_connect() || e.is_timeout(),
            Self::HttpStatus(status, _) => is_http_retryable(*status),
            _ => false,
        }
    }
}

/// A speech-intelligence service that turns audio into raw analysis JSON.
pub trait SpeechProvider: Send + Sync {
    fn analyze(&self, source: AudioSource) -> BoxFuture<'_, Result<Value, ProviderError>>;
}
