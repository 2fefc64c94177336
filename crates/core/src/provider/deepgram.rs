use crate::config::{ApiKey, ProviderConfig};
use crate::provider::{AudioSource, ProviderError, SpeechProvider};
use crate::util::{retry_with_backoff, RetryConfig};
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use url::Url;

const LOG_TARGET: &str = "provider::deepgram";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Serialize)]
struct UrlRequest<'a> {
    url: &'a str,
}

enum Payload {
    Audio {
        bytes: Bytes,
        content_type: &'static str,
    },
    Url(Url),
}

/// Deepgram pre-recorded audio analysis over the REST API.
#[derive(Clone)]
pub struct DeepgramClient {
    client: Client,
    api_key: ApiKey,
    endpoint: Url,
    retry: RetryConfig,
}

impl DeepgramClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key.clone().ok_or(ProviderError::MissingApiKey)?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: listen_url(config)?,
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send_once(&self, payload: &Payload) -> Result<Value, ProviderError> {
        let request = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("Token {}", self.api_key.expose()));
        let request = match payload {
            Payload::Audio {
                bytes,
                content_type,
            } => request.header(CONTENT_TYPE, *content_type).body(bytes.clone()),
            Payload::Url(url) => request.json(&UrlRequest { url: url.as_str() }),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(target: LOG_TARGET, status = status.as_u16(), %body, "request rejected");
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

impl SpeechProvider for DeepgramClient {
    fn analyze(&self, source: AudioSource) -> BoxFuture<'_, Result<Value, ProviderError>> {
        async move {
            let payload = match source {
                AudioSource::File(path) => {
                    let bytes = Bytes::from(tokio::fs::read(&path).await?);
                    tracing::info!(
                        target: LOG_TARGET,
                        path = %path.display(),
                        bytes = bytes.len(),
                        "analyzing local file"
                    );
                    Payload::Audio {
                        bytes,
                        content_type: content_type_for(&path),
                    }
                }
                AudioSource::Url(url) => {
                    tracing::info!(target: LOG_TARGET, %url, "analyzing remote url");
                    Payload::Url(url)
                }
            };

            retry_with_backoff(&self.retry, || self.send_once(&payload), ProviderError::is_retryable)
                .await
        }
        .boxed()
    }
}

/// `{base}/v1/listen` with the configured model and feature flags as query
/// parameters. Disabled features are omitted.
pub(crate) fn listen_url(config: &ProviderConfig) -> Result<Url, ProviderError> {
    let base = config.base_url.trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/v1/listen"))?;
    {
        let features = &config.features;
        let mut query = url.query_pairs_mut();
        query.append_pair("model", &config.model);
        query.append_pair("language", &config.language);
        for (name, enabled) in [
            ("sentiment", features.sentiment),
            ("intents", features.intents),
            ("topics", features.topics),
            ("smart_format", features.smart_format),
            ("diarize", features.diarize),
        ] {
            if enabled {
                query.append_pair(name, "true");
            }
        }
        if let Some(version) = &features.summarize {
            query.append_pair("summarize", version);
        }
    }
    Ok(url)
}

pub(crate) fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}
