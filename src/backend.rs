//! Optional machine-translation backend used to fill gaps in the table.
//!
//! The HTTP backend speaks the LibreTranslate request shape:
//! `{q, source, target}` in, `{translatedText}` out.

use std::future::Future;
use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::config::AutoTranslateConfig;

/// Errors from a translation request. All of them are per-fragment and the
/// request is simply retried on a later cycle.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Translation service returned status {0}")]
    Status(u16),

    #[error("Malformed translation response: {0}")]
    Malformed(String),

    #[error("Translation request timed out after {0:?}")]
    Timeout(Duration),
}

/// Something that can translate a single string.
pub trait TranslationBackend {
    /// Translates `text` into the backend's target language.
    fn translate(&self, text: &str) -> impl Future<Output = Result<String, BackendError>> + Send;
}

/// Request body sent to the translation service.
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    /// Text to translate.
    q: &'a str,
    /// Source language code.
    source: &'a str,
    /// Target language code.
    target: &'a str,
    /// Always `"text"`.
    format: &'static str,
    /// Optional API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

/// Response body returned by the translation service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    /// Translated text.
    translated_text: String,
}

/// HTTP translation backend.
#[derive(Debug, Clone)]
pub struct HttpTranslationBackend {
    /// Shared HTTP client.
    client: reqwest::Client,
    /// Full URL of the translate endpoint.
    endpoint: String,
    /// Source language code.
    source_language: String,
    /// Target language code.
    target_language: String,
    /// Optional API key sent with each request.
    api_key: Option<String>,
    /// Upper bound for one request/response exchange.
    timeout: Duration,
}

impl HttpTranslationBackend {
    /// Creates a backend from the `autoTranslate` settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &AutoTranslateConfig) -> Result<Self, BackendError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            api_key: config.api_key.clone(),
            timeout,
        })
    }

    /// Sends one request without the outer timeout.
    async fn send(&self, text: &str) -> Result<String, BackendError> {
        let request = TranslateRequest {
            q: text,
            source: &self.source_language,
            target: &self.target_language,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

impl TranslationBackend for HttpTranslationBackend {
    fn translate(&self, text: &str) -> impl Future<Output = Result<String, BackendError>> + Send {
        async move {
            match tokio::time::timeout(self.timeout, self.send(text)).await {
                Ok(result) => result,
                Err(_) => Err(BackendError::Timeout(self.timeout)),
            }
        }
    }
}

/// Extracts the translated text from a response body.
fn parse_response(body: &str) -> Result<String, BackendError> {
    let response: TranslateResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Malformed(e.to_string()))?;
    Ok(response.translated_text)
}
