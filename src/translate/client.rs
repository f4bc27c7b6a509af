use std::time::Duration;

use reqwest::Client;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::types::{ApiError, LanguageInfo, TranslateRequest, TranslateResponse};
use crate::search::Language;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translation pair {from}→{to} is not installed on the translator")]
    LanguagePairUnavailable { from: Language, to: Language },

    #[error("translator error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("translator returned no text")]
    EmptyResponse,

    #[error("translator request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
}

impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslateError::Timeout
        } else {
            TranslateError::Network(e)
        }
    }
}

/// Text-to-text translation between the two index languages.
/// Implemented by `LibreTranslateClient` for production; mock implementations used in tests.
pub trait Translator {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, TranslateError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Client for a LibreTranslate-compatible HTTP API.
///
/// The installed language list is fetched on first use and kept for the
/// client's lifetime; a failed fetch is retried on the next call.
#[derive(Debug)]
pub struct LibreTranslateClient {
    http: Client,
    base_url: String,
    api_key: Option<ApiKey>,
    timeout: Duration,
    languages: OnceCell<Vec<LanguageInfo>>,
}

impl LibreTranslateClient {
    pub fn new(http: Client, base_url: &str, api_key: Option<String>, timeout: Duration) -> Self {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(ApiKey);
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
            languages: OnceCell::new(),
        }
    }

    async fn installed_languages(&self) -> Result<&[LanguageInfo], TranslateError> {
        let languages = self
            .languages
            .get_or_try_init(|| async {
                let url = format!("{}/languages", self.base_url);
                let response = self.http.get(&url).timeout(self.timeout).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(api_error(status, &response.text().await.unwrap_or_default()));
                }
                let languages: Vec<LanguageInfo> = response.json().await?;
                debug!(count = languages.len(), "translator languages loaded");
                Ok(languages)
            })
            .await?;
        Ok(languages)
    }

    async fn ensure_pair(&self, from: Language, to: Language) -> Result<(), TranslateError> {
        let languages = self.installed_languages().await?;
        let installed = languages
            .iter()
            .any(|l| l.code == from.code() && l.targets.iter().any(|t| t == to.code()));
        if installed {
            Ok(())
        } else {
            warn!(%from, %to, "translation pair not installed");
            Err(TranslateError::LanguagePairUnavailable { from, to })
        }
    }
}

impl Translator for LibreTranslateClient {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, TranslateError> {
        self.ensure_pair(from, to).await?;

        let url = format!("{}/translate", self.base_url);
        let request = TranslateRequest {
            q: text,
            source: from.code(),
            target: to.code(),
            format: "text",
            api_key: self.api_key.as_ref().map(|k| k.0.as_str()),
        };

        let response = self
            .http
            .post(&url)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = api_error(status, &text);
            warn!(error = %err, "translator API error");
            return Err(err);
        }

        let body: TranslateResponse = response.json().await?;
        if let Some(message) = body.error {
            return Err(TranslateError::Api {
                code: status.as_u16(),
                message,
            });
        }
        body.translated_text
            .filter(|t| !t.trim().is_empty())
            .ok_or(TranslateError::EmptyResponse)
    }
}

fn api_error(status: reqwest::StatusCode, body: &str) -> TranslateError {
    let message = serde_json::from_str::<ApiError>(body)
        .ok()
        .and_then(|e| e.error)
        .unwrap_or_else(|| {
            let end = body.floor_char_boundary(200);
            format!("HTTP {status}: {}", &body[..end])
        });
    TranslateError::Api {
        code: status.as_u16(),
        message,
    }
}
