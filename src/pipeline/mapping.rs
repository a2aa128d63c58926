//! Field-mapping client: extracted text → best-effort structured response
//! from the language-model service.
//!
//! The service is consumed through the [`MappingBackend`] trait rather than
//! a concrete client so the orchestrator's path selection (AI vs. heuristic)
//! is a capability decision, not scattered branching — and so tests can
//! substitute a counting double and assert the backend is never called when
//! unconfigured.
//!
//! Both failure kinds ([`TranscriptError::MappingUnavailable`] and
//! [`TranscriptError::MappingError`]) are recovered identically by the
//! caller; this module only names them precisely.

use crate::config::ProcessorConfig;
use crate::error::TranscriptError;
use crate::prompts::{mapping_user_prompt, MAPPING_SYSTEM_PROMPT};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const CHAT_API_VERSION: &str = "2024-12-01-preview";

/// Sampling temperature for the mapping request. Low and deterministic:
/// the task is transcription of facts already on the page, not generation.
const MAPPING_TEMPERATURE: f64 = 0.1;

/// Generous output budget so long course lists are not truncated mid-JSON.
const MAPPING_MAX_TOKENS: u64 = 3000;

/// Capability seam for the field-mapping service.
///
/// `is_configured` is consulted by the orchestrator *before* any call; an
/// unconfigured backend must never receive a `map_fields` invocation.
pub trait MappingBackend: Send + Sync {
    /// Whether the backend has usable credentials.
    fn is_configured(&self) -> bool;

    /// Send the extracted text and return the raw model response.
    fn map_fields<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<String, TranscriptError>>;
}

/// The production backend: Azure OpenAI chat completions.
pub struct AzureOpenAiBackend {
    http: reqwest::Client,
    endpoint: String,
    key: String,
    deployment: String,
    configured: bool,
}

impl AzureOpenAiBackend {
    /// Build the backend from the run configuration.
    ///
    /// Never fails: missing credentials yield a backend that reports itself
    /// unconfigured, which routes the run to the fallback parser.
    pub fn from_config(config: &ProcessorConfig) -> Self {
        // A builder failure here means the TLS backend could not
        // initialise. Losing the timeout beats failing construction: any
        // later call on a degraded client comes back as MappingError and is
        // recovered by the fallback parser like every other mapping failure.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.mapping_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            endpoint: config.azure_openai.endpoint.trim_end_matches('/').to_string(),
            key: config.azure_openai.key.clone(),
            deployment: config.azure_openai.deployment_name.clone(),
            configured: config.is_mapping_configured(),
        }
    }

    async fn request(&self, text: &str) -> Result<String, TranscriptError> {
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, CHAT_API_VERSION
        );

        let body = json!({
            "messages": [
                { "role": "system", "content": MAPPING_SYSTEM_PROMPT },
                { "role": "user", "content": mapping_user_prompt(text) }
            ],
            "temperature": MAPPING_TEMPERATURE,
            "max_tokens": MAPPING_MAX_TOKENS,
        });

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranscriptError::MappingError {
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TranscriptError::MappingError {
                detail: format!("chat completions returned HTTP {}", response.status()),
            });
        }

        let payload: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| TranscriptError::MappingError {
                    detail: format!("malformed completion response: {e}"),
                })?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(TranscriptError::MappingError {
                detail: "empty response from mapping service".into(),
            });
        }

        debug!("Mapping service returned {} bytes", content.len());
        Ok(content)
    }
}

impl MappingBackend for AzureOpenAiBackend {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn map_fields<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<String, TranscriptError>> {
        async move {
            if !self.configured {
                return Err(TranscriptError::MappingUnavailable);
            }
            self.request(text).await
        }
        .boxed()
    }
}
