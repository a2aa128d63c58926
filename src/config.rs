//! Configuration for the transcript processing pipeline.
//!
//! All behaviour is controlled through one immutable [`ProcessorConfig`]
//! constructed at startup and passed to the two service clients. Keeping
//! every credential and knob in one struct avoids ambient global state and
//! makes it trivial to serialise a (redacted) config for logging or to diff
//! two runs to understand why their outputs differ.
//!
//! Missing AI-service credentials are *not* an error: an unconfigured
//! mapping service deterministically routes every run to the heuristic
//! fallback parser, and an unconfigured extraction service fails only when
//! extraction is actually attempted.

use crate::error::TranscriptError;
use serde::Deserialize;
use std::path::Path;

/// Credentials for the document-intelligence (text extraction) service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentIntelligenceConfig {
    /// Service endpoint, e.g. `https://<resource>.cognitiveservices.azure.com`.
    #[serde(default)]
    pub endpoint: String,
    /// API key for the service.
    #[serde(default)]
    pub key: String,
}

/// Credentials for the language-model (field mapping) service.
#[derive(Debug, Clone, Deserialize)]
pub struct AzureOpenAiConfig {
    /// Service endpoint, e.g. `https://<resource>.openai.azure.com`.
    #[serde(default)]
    pub endpoint: String,
    /// API key for the service.
    #[serde(default)]
    pub key: String,
    /// Chat-completions deployment name.
    #[serde(default = "default_deployment")]
    pub deployment_name: String,
}

impl Default for AzureOpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            key: String::new(),
            deployment_name: default_deployment(),
        }
    }
}

fn default_deployment() -> String {
    "gpt-35-turbo".to_string()
}

/// Immutable configuration for one processing run.
///
/// Load it from a JSON file with [`ProcessorConfig::from_file`], from the
/// environment with [`ProcessorConfig::from_env`], or with the file-first /
/// environment-fallback policy of [`ProcessorConfig::load`].
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorConfig {
    /// Text-extraction service credentials.
    #[serde(default)]
    pub document_intelligence: DocumentIntelligenceConfig,

    /// Field-mapping service credentials.
    #[serde(default)]
    pub azure_openai: AzureOpenAiConfig,

    /// Overall deadline for the extraction call, polling included. Default: 120.
    ///
    /// The analyze operation is asynchronous on the service side; a stuck
    /// operation would otherwise block the run forever.
    #[serde(default = "default_extraction_timeout")]
    pub extraction_timeout_secs: u64,

    /// Per-call timeout for the field-mapping request. Default: 60.
    ///
    /// A mapping timeout is treated as [`TranscriptError::MappingError`] and
    /// therefore recovered by the fallback parser, so a generous value only
    /// delays — never dooms — the run.
    #[serde(default = "default_mapping_timeout")]
    pub mapping_timeout_secs: u64,
}

fn default_extraction_timeout() -> u64 {
    120
}

fn default_mapping_timeout() -> u64 {
    60
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            document_intelligence: DocumentIntelligenceConfig::default(),
            azure_openai: AzureOpenAiConfig::default(),
            extraction_timeout_secs: default_extraction_timeout(),
            mapping_timeout_secs: default_mapping_timeout(),
        }
    }
}

impl ProcessorConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TranscriptError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TranscriptError::InvalidConfig(format!("cannot read '{}': {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            TranscriptError::InvalidConfig(format!("malformed '{}': {}", path.display(), e))
        })
    }

    /// Build configuration from environment variables.
    ///
    /// Recognised variables: `DOC_INTELLIGENCE_ENDPOINT`,
    /// `DOC_INTELLIGENCE_KEY`, `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_KEY`,
    /// `AZURE_OPENAI_DEPLOYMENT`. Unset variables yield empty fields, which
    /// simply mark the corresponding service as unconfigured.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self {
            document_intelligence: DocumentIntelligenceConfig {
                endpoint: var("DOC_INTELLIGENCE_ENDPOINT"),
                key: var("DOC_INTELLIGENCE_KEY"),
            },
            azure_openai: AzureOpenAiConfig {
                endpoint: var("AZURE_OPENAI_ENDPOINT"),
                key: var("AZURE_OPENAI_KEY"),
                deployment_name: match std::env::var("AZURE_OPENAI_DEPLOYMENT") {
                    Ok(d) if !d.is_empty() => d,
                    _ => default_deployment(),
                },
            },
            ..Self::default()
        }
    }

    /// Load from `path` if it exists, otherwise fall back to the environment.
    ///
    /// A missing file is routine (first run, env-only deployment) and logged
    /// at `warn!`; a present-but-malformed file is a hard error, because
    /// silently ignoring a typo'd config would misroute every run to the
    /// fallback parser.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TranscriptError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(
                "Config file '{}' not found; using environment variables",
                path.display()
            );
            Ok(Self::from_env())
        }
    }

    /// Whether the text-extraction service has usable credentials.
    pub fn is_extraction_configured(&self) -> bool {
        !self.document_intelligence.endpoint.is_empty()
            && !self.document_intelligence.key.is_empty()
    }

    /// Whether the field-mapping service has usable credentials.
    pub fn is_mapping_configured(&self) -> bool {
        !self.azure_openai.endpoint.is_empty()
            && !self.azure_openai.key.is_empty()
            && !self.azure_openai.deployment_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_unconfigured() {
        let c = ProcessorConfig::default();
        assert!(!c.is_extraction_configured());
        assert!(!c.is_mapping_configured());
        assert_eq!(c.azure_openai.deployment_name, "gpt-35-turbo");
    }

    #[test]
    fn from_file_partial_keys() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{"document_intelligence": {{"endpoint": "https://di.example", "key": "k1"}}}}"#
        )
        .unwrap();

        let c = ProcessorConfig::from_file(f.path()).unwrap();
        assert!(c.is_extraction_configured());
        assert!(!c.is_mapping_configured());
        assert_eq!(c.extraction_timeout_secs, 120);
    }

    #[test]
    fn from_file_full() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{
                "document_intelligence": {{"endpoint": "https://di.example", "key": "k1"}},
                "azure_openai": {{"endpoint": "https://oai.example", "key": "k2", "deployment_name": "gpt-4o"}},
                "mapping_timeout_secs": 30
            }}"#
        )
        .unwrap();

        let c = ProcessorConfig::from_file(f.path()).unwrap();
        assert!(c.is_mapping_configured());
        assert_eq!(c.azure_openai.deployment_name, "gpt-4o");
        assert_eq!(c.mapping_timeout_secs, 30);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{{not json").unwrap();
        assert!(matches!(
            ProcessorConfig::from_file(f.path()),
            Err(TranscriptError::InvalidConfig(_))
        ));
    }

    #[test]
    fn load_missing_file_falls_back_to_env() {
        let c = ProcessorConfig::load("/nonexistent/transcript2json-config.json").unwrap();
        // Cannot assert on real env vars here; the important property is that
        // a missing file is not an error.
        assert_eq!(c.extraction_timeout_secs, 120);
    }
}
