//! Extraction client: PDF bytes → plain text via the document-intelligence
//! service.
//!
//! ## Why validate before calling the service?
//!
//! The analyze API bills per page and takes seconds to respond. Checking
//! existence, readability, and the `%PDF` magic bytes locally means a typo'd
//! path or a renamed `.docx` fails in microseconds with a precise error
//! instead of a cryptic HTTP 400 from the service.
//!
//! ## Operation polling
//!
//! The layout analysis is asynchronous on the service side: the initial POST
//! returns `202 Accepted` with an `operation-location` header, and the
//! result is polled from that URL until the status is terminal. The whole
//! exchange runs under one caller-supplied deadline so a stuck operation
//! surfaces as [`TranscriptError::ExtractionTimeout`] rather than hanging
//! the run.

use crate::config::ProcessorConfig;
use crate::error::TranscriptError;
use crate::fields::ExtractedDocument;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const ANALYZE_API_VERSION: &str = "2024-11-30";
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Client for the document-intelligence text extraction service.
pub struct ExtractionClient {
    http: reqwest::Client,
    endpoint: String,
    key: String,
    timeout: Duration,
}

// Manual impl: the API key must never reach logs or panic messages.
impl fmt::Debug for ExtractionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionClient")
            .field("endpoint", &self.endpoint)
            .field("key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ExtractionClient {
    /// Build a client from the run configuration.
    ///
    /// Fails immediately when the service is unconfigured: unlike the
    /// mapping service there is no fallback for extraction, so surfacing the
    /// problem before reading the PDF gives the clearest error.
    pub fn from_config(config: &ProcessorConfig) -> Result<Self, TranscriptError> {
        if !config.is_extraction_configured() {
            return Err(TranscriptError::ExtractionNotConfigured);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.extraction_timeout_secs))
            .build()
            .map_err(|e| TranscriptError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            http,
            endpoint: config.document_intelligence.endpoint.trim_end_matches('/').to_string(),
            key: config.document_intelligence.key.clone(),
            timeout: Duration::from_secs(config.extraction_timeout_secs),
        })
    }

    /// Extract plain text from the PDF at `pdf_path`.
    pub async fn extract(&self, pdf_path: impl AsRef<Path>) -> Result<ExtractedDocument, TranscriptError> {
        let path = pdf_path.as_ref();
        let bytes = read_pdf_bytes(path)?;
        let source_file = file_name(path);

        info!("Submitting '{}' for layout analysis ({} bytes)", source_file, bytes.len());

        let operation_url = self.begin_analyze(&source_file, bytes).await?;
        let text = self.poll_result(&source_file, &operation_url).await?;

        info!("Extracted {} bytes of text from '{}'", text.len(), source_file);
        Ok(ExtractedDocument::new(text, source_file))
    }

    /// POST the document; return the operation URL to poll.
    async fn begin_analyze(&self, source_file: &str, bytes: Vec<u8>) -> Result<String, TranscriptError> {
        let url = format!(
            "{}/documentintelligence/documentModels/prebuilt-layout:analyze?api-version={}",
            self.endpoint, ANALYZE_API_VERSION
        );

        let response = self
            .http
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/pdf")
            .body(bytes)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(source_file, e))?;

        if !response.status().is_success() {
            return Err(TranscriptError::ExtractionFailed {
                source_file: source_file.to_string(),
                detail: format!("analyze request returned HTTP {}", response.status()),
            });
        }

        response
            .headers()
            .get("operation-location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| TranscriptError::ExtractionFailed {
                source_file: source_file.to_string(),
                detail: "service accepted the document but returned no operation-location".into(),
            })
    }

    /// Poll the operation URL until a terminal status or the deadline.
    async fn poll_result(&self, source_file: &str, operation_url: &str) -> Result<String, TranscriptError> {
        let deadline = tokio::time::Instant::now() + self.timeout;

        loop {
            if tokio::time::Instant::now() >= deadline {
                return Err(TranscriptError::ExtractionTimeout {
                    source_file: source_file.to_string(),
                    secs: self.timeout.as_secs(),
                });
            }

            let body: serde_json::Value = self
                .http
                .get(operation_url)
                .header("Ocp-Apim-Subscription-Key", &self.key)
                .send()
                .await
                .map_err(|e| self.classify_transport_error(source_file, e))?
                .json()
                .await
                .map_err(|e| TranscriptError::ExtractionFailed {
                    source_file: source_file.to_string(),
                    detail: format!("malformed poll response: {e}"),
                })?;

            let status = body["status"].as_str().unwrap_or("");
            debug!("Analyze operation status: {status}");

            match status {
                "succeeded" => {
                    let content = body["analyzeResult"]["content"].as_str().unwrap_or("");
                    return Ok(content.to_string());
                }
                "failed" => {
                    let detail = body["error"]["message"]
                        .as_str()
                        .unwrap_or("analyze operation failed")
                        .to_string();
                    return Err(TranscriptError::ExtractionFailed {
                        source_file: source_file.to_string(),
                        detail,
                    });
                }
                // "running" / "notStarted"
                _ => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }

    fn classify_transport_error(&self, source_file: &str, e: reqwest::Error) -> TranscriptError {
        if e.is_timeout() {
            TranscriptError::ExtractionTimeout {
                source_file: source_file.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            TranscriptError::ExtractionFailed {
                source_file: source_file.to_string(),
                detail: e.to_string(),
            }
        }
    }
}

/// Read the PDF, validating existence, readability, and magic bytes.
pub fn read_pdf_bytes(path: &Path) -> Result<Vec<u8>, TranscriptError> {
    if !path.exists() {
        return Err(TranscriptError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(TranscriptError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(TranscriptError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(TranscriptError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    Ok(bytes)
}

/// Base name of the input path, for metadata and error messages.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_file_not_found() {
        let err = read_pdf_bytes(Path::new("/no/such/transcript.pdf")).unwrap_err();
        assert!(matches!(err, TranscriptError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_is_rejected_with_magic() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "Dear student, congratulations").unwrap();

        let err = read_pdf_bytes(f.path()).unwrap_err();
        match err {
            TranscriptError::NotAPdf { magic, .. } => assert_eq!(&magic, b"Dear"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n%fake body").unwrap();

        let bytes = read_pdf_bytes(f.path()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn unconfigured_extraction_fails_fast() {
        let err = ExtractionClient::from_config(&ProcessorConfig::default()).unwrap_err();
        assert!(matches!(err, TranscriptError::ExtractionNotConfigured));
    }

    #[test]
    fn debug_output_redacts_the_api_key() {
        let mut config = ProcessorConfig::default();
        config.document_intelligence.endpoint = "https://di.example".into();
        config.document_intelligence.key = "super-secret-key".into();

        let client = ExtractionClient::from_config(&config).unwrap();
        let rendered = format!("{client:?}");
        assert!(rendered.contains("https://di.example"));
        assert!(!rendered.contains("super-secret-key"));
    }

    #[test]
    fn file_name_takes_base_name() {
        assert_eq!(file_name(Path::new("/tmp/records/t1.pdf")), "t1.pdf");
    }
}
