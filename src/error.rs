//! Error types for the transcript2json library.
//!
//! Two kinds of failure exist and they are deliberately not treated alike:
//!
//! * **Fatal** — the run cannot proceed at all (missing input file, not a
//!   PDF, extraction-service failure: without extracted text there is
//!   nothing to fall back on). Returned as `Err(TranscriptError)` from the
//!   top-level `process*` functions.
//!
//! * **Recovered** — the field-mapping service is unconfigured or errored.
//!   [`TranscriptError::MappingUnavailable`] and
//!   [`TranscriptError::MappingError`] exist so the pipeline can name the
//!   failure internally, but the orchestrator swallows them, logs a warning
//!   and switches to the heuristic fallback parser. They are never surfaced
//!   to the end user as a failed run.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the transcript2json library.
///
/// The mapping variants are recovered internally by the fallback parser;
/// everything else is fatal.
#[derive(Debug, Error)]
pub enum TranscriptError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The document-intelligence service has no endpoint/key configured.
    #[error(
        "Document extraction service is not configured.\n\
         Set document_intelligence.endpoint and .key in the config file,\n\
         or DOC_INTELLIGENCE_ENDPOINT / DOC_INTELLIGENCE_KEY in the environment."
    )]
    ExtractionNotConfigured,

    /// The extraction service returned an error for this document.
    #[error("Text extraction failed for '{source_file}': {detail}")]
    ExtractionFailed { source_file: String, detail: String },

    /// The analyze operation did not reach a terminal status in time.
    #[error("Text extraction timed out after {secs}s for '{source_file}'\nIncrease --extraction-timeout.")]
    ExtractionTimeout { source_file: String, secs: u64 },

    // ── Mapping errors (recovered by the fallback parser) ─────────────────
    /// The field-mapping service has no endpoint/key/deployment configured.
    ///
    /// Not fatal: the orchestrator routes the run to the fallback parser.
    #[error("Field-mapping service is not configured")]
    MappingUnavailable,

    /// The field-mapping service call failed (network, API, timeout).
    ///
    /// Not fatal: the orchestrator routes the run to the fallback parser.
    #[error("Field-mapping service call failed: {detail}")]
    MappingError { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Configuration file was present but unreadable or malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TranscriptError {
    /// Whether this failure is recovered by switching to the fallback parser.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TranscriptError::MappingUnavailable | TranscriptError::MappingError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_errors_are_recoverable() {
        assert!(TranscriptError::MappingUnavailable.is_recoverable());
        assert!(TranscriptError::MappingError {
            detail: "HTTP 503".into()
        }
        .is_recoverable());
    }

    #[test]
    fn extraction_errors_are_fatal() {
        let e = TranscriptError::ExtractionFailed {
            source_file: "t.pdf".into(),
            detail: "HTTP 500".into(),
        };
        assert!(!e.is_recoverable());
        assert!(e.to_string().contains("t.pdf"));
    }

    #[test]
    fn timeout_display() {
        let e = TranscriptError::ExtractionTimeout {
            source_file: "t.pdf".into(),
            secs: 120,
        };
        assert!(e.to_string().contains("120s"));
    }

    #[test]
    fn not_a_pdf_display() {
        let e = TranscriptError::NotAPdf {
            path: PathBuf::from("notes.txt"),
            magic: *b"Dear",
        };
        assert!(e.to_string().contains("notes.txt"));
    }
}
