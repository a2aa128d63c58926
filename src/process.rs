//! Top-level processing entry points.
//!
//! The run is linear with exactly one branch point:
//!
//! ```text
//! Extracting ──▶ MappingOrFallback ──▶ Normalizing ──▶ Done
//!                 ├─ AI path        (service configured and healthy)
//!                 └─ Heuristic path (unconfigured, failed, or empty parse)
//! ```
//!
//! Mapping failures are a *degrade-gracefully* policy, not an error: the
//! run still exits successfully with a lower-precision record. Only input
//! and extraction failures are fatal, because without extracted text there
//! is nothing to fall back on.

use crate::config::ProcessorConfig;
use crate::error::TranscriptError;
use crate::fields::{ExtractedDocument, FieldMap};
use crate::pipeline::extract::ExtractionClient;
use crate::pipeline::mapping::{AzureOpenAiBackend, MappingBackend};
use crate::pipeline::{fallback, normalize, parse};
use crate::record::TranscriptRecord;
use std::path::Path;
use tracing::{info, warn};

/// Which extraction path produced the field mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPath {
    /// The mapping service responded and the parse yielded required fields.
    Mapping,
    /// The heuristic fallback parser ran on the extracted text.
    Fallback,
}

/// Process a transcript PDF end to end.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Fails only for fatal conditions: bad input file, unconfigured or failing
/// extraction service. An unusable mapping service is recovered internally
/// via the fallback parser and still yields `Ok`.
pub async fn process(
    pdf_path: impl AsRef<Path>,
    config: &ProcessorConfig,
) -> Result<TranscriptRecord, TranscriptError> {
    let pdf_path = pdf_path.as_ref();
    info!("Starting transcript processing for '{}'", pdf_path.display());

    let extraction = ExtractionClient::from_config(config)?;
    let document = extraction.extract(pdf_path).await?;

    let backend = AzureOpenAiBackend::from_config(config);
    let (record, path) = process_extracted(&document, &backend).await;
    info!(
        "Processing complete via {:?} path: {} courses",
        path,
        record.academic_record.summary_statistics.total_courses
    );
    Ok(record)
}

/// Run the mapping-or-fallback branch and normalization on already-extracted
/// text.
///
/// Infallible by design: every failure mode of the mapping path degrades to
/// the heuristic parser, and both parsers always produce a full `FieldMap`.
/// Exposed publicly so callers with their own extraction (or tests with a
/// backend double) can reuse the downstream pipeline.
pub async fn process_extracted(
    document: &ExtractedDocument,
    backend: &dyn MappingBackend,
) -> (TranscriptRecord, ExtractionPath) {
    let (fields, path) = resolve_fields(&document.text, backend).await;
    let record = normalize::normalize(fields, document, &document.source_file);
    (record, path)
}

/// Choose the extraction path and produce the intermediate mapping.
///
/// The backend is consulted for configuration *before* any call is made:
/// an unconfigured service deterministically routes to the fallback parser
/// without a network attempt.
pub async fn resolve_fields(
    text: &str,
    backend: &dyn MappingBackend,
) -> (FieldMap, ExtractionPath) {
    if !backend.is_configured() {
        warn!("Field-mapping service not configured; using fallback parser");
        return (fallback::fallback_parse(text), ExtractionPath::Fallback);
    }

    match backend.map_fields(text).await {
        Ok(raw) => {
            let fields = parse::parse(&raw);
            if fields.has_required_fields() {
                info!("Field mapping succeeded via mapping service");
                (fields, ExtractionPath::Mapping)
            } else {
                warn!("Mapping response contained no usable fields; using fallback parser");
                (fallback::fallback_parse(text), ExtractionPath::Fallback)
            }
        }
        Err(e) => {
            warn!("Field mapping failed ({e}); using fallback parser");
            (fallback::fallback_parse(text), ExtractionPath::Fallback)
        }
    }
}

/// Process a transcript and write the record to `output_path` as JSON.
///
/// The write is atomic (temp file + rename): no partial or corrupt JSON is
/// ever visible at the output path, even if the process is interrupted.
pub async fn process_to_file(
    pdf_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ProcessorConfig,
) -> Result<TranscriptRecord, TranscriptError> {
    let record = process(pdf_path, config).await?;
    write_record(&record, output_path.as_ref()).await?;
    Ok(record)
}

/// Serialise a record and write it atomically.
pub async fn write_record(
    record: &TranscriptRecord,
    path: &Path,
) -> Result<(), TranscriptError> {
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| TranscriptError::Internal(format!("serialising record: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TranscriptError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    // Appended to the full file name: `with_extension` would replace an
    // existing extension, so "report.v1" and "report.v2" in one directory
    // would share a temp name.
    let mut tmp_name = path
        .file_name()
        .map_or_else(|| std::ffi::OsString::from("record.json"), |n| n.to_os_string());
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    tokio::fs::write(&tmp_path, &json)
        .await
        .map_err(|e| TranscriptError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| TranscriptError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!("Wrote normalized record to '{}'", path.display());
    Ok(())
}

/// Synchronous wrapper around [`process`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_sync(
    pdf_path: impl AsRef<Path>,
    config: &ProcessorConfig,
) -> Result<TranscriptRecord, TranscriptError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| TranscriptError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(process(pdf_path, config))
}
