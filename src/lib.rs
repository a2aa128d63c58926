//! # transcript2json
//!
//! Convert academic transcript PDFs into a normalized JSON record.
//!
//! ## Why this crate?
//!
//! Every institution lays out its transcripts differently, but downstream
//! systems (student-records databases, enrollment pipelines) want one
//! schema. This crate extracts the PDF's text through a document-
//! intelligence service, maps it to fields with a language-model service,
//! and normalizes the result into a fixed-shape [`TranscriptRecord`] —
//! identical key set and nesting for every input, empty strings for absent
//! data, and summary statistics recomputed from the course list so they can
//! never disagree with it.
//!
//! When the mapping service is unconfigured or unreachable the run does not
//! fail: a heuristic fallback parser extracts what it can directly from the
//! text. Degraded precision, same schema, exit code 0.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract    document-intelligence layout analysis → plain text
//!  ├─ 2. Map        language-model field extraction (if configured)
//!  ├─ 3. Parse      tolerant response → FieldMap
//!  │     └─ Fallback  heuristic regex scans when 2/3 are unusable
//!  ├─ 4. Normalize  FieldMap → fixed-schema TranscriptRecord
//!  └─ 5. Present    console summary and/or atomic JSON file write
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use transcript2json::{process, ProcessorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProcessorConfig::load("config.json")?;
//!     let record = process("transcript.pdf", &config).await?;
//!     println!("{}", serde_json::to_string_pretty(&record)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `transcript2json` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! transcript2json = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod fields;
pub mod pipeline;
pub mod presenter;
pub mod process;
pub mod prompts;
pub mod record;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::ProcessorConfig;
pub use error::TranscriptError;
pub use fields::{ExtractedDocument, FieldMap};
pub use pipeline::fallback::fallback_parse;
pub use pipeline::mapping::{AzureOpenAiBackend, MappingBackend};
pub use pipeline::parse::parse;
pub use process::{
    process, process_extracted, process_sync, process_to_file, resolve_fields, ExtractionPath,
};
pub use record::TranscriptRecord;
