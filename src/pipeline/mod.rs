//! Pipeline stages for transcript processing.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets the two
//! extraction paths (AI and heuristic) share the downstream stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ mapping ──▶ parse ───▶ normalize
//! (PDF→text)  (LLM call)  (FieldMap)  (TranscriptRecord)
//!      └────────── fallback ──────┘
//!                (heuristics, on mapping failure)
//! ```
//!
//! 1. [`extract`]   — PDF → plain text via the document-intelligence service
//! 2. [`mapping`]   — text → raw model response; the only optional stage
//! 3. [`parse`]     — tolerant response → [`crate::fields::FieldMap`]
//! 4. [`fallback`]  — heuristic text → `FieldMap` when mapping is unusable
//! 5. [`normalize`] — `FieldMap` → fixed-schema [`crate::record::TranscriptRecord`]

pub mod extract;
pub mod fallback;
pub mod mapping;
pub mod normalize;
pub mod parse;
