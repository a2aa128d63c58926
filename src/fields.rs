//! Intermediate field types shared by the AI and heuristic extraction paths.
//!
//! A [`FieldMap`] is what either extractor produces and what the normalizer
//! consumes. Its scalar field set is closed: both parsers populate exactly
//! these keys, unknown keys from the mapping service are routed to the
//! `extracted_fields` bag, and absent data is always the empty string —
//! never an `Option` — because the output contract forbids null/absent
//! leaves. Modelling absence as `""` here means the normalizer never has to
//! think about it again.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw text extracted from one transcript PDF.
///
/// Produced once per run by the extraction client and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Plain text content as returned by the extraction service.
    pub text: String,
    /// Base name of the source PDF.
    pub source_file: String,
    /// Length of `text` in bytes.
    pub length: usize,
}

impl ExtractedDocument {
    pub fn new(text: impl Into<String>, source_file: impl Into<String>) -> Self {
        let text = text.into();
        let length = text.len();
        Self {
            text,
            source_file: source_file.into(),
            length,
        }
    }
}

/// One course entry as seen by the extractors, before normalization.
///
/// Every field is a string; `""` means not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFields {
    pub course_code: String,
    pub course_title: String,
    pub credits_attempted: String,
    pub credits_earned: String,
    pub letter_grade: String,
    pub pass_fail: String,
    pub semester: String,
    pub year: String,
}

impl CourseFields {
    /// True when no field of the course was populated.
    pub fn is_empty(&self) -> bool {
        self.course_code.is_empty()
            && self.course_title.is_empty()
            && self.credits_attempted.is_empty()
            && self.credits_earned.is_empty()
            && self.letter_grade.is_empty()
            && self.pass_fail.is_empty()
            && self.semester.is_empty()
            && self.year.is_empty()
    }
}

/// The intermediate mapping both extraction paths produce.
///
/// The scalar key set is fixed; see the module docs for the empty-string
/// convention. Course entries keep extraction order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMap {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub student_id: String,
    pub date_of_birth: String,
    pub graduation_date: String,
    pub degree: String,
    pub major: String,
    pub gpa: String,
    pub school_name: String,
    /// Zero or more course entries, in extraction order.
    pub courses: Vec<CourseFields>,
    /// Unrecognised key/value pairs the mapping service reported.
    pub extracted_fields: BTreeMap<String, String>,
}

impl FieldMap {
    /// Whether any *required* field was located.
    ///
    /// "Required" here means the fields without which the final record is
    /// useless to downstream consumers: some form of student identity or at
    /// least one course. A parse that yields none of those counts as empty
    /// and triggers the fallback parser even when the AI path succeeded
    /// technically.
    pub fn has_required_fields(&self) -> bool {
        !self.first_name.is_empty()
            || !self.last_name.is_empty()
            || !self.full_name.is_empty()
            || !self.student_id.is_empty()
            || !self.courses.is_empty()
    }

    /// Set a scalar field by its canonical name, only if currently empty.
    ///
    /// Returning `false` for an unknown name lets callers route the value to
    /// `extracted_fields` instead. First match wins: a second candidate for
    /// an already-populated field is ignored, which is the defined tie-break
    /// for ambiguous input.
    pub fn set_if_empty(&mut self, field: &str, value: &str) -> bool {
        let slot = match field {
            "first_name" => &mut self.first_name,
            "last_name" => &mut self.last_name,
            "full_name" => &mut self.full_name,
            "student_id" => &mut self.student_id,
            "date_of_birth" => &mut self.date_of_birth,
            "graduation_date" => &mut self.graduation_date,
            "degree" => &mut self.degree,
            "major" => &mut self.major,
            "gpa" => &mut self.gpa,
            "school_name" => &mut self.school_name,
            _ => return false,
        };
        if slot.is_empty() && !value.trim().is_empty() {
            *slot = value.trim().to_string();
        }
        true
    }
}

/// Split a combined full name into (first, last) on the last whitespace token.
///
/// This is a documented approximation, not correct name parsing: multi-part
/// surnames ("Maria van der Berg") lose everything before the final token to
/// the first name. Correct name parsing is locale-dependent and out of scope.
pub fn split_full_name(full: &str) -> (String, String) {
    let full = full.trim();
    match full.rsplit_once(char::is_whitespace) {
        Some((first, last)) => (first.trim().to_string(), last.to_string()),
        None => (full.to_string(), String::new()),
    }
}
