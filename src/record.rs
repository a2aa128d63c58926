//! The fixed output schema: [`TranscriptRecord`] and its sub-groups.
//!
//! The shape invariant of the whole crate lives here: every field of every
//! struct is always serialised, for every input, no matter how sparse the
//! extraction was. There is not a single `skip_serializing_if` in this file
//! and that is deliberate — downstream consumers key on a stable schema and
//! must never have to probe for missing keys. String leaves default to `""`,
//! never null.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version string written into `metadata.processing_version`.
pub const PROCESSING_VERSION: &str = "1.0";

/// Run metadata: when, from what, by which schema version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// RFC 3339 timestamp of the normalization step.
    pub processing_timestamp: String,
    /// Base name of the source PDF.
    pub source_file: String,
    /// Fixed schema version, see [`PROCESSING_VERSION`].
    pub processing_version: String,
    /// Number of courses in `academic_record.courses`.
    pub total_courses: usize,
}

/// Personal identity sub-group of `student_information`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub student_id: String,
    pub date_of_birth: String,
}

/// Academic sub-group of `student_information`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicDetails {
    pub school_name: String,
    pub degree: String,
    pub major: String,
    pub graduation_date: String,
    pub gpa: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInformation {
    pub personal_details: PersonalDetails,
    pub academic_details: AcademicDetails,
}

/// One normalized course entry.
///
/// `academic_period` is derived from semester + year at normalization time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub course_code: String,
    pub course_title: String,
    pub credits_attempted: String,
    pub credits_earned: String,
    pub letter_grade: String,
    pub semester: String,
    pub year: String,
    pub academic_period: String,
}

/// Totals recomputed from the course list at normalization time.
///
/// Never taken verbatim from the mapping service, so the totals and the
/// course list can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Sum of numeric-looking `credits_attempted` values; `"0"` when empty.
    pub total_credits_attempted: String,
    /// Sum of numeric-looking `credits_earned` values; `"0"` when empty.
    pub total_credits_earned: String,
    pub overall_gpa: String,
    pub total_courses: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcademicRecord {
    /// Ordered as extracted; not guaranteed chronological.
    pub courses: Vec<CourseRecord>,
    pub summary_statistics: SummaryStatistics,
}

/// Empty-by-default lists reserved for future extraction categories, plus
/// the bag of unrecognised fields the mapping service reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalInformation {
    pub honors_awards: Vec<String>,
    pub transfer_credits: Vec<String>,
    pub notes: Vec<String>,
    pub extracted_fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawData {
    /// The full extracted text, preserved for audit and re-processing.
    pub extracted_text: String,
    pub text_length: usize,
}

/// The final normalized record — the only artifact a run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub metadata: RecordMetadata,
    pub student_information: StudentInformation,
    pub academic_record: AcademicRecord,
    pub additional_information: AdditionalInformation,
    pub raw_data: RawData,
}
