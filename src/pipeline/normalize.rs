//! Schema normalizer: [`FieldMap`] → [`TranscriptRecord`].
//!
//! The last pure stage of the pipeline, and the one that guarantees the
//! output contract: every schema key present for every input, string leaves
//! defaulting to `""`, and summary statistics recomputed from the course
//! list — never taken verbatim from the mapping service — so the totals and
//! the courses can never disagree.

use crate::fields::{split_full_name, ExtractedDocument, FieldMap};
use crate::record::{
    AcademicDetails, AcademicRecord, AdditionalInformation, CourseRecord, PersonalDetails,
    RawData, RecordMetadata, StudentInformation, SummaryStatistics, TranscriptRecord,
    PROCESSING_VERSION,
};

/// Build the final normalized record.
///
/// `source_file` is recorded in the metadata; the extracted text and its
/// length are preserved under `raw_data` for audit and re-processing.
pub fn normalize(
    mut fields: FieldMap,
    document: &ExtractedDocument,
    source_file: &str,
) -> TranscriptRecord {
    reconcile_names(&mut fields);

    let courses: Vec<CourseRecord> = fields.courses.iter().map(course_record).collect();
    let summary = summarize(&courses, &fields.gpa);

    TranscriptRecord {
        metadata: RecordMetadata {
            processing_timestamp: chrono::Utc::now().to_rfc3339(),
            source_file: source_file.to_string(),
            processing_version: PROCESSING_VERSION.to_string(),
            total_courses: courses.len(),
        },
        student_information: StudentInformation {
            personal_details: PersonalDetails {
                first_name: fields.first_name,
                last_name: fields.last_name,
                full_name: fields.full_name,
                student_id: fields.student_id,
                date_of_birth: fields.date_of_birth,
            },
            academic_details: AcademicDetails {
                school_name: fields.school_name,
                degree: fields.degree,
                major: fields.major,
                graduation_date: fields.graduation_date,
                gpa: fields.gpa,
            },
        },
        academic_record: AcademicRecord {
            courses,
            summary_statistics: summary,
        },
        additional_information: AdditionalInformation {
            honors_awards: Vec::new(),
            transfer_credits: Vec::new(),
            notes: Vec::new(),
            extracted_fields: fields.extracted_fields,
        },
        raw_data: RawData {
            extracted_text: document.text.clone(),
            text_length: document.length,
        },
    }
}

/// Fill whichever name form is missing from the other.
///
/// When only the combined form is present it is split on the last
/// whitespace token — a documented approximation (see
/// [`crate::fields::split_full_name`]), deliberately left as-is.
fn reconcile_names(fields: &mut FieldMap) {
    if fields.first_name.is_empty() && fields.last_name.is_empty() && !fields.full_name.is_empty() {
        let (first, last) = split_full_name(&fields.full_name);
        fields.first_name = first;
        fields.last_name = last;
    } else if fields.full_name.is_empty() {
        fields.full_name = format!("{} {}", fields.first_name, fields.last_name)
            .trim()
            .to_string();
    }
}

/// Map one intermediate course entry onto the output shape.
fn course_record(c: &crate::fields::CourseFields) -> CourseRecord {
    CourseRecord {
        course_code: c.course_code.clone(),
        course_title: c.course_title.clone(),
        credits_attempted: c.credits_attempted.clone(),
        credits_earned: c.credits_earned.clone(),
        letter_grade: c.letter_grade.clone(),
        semester: c.semester.clone(),
        year: c.year.clone(),
        academic_period: format!("{} {}", c.semester, c.year).trim().to_string(),
    }
}

/// Recompute summary statistics from the normalized course list.
fn summarize(courses: &[CourseRecord], gpa: &str) -> SummaryStatistics {
    let attempted: f64 = courses
        .iter()
        .map(|c| parse_credits(&c.credits_attempted))
        .sum();
    let earned: f64 = courses
        .iter()
        .map(|c| parse_credits(&c.credits_earned))
        .sum();

    SummaryStatistics {
        total_credits_attempted: format_credits(attempted),
        total_credits_earned: format_credits(earned),
        overall_gpa: gpa.to_string(),
        total_courses: courses.len(),
    }
}

/// Coerce a free-text credit value to a number; garbage contributes zero.
///
/// Tolerates unit suffixes ("3 credits", "4.0 cr") by keeping only digits
/// and the decimal point, which is how values arrive from both extraction
/// paths.
fn parse_credits(value: &str) -> f64 {
    let numeric: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    numeric.parse().unwrap_or(0.0)
}

/// Render a credit total as a string, dropping a trailing `.0`.
fn format_credits(total: f64) -> String {
    if (total.fract()).abs() < f64::EPSILON {
        format!("{}", total as i64)
    } else {
        format!("{total}")
    }
}
