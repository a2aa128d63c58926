//! Console rendering of a [`TranscriptRecord`].
//!
//! Pure string assembly, kept out of the binary so the human-readable
//! summary is testable. Empty fields are omitted from the console view —
//! the fixed-shape guarantee applies to the JSON output, not to what a
//! human wants to scan on a terminal.

use crate::record::TranscriptRecord;
use std::fmt::Write;

/// Render a human-readable summary of the record.
pub fn render_summary(record: &TranscriptRecord) -> String {
    let mut out = String::new();
    let rule = "=".repeat(70);
    let thin = "-".repeat(40);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "TRANSCRIPT PROCESSING RESULTS");
    let _ = writeln!(out, "{rule}");

    let _ = writeln!(out, "\nSTUDENT INFORMATION:\n{thin}");
    let p = &record.student_information.personal_details;
    let a = &record.student_information.academic_details;
    for (label, value) in [
        ("Full Name", &p.full_name),
        ("Student Id", &p.student_id),
        ("Date Of Birth", &p.date_of_birth),
        ("School Name", &a.school_name),
        ("Degree", &a.degree),
        ("Major", &a.major),
        ("Graduation Date", &a.graduation_date),
        ("Gpa", &a.gpa),
    ] {
        if !value.is_empty() {
            let _ = writeln!(out, "{label}: {value}");
        }
    }

    let courses = &record.academic_record.courses;
    let _ = writeln!(out, "\nCOURSES ({} found):\n{thin}", courses.len());
    if courses.is_empty() {
        let _ = writeln!(out, "No courses extracted");
    } else {
        for (i, c) in courses.iter().enumerate() {
            let _ = writeln!(out, "\nCourse {}:", i + 1);
            for (label, value) in [
                ("Course Code", &c.course_code),
                ("Course Title", &c.course_title),
                ("Credits Attempted", &c.credits_attempted),
                ("Credits Earned", &c.credits_earned),
                ("Letter Grade", &c.letter_grade),
                ("Academic Period", &c.academic_period),
            ] {
                if !value.is_empty() {
                    let _ = writeln!(out, "  {label}: {value}");
                }
            }
        }
    }

    let s = &record.academic_record.summary_statistics;
    let _ = writeln!(out, "\nSUMMARY:\n{thin}");
    let _ = writeln!(out, "Total Courses: {}", s.total_courses);
    let _ = writeln!(out, "Total Credits Attempted: {}", s.total_credits_attempted);
    let _ = writeln!(out, "Total Credits Earned: {}", s.total_credits_earned);
    if !s.overall_gpa.is_empty() {
        let _ = writeln!(out, "Overall GPA: {}", s.overall_gpa);
    }

    if !record.additional_information.extracted_fields.is_empty() {
        let _ = writeln!(out, "\nADDITIONAL INFORMATION:\n{thin}");
        for (key, value) in &record.additional_information.extracted_fields {
            let _ = writeln!(out, "{key}: {value}");
        }
    }

    let _ = writeln!(out, "\n{rule}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CourseRecord;

    #[test]
    fn summary_lists_courses_and_totals() {
        let mut record = TranscriptRecord::default();
        record.student_information.personal_details.full_name = "John Doe".into();
        record.academic_record.courses.push(CourseRecord {
            course_code: "CS101".into(),
            letter_grade: "A".into(),
            ..Default::default()
        });
        record.academic_record.summary_statistics.total_courses = 1;
        record.academic_record.summary_statistics.total_credits_attempted = "3".into();

        let text = render_summary(&record);
        assert!(text.contains("John Doe"));
        assert!(text.contains("COURSES (1 found):"));
        assert!(text.contains("CS101"));
        assert!(text.contains("Total Credits Attempted: 3"));
    }

    #[test]
    fn empty_record_renders_without_panicking() {
        let text = render_summary(&TranscriptRecord::default());
        assert!(text.contains("No courses extracted"));
        // Empty scalar fields are omitted from the console view.
        assert!(!text.contains("Full Name:"));
    }
}
