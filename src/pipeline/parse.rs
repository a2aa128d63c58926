//! Response parser: mapping-service output → [`FieldMap`].
//!
//! ## Why never fail?
//!
//! The response is model-generated text. It *should* be the JSON layout the
//! prompt demands, but models wrap JSON in markdown fences, add prose, drop
//! keys, or return something else entirely. A partial mapping is strictly
//! more useful downstream than an aborted run, so this module's contract is
//! to always return a `FieldMap` — worst case all-empty, which the
//! orchestrator detects and routes to the fallback parser.
//!
//! Parsing is attempted structured-first: strip fences, locate the JSON
//! object, walk it tolerantly (synonym keys, numbers and nulls coerced to
//! strings). Only when no JSON object can be deserialised does the parser
//! drop to line-oriented `label: value` scanning anchored on the known
//! field labels.

use crate::fields::{CourseFields, FieldMap};
use crate::pipeline::fallback::scan_course_row;
use serde_json::Value;
use tracing::debug;

/// Ordered label table for line-oriented scanning.
///
/// Order matters twice: more specific labels come before generic ones
/// ("first name" before "name"), and the first matching line wins for each
/// field — the defined tie-break for ambiguous input.
pub(crate) const FIELD_LABELS: &[(&str, &[&str])] = &[
    ("first_name", &["first name", "given name"]),
    ("last_name", &["last name", "surname", "family name"]),
    ("student_id", &["student id", "student number", "id number"]),
    ("date_of_birth", &["date of birth", "dob", "birth date", "birthdate"]),
    ("graduation_date", &["graduation date", "date of graduation", "graduated"]),
    ("degree", &["degree", "degree awarded", "program"]),
    ("major", &["major", "field of study"]),
    ("gpa", &["gpa", "grade point average", "cumulative gpa"]),
    ("school_name", &["school name", "school", "institution", "university", "college"]),
    ("full_name", &["full name", "student name", "name", "student"]),
];

/// Parse a raw mapping-service response into a `FieldMap`. Never fails.
pub fn parse(raw_response: &str) -> FieldMap {
    let candidate = extract_json_block(raw_response);

    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        if value.is_object() {
            return from_json(&value);
        }
    }

    debug!("Mapping response is not JSON; falling back to line scanning");
    from_lines(raw_response)
}

/// Strip markdown fences / surrounding prose and return the JSON body.
fn extract_json_block(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            if end > start {
                return &trimmed[start..=end];
            }
        }
    }

    trimmed
}

/// Coerce a JSON leaf to the empty-string-for-absent convention.
///
/// The prompt asks for `null` on missing data, but models sometimes emit
/// the string `"null"` instead; both map to `""`.
fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) if s.trim().eq_ignore_ascii_case("null") => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Walk a parsed JSON object into a `FieldMap`.
fn from_json(value: &Value) -> FieldMap {
    let mut map = FieldMap::default();

    // The prompt's layout nests scalars under "student_info"; tolerate flat
    // objects too.
    let student = value.get("student_info").unwrap_or(value);
    if let Some(obj) = student.as_object() {
        for (key, val) in obj {
            let text = coerce(val);
            if text.is_empty() {
                continue;
            }
            let canonical = canonical_field(key);
            if !map.set_if_empty(canonical, &text) {
                map.extracted_fields.insert(key.clone(), text);
            }
        }
    }

    if let Some(courses) = value.get("courses").and_then(Value::as_array) {
        for entry in courses {
            if let Some(obj) = entry.as_object() {
                let mut course = CourseFields::default();
                for (key, val) in obj {
                    let text = coerce(val);
                    let slot = match canonical_course_field(key) {
                        Some(s) => s,
                        None => continue,
                    };
                    let field = match slot {
                        "course_code" => &mut course.course_code,
                        "course_title" => &mut course.course_title,
                        "credits_attempted" => &mut course.credits_attempted,
                        "credits_earned" => &mut course.credits_earned,
                        "letter_grade" => &mut course.letter_grade,
                        "pass_fail" => &mut course.pass_fail,
                        "semester" => &mut course.semester,
                        "year" => &mut course.year,
                        _ => continue,
                    };
                    if field.is_empty() {
                        *field = text;
                    }
                }
                if !course.is_empty() {
                    map.courses.push(course);
                }
            }
        }
    }

    if let Some(extra) = value.get("additional_info").and_then(Value::as_object) {
        for (key, val) in extra {
            let text = coerce(val);
            if !text.is_empty() {
                map.extracted_fields.insert(key.clone(), text);
            }
        }
    }

    map
}

/// Map a scalar JSON key to the closed field set (identity for known keys,
/// synonyms for common model variations).
fn canonical_field(key: &str) -> &str {
    match key.to_ascii_lowercase().as_str() {
        "firstname" | "given_name" => "first_name",
        "lastname" | "surname" | "family_name" => "last_name",
        "name" | "fullname" | "student_name" => "full_name",
        "id" | "studentid" | "student_number" => "student_id",
        "dob" | "birth_date" | "birthdate" => "date_of_birth",
        "graduation" => "graduation_date",
        "school" | "institution" | "university" => "school_name",
        _ => match key {
            "first_name" | "last_name" | "full_name" | "student_id" | "date_of_birth"
            | "graduation_date" | "degree" | "major" | "gpa" | "school_name" => key,
            other => other,
        },
    }
}

/// Map a course JSON key to the `CourseFields` slot, `None` for unknowns.
fn canonical_course_field(key: &str) -> Option<&'static str> {
    Some(match key.to_ascii_lowercase().as_str() {
        "course_code" | "code" => "course_code",
        "course_title" | "course_description" | "title" | "description" | "course_name" => {
            "course_title"
        }
        "credits_attempted" | "credits" | "credit_hours" => "credits_attempted",
        "credits_earned" | "earned" => "credits_earned",
        "letter_grade" | "grade" => "letter_grade",
        "pass_fail" => "pass_fail",
        "semester" | "term" => "semester",
        "year" => "year",
        _ => return None,
    })
}

/// Line-oriented `label: value` scan for non-JSON responses.
///
/// Uses the field labels as anchors, case-insensitively, with the same
/// first-match-wins rule as the JSON path. Lines that do not look like
/// labelled values are offered to the course-row heuristic so textual course
/// listings still come through.
fn from_lines(raw: &str) -> FieldMap {
    let mut map = FieldMap::default();

    for line in raw.lines() {
        let line = line.trim().trim_start_matches(['-', '*', '•']).trim();
        if line.is_empty() {
            continue;
        }

        if let Some((label, value)) = line.split_once(':') {
            let label_norm = label.trim().to_ascii_lowercase();
            let value = value.trim();
            if value.is_empty() || value.eq_ignore_ascii_case("null") {
                continue;
            }

            if let Some((field, _)) = FIELD_LABELS
                .iter()
                .find(|(_, labels)| labels.contains(&label_norm.as_str()))
            {
                map.set_if_empty(field, value);
                continue;
            }

            // Unrecognised but plausible label — keep it in the bag rather
            // than dropping information the model thought worth reporting.
            if label_norm.len() <= 40 && !label_norm.contains("http") {
                map.extracted_fields
                    .entry(label_norm.replace([' ', '-'], "_"))
                    .or_insert_with(|| value.to_string());
                continue;
            }
        }

        if let Some(course) = scan_course_row(line) {
            map.courses.push(course);
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prompt_shaped_json() {
        let raw = r#"{
            "student_info": {
                "first_name": "Jane",
                "last_name": "Smith",
                "student_id": "S-4471",
                "gpa": 3.85,
                "school_name": null
            },
            "courses": [
                {"course_code": "BIO110", "course_title": "Biology I",
                 "credits_attempted": "4", "letter_grade": "B+",
                 "semester": "Fall", "year": "2021"}
            ],
            "additional_info": {"honors": "Dean's List"}
        }"#;

        let map = parse(raw);
        assert_eq!(map.first_name, "Jane");
        assert_eq!(map.last_name, "Smith");
        assert_eq!(map.student_id, "S-4471");
        assert_eq!(map.gpa, "3.85"); // number coerced to string
        assert_eq!(map.school_name, ""); // null coerced to empty
        assert_eq!(map.courses.len(), 1);
        assert_eq!(map.courses[0].course_code, "BIO110");
        assert_eq!(map.courses[0].letter_grade, "B+");
        assert_eq!(map.extracted_fields["honors"], "Dean's List");
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "Here you go:\n```json\n{\"student_info\": {\"first_name\": \"Omar\"}, \"courses\": []}\n```\nDone.";
        let map = parse(raw);
        assert_eq!(map.first_name, "Omar");
        assert!(map.courses.is_empty());
    }

    #[test]
    fn course_synonym_keys_are_accepted() {
        let raw = r#"{"courses": [{"code": "HIST20", "course_description": "World History",
                       "credits": "3", "grade": "A-"}]}"#;
        let map = parse(raw);
        assert_eq!(map.courses[0].course_code, "HIST20");
        assert_eq!(map.courses[0].course_title, "World History");
        assert_eq!(map.courses[0].credits_attempted, "3");
        assert_eq!(map.courses[0].letter_grade, "A-");
    }

    #[test]
    fn line_scan_with_synonyms() {
        let raw = "Student Name: Alice Wong\nDOB: 2001-07-04\nGPA: 3.6\nMajor: Physics";
        let map = parse(raw);
        assert_eq!(map.full_name, "Alice Wong");
        assert_eq!(map.date_of_birth, "2001-07-04");
        assert_eq!(map.gpa, "3.6");
        assert_eq!(map.major, "Physics");
    }

    #[test]
    fn line_scan_first_match_wins() {
        let raw = "GPA: 3.6\nGPA: 2.1";
        let map = parse(raw);
        assert_eq!(map.gpa, "3.6");
    }

    #[test]
    fn unknown_labels_go_to_extracted_fields() {
        let raw = "Advisor: Dr. Lane\nName: Pat Jones";
        let map = parse(raw);
        assert_eq!(map.full_name, "Pat Jones");
        assert_eq!(map.extracted_fields["advisor"], "Dr. Lane");
    }

    #[test]
    fn garbage_yields_empty_map_not_error() {
        let map = parse("I'm sorry, I cannot help with that request.");
        assert!(!map.has_required_fields());
        assert!(map.courses.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_map() {
        let map = parse("");
        assert_eq!(map, FieldMap::default());
    }

    #[test]
    fn zero_one_many_course_blocks() {
        let none = parse(r#"{"student_info": {"first_name": "A"}, "courses": []}"#);
        assert_eq!(none.courses.len(), 0);

        let many = parse(
            r#"{"courses": [
                {"course_code": "CS101", "letter_grade": "A"},
                {"course_code": "CS102", "letter_grade": "B"},
                {"course_code": "CS103", "letter_grade": "C"}
            ]}"#,
        );
        assert_eq!(many.courses.len(), 3);
        assert_eq!(many.courses[2].course_code, "CS103");
    }

    #[test]
    fn literal_null_string_is_treated_as_absent() {
        let raw = r#"{"student_info": {"first_name": "null", "last_name": "Nguyen"}}"#;
        let map = parse(raw);
        assert_eq!(map.first_name, "");
        assert_eq!(map.last_name, "Nguyen");
    }
}
