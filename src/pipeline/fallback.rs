//! Fallback parser: heuristic field extraction straight from extracted text.
//!
//! Activated when the mapping service is unconfigured, fails, or returns a
//! response the parser cannot get any required field out of. This path is
//! intentionally lower-precision than the AI path: it pattern-matches common
//! transcript shapes rather than understanding layout. It must still
//! populate the full [`FieldMap`] shape (same keys, empty string for
//! anything unmatched) and it never fails — the worst case is an
//! almost-empty map.
//!
//! Heuristics, in document order:
//!
//! * **Name** — first capitalised multi-word line near the top of the text
//!   that does not look like an institution banner.
//! * **Labelled values** — `label: value` lines matched against the same
//!   synonym table the response parser uses.
//! * **Dates** — date-like tokens on lines whose wording places them
//!   (birth vs. graduation).
//! * **Course rows** — a line containing a course-code-like token, then a
//!   number in a plausible credit range, then a grade-like token, in that
//!   left-to-right order.

use crate::fields::{CourseFields, FieldMap};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Course-code token: 2–4 letters, optional separator, 2–4 digits.
static RE_COURSE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2,4}[ -]?\d{2,4}[A-Z]?\b").unwrap());

/// Date-like tokens: ISO, slashed, or "Month DD, YYYY".
static RE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b\d{4}-\d{2}-\d{2}\b|\b\d{1,2}/\d{1,2}/\d{2,4}\b|\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]* \d{1,2},? \d{4}\b",
    )
    .unwrap()
});

/// Semester + 4-digit year, e.g. "Fall 2019".
static RE_SEMESTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(Fall|Spring|Summer|Winter|Autumn)\s+(\d{4})\b").unwrap());

/// GPA on a 4-point-style scale, with or without a label colon.
static RE_GPA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bgpa\b[:\s]*([0-4](?:\.\d{1,3})?)").unwrap());

/// Non-whitespace token runs, for positional token scanning.
static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

/// Letter grades and pass/fail-style marks recognised in course rows.
const GRADE_TOKENS: &[&str] = &[
    "A+", "A", "A-", "B+", "B", "B-", "C+", "C", "C-", "D+", "D", "D-", "F", "P", "NP", "W", "I",
    "CR", "NC", "S", "U",
];

/// Words that disqualify a line from being a student name.
const INSTITUTION_WORDS: &[&str] = &[
    "university",
    "college",
    "institute",
    "school",
    "academy",
    "transcript",
    "official",
    "record",
    "registrar",
    "department",
    "office",
];

/// Credits outside this range are almost certainly not credit values
/// (years, course numbers, page numbers).
const CREDIT_RANGE: std::ops::RangeInclusive<f64> = 0.0..=12.0;

/// How many leading non-empty lines the name heuristic inspects.
const NAME_WINDOW: usize = 10;

/// Extract a `FieldMap` from raw transcript text. Never fails.
pub fn fallback_parse(text: &str) -> FieldMap {
    let mut map = FieldMap::default();
    let mut seen_nonempty = 0usize;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        seen_nonempty += 1;

        // Labelled values take priority: an explicit "Name: …" beats the
        // positional name heuristic for the same line.
        if let Some((label, value)) = line.split_once(':') {
            let label_norm = label.trim().to_ascii_lowercase();
            let value = value.trim();
            if !value.is_empty() {
                if let Some((field, _)) = crate::pipeline::parse::FIELD_LABELS
                    .iter()
                    .find(|(_, labels)| labels.contains(&label_norm.as_str()))
                {
                    // Date labels sometimes carry trailing prose; keep just
                    // the date token when one is present.
                    let value = match (*field, RE_DATE.find(value)) {
                        ("date_of_birth" | "graduation_date", Some(m)) => m.as_str(),
                        _ => value,
                    };
                    map.set_if_empty(field, value);
                    continue;
                }
            }
        }

        if map.full_name.is_empty() && seen_nonempty <= NAME_WINDOW && looks_like_name(line) {
            map.full_name = line.to_string();
            continue;
        }

        if let Some(date) = RE_DATE.find(line) {
            let lower = line.to_ascii_lowercase();
            if lower.contains("birth") || lower.contains("dob") {
                map.set_if_empty("date_of_birth", date.as_str());
                continue;
            }
            if lower.contains("graduat") {
                map.set_if_empty("graduation_date", date.as_str());
                continue;
            }
        }

        if map.gpa.is_empty() {
            if let Some(caps) = RE_GPA.captures(line) {
                map.gpa = caps[1].to_string();
                continue;
            }
        }

        if map.school_name.is_empty() && looks_like_institution(line) {
            map.school_name = line.to_string();
            continue;
        }

        if let Some(course) = scan_course_row(line) {
            map.courses.push(course);
        }
    }

    debug!(
        "Fallback parse found {} course rows, name present: {}",
        map.courses.len(),
        !map.full_name.is_empty() || !map.first_name.is_empty()
    );
    map
}

/// Positional name heuristic: 2–4 capitalised words, no digits, not an
/// institution banner.
fn looks_like_name(line: &str) -> bool {
    if line.chars().any(|c| c.is_ascii_digit()) || line.contains(':') {
        return false;
    }
    let lower = line.to_ascii_lowercase();
    if INSTITUTION_WORDS.iter().any(|w| lower.contains(w)) {
        return false;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
        return false;
    }
    words.iter().all(|w| {
        let mut chars = w.chars();
        matches!(chars.next(), Some(c) if c.is_uppercase())
            && w.chars().all(|c| c.is_alphabetic() || c == '.' || c == '-' || c == '\'')
    })
}

/// Institution banner heuristic for the school-name field.
fn looks_like_institution(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    ["university", "college", "institute", "academy"]
        .iter()
        .any(|w| lower.contains(w))
        // Banner lines are short; footers and paragraphs are not.
        && line.len() <= 80
        && !lower.contains("transcript")
}

/// Recognise one course row: code, then credits, then grade, left to right.
///
/// Shared with the response parser's line-scanning path so textual course
/// listings in a mapping response are recognised the same way.
pub(crate) fn scan_course_row(line: &str) -> Option<CourseFields> {
    let code_match = RE_COURSE_CODE.find(line)?;

    // First plausible credit number strictly after the code.
    let mut credit: Option<(usize, usize, &str)> = None;
    for token in RE_TOKEN.find_iter(&line[code_match.end()..]) {
        let cleaned = token.as_str().trim_matches(|c: char| !c.is_ascii_digit() && c != '.');
        if let Ok(v) = cleaned.parse::<f64>() {
            if CREDIT_RANGE.contains(&v) && cleaned.contains(|c: char| c.is_ascii_digit()) {
                credit = Some((
                    code_match.end() + token.start(),
                    code_match.end() + token.end(),
                    cleaned,
                ));
                break;
            }
        }
    }
    let (credit_start, credit_end, credit_str) = credit?;

    // First grade token strictly after the credits.
    let mut grade: Option<&str> = None;
    for token in RE_TOKEN.find_iter(&line[credit_end..]) {
        let cleaned = token
            .as_str()
            .trim_matches(|c: char| !(c.is_ascii_alphanumeric() || c == '+' || c == '-'));
        if GRADE_TOKENS.contains(&cleaned) {
            grade = Some(cleaned);
            break;
        }
    }
    let grade = grade?;

    let title = line[code_match.end()..credit_start]
        .trim_matches(|c: char| c.is_whitespace() || c == '-' || c == '|' || c == ',')
        .to_string();

    let (semester, year) = match RE_SEMESTER.captures(line) {
        Some(caps) => (caps[1].to_string(), caps[2].to_string()),
        None => (String::new(), String::new()),
    };

    Some(CourseFields {
        course_code: code_match.as_str().to_string(),
        course_title: title,
        credits_attempted: credit_str.to_string(),
        credits_earned: String::new(),
        letter_grade: grade.to_string(),
        pass_fail: String::new(),
        semester,
        year,
    })
}
