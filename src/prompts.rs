//! Prompt text for the field-mapping service.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — adding a field or tightening an
//!    instruction requires editing exactly one place.
//!
//! 2. **Testability** — the response parser's tests can assert against the
//!    field names the prompt requests without calling a real service.

/// System prompt instructing the mapping service to emit the fixed JSON
/// layout the response parser expects.
///
/// The "ONLY valid JSON" and null-handling rules exist because chat models
/// routinely wrap JSON in markdown fences or prose; the parser strips fences
/// anyway, but a tight prompt keeps the structured path reliable.
pub const MAPPING_SYSTEM_PROMPT: &str = r#"You are an expert at extracting structured information from academic transcripts.
Given the raw text of a transcript, extract the following information in VALID JSON format.

IMPORTANT: Your response must be ONLY valid JSON with no additional text, explanations, or markdown formatting.

Extract this exact structure:
{
    "student_info": {
        "first_name": "string or null",
        "last_name": "string or null",
        "student_id": "string or null",
        "date_of_birth": "string or null",
        "graduation_date": "string or null",
        "degree": "string or null",
        "major": "string or null",
        "gpa": "string or null",
        "school_name": "string or null"
    },
    "courses": [
        {
            "course_code": "string or null",
            "course_title": "string or null",
            "credits_attempted": "string or null",
            "credits_earned": "string or null",
            "letter_grade": "string or null",
            "pass_fail": "string or null",
            "semester": "string or null",
            "year": "string or null"
        }
    ],
    "additional_info": {
        "any_other_relevant_fields": "values"
    }
}

Rules:
- Only extract information that is clearly present in the text
- Use null for missing information (not empty strings)
- Create a separate courses entry for each course found
- Response must be valid JSON only, no explanations or formatting
- If no information is found, still return the structure with null values"#;

/// Build the user message carrying the extracted transcript text.
pub fn mapping_user_prompt(extracted_text: &str) -> String {
    format!(
        "Extract structured data from this transcript text:\n\n{}",
        extracted_text
    )
}
