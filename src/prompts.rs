//! Prompts and the optional response schema for metadata extraction.
//!
//! Callers can override the cover prompt via
//! [`crate::config::ExtractionConfig::cover_prompt`]; the constants here are
//! used only when no override is provided.

use serde_json::{json, Value};

/// The six fields every prompt asks for, in output order.
pub const METADATA_FIELDS: [&str; 6] = [
    "title",
    "author",
    "subject",
    "grade",
    "publisher",
    "publishDate",
];

/// Default instruction sent alongside the uploaded PDF.
pub const COVER_PROMPT: &str = "Extract from PDF cover: title, author, subject (Math/English/Physics/etc), grade, publisher, publishDate. Return JSON only.";

/// Build the text-only prompt used when inferring metadata from a file name.
pub fn file_name_prompt(file_name: &str) -> String {
    format!(
        r#"You are a book metadata extraction assistant. Infer the basic information of a textbook from its PDF file name.

File name: {file_name}

Return a single JSON object with exactly these keys:
- "title": the core book title, without edition or curriculum notes
- "author": author or editor, or null if the file name does not contain it
- "subject": the school subject (Math/English/Physics/etc)
- "grade": grade and term (e.g. "Grade 1, first term"), or null if unknown
- "publisher": publisher name, or null if the file name does not contain it
- "publishDate": "YYYY-MM" or "YYYY", or null if the file name does not contain it
- "confidence": {{ "overall": 0-1, "fields": {{ "<field>": 0-1, ... }} }}
  Fields the file name states outright (subject, grade) get 0.8-1.0;
  fields it does not contain (author, publisher) get 0.0-0.4.

Return JSON only, without markdown code fences."#
    )
}

/// `responseSchema` for `generationConfig`: the six fields as nullable
/// strings, plus an optional `confidence` object (`overall` and per-field
/// scores in 0..1).
pub fn metadata_response_schema() -> Value {
    let mut properties = serde_json::Map::new();
    let mut field_scores = serde_json::Map::new();
    for field in METADATA_FIELDS {
        properties.insert(
            field.to_string(),
            json!({ "type": "STRING", "nullable": true }),
        );
        field_scores.insert(field.to_string(), json!({ "type": "NUMBER" }));
    }
    properties.insert(
        "confidence".to_string(),
        json!({
            "type": "OBJECT",
            "nullable": true,
            "properties": {
                "overall": { "type": "NUMBER" },
                "fields": { "type": "OBJECT", "properties": field_scores },
            },
        }),
    );

    let mut ordering: Vec<&str> = METADATA_FIELDS.to_vec();
    ordering.push("confidence");
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": METADATA_FIELDS,
        "propertyOrdering": ordering,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_prompt_names_every_field() {
        for field in METADATA_FIELDS {
            assert!(COVER_PROMPT.contains(field), "missing {field}");
        }
        assert!(COVER_PROMPT.ends_with("Return JSON only."));
    }

    #[test]
    fn file_name_prompt_embeds_name() {
        let p = file_name_prompt("Math Grade 3 Vol 1.pdf");
        assert!(p.contains("Math Grade 3 Vol 1.pdf"));
        for field in METADATA_FIELDS {
            assert!(p.contains(field), "missing {field}");
        }
        assert!(p.contains("\"confidence\""));
        assert!(p.contains("\"overall\""));
    }

    #[test]
    fn cover_prompt_is_unchanged_by_confidence() {
        assert!(!COVER_PROMPT.contains("confidence"));
    }

    #[test]
    fn schema_covers_fields_in_order() {
        let s = metadata_response_schema();
        assert_eq!(s["type"], "OBJECT");
        let props = s["properties"].as_object().unwrap();
        let keys: Vec<&str> = props.keys().map(String::as_str).collect();
        assert_eq!(&keys[..6], &METADATA_FIELDS[..]);
        assert_eq!(s["propertyOrdering"][5], "publishDate");
        assert_eq!(s["propertyOrdering"][6], "confidence");
    }

    #[test]
    fn schema_asks_for_optional_confidence() {
        let s = metadata_response_schema();
        let confidence = &s["properties"]["confidence"];
        assert_eq!(confidence["type"], "OBJECT");
        assert_eq!(confidence["properties"]["overall"]["type"], "NUMBER");
        assert_eq!(
            confidence["properties"]["fields"]["properties"]["publishDate"]["type"],
            "NUMBER"
        );
        let required: Vec<&str> = s["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(!required.contains(&"confidence"));
    }
}
