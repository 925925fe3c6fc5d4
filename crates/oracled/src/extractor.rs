//! Extraction stage: raw submission text to structured metadata.
//!
//! All inference belongs to the generation backend. This module only shapes
//! input (see [`crate::prompts::extraction_prompt`]), enforces the output
//! schema, and supplies the deterministic fallback.

use oracle_common::types::{Difficulty, ExtractedMetadata};
use serde::Deserialize;

/// Duration bounds accepted from the backend, across all tiers.
pub const MIN_MINUTES: u32 = 5;
pub const MAX_MINUTES: u32 = 30;

/// Tag count accepted from the backend.
pub const MIN_TAGS: usize = 3;
pub const MAX_TAGS: usize = 7;

#[derive(Deserialize)]
struct RawExtraction {
    category: String,
    difficulty: Difficulty,
    estimated_minutes: u32,
    tags: Vec<String>,
    summary: String,
}

/// Parse and validate backend output. Any violation is a schema failure
/// that the gateway turns into the deterministic fallback.
pub fn parse_extraction(value: &serde_json::Value) -> Result<ExtractedMetadata, String> {
    let raw: RawExtraction =
        serde_json::from_value(value.clone()).map_err(|e| format!("bad extraction shape: {e}"))?;

    if raw.category.trim().is_empty() {
        return Err("empty category".to_string());
    }
    if raw.summary.trim().is_empty() {
        return Err("empty summary".to_string());
    }
    if !(MIN_MINUTES..=MAX_MINUTES).contains(&raw.estimated_minutes) {
        return Err(format!(
            "estimated_minutes {} outside [{MIN_MINUTES},{MAX_MINUTES}]",
            raw.estimated_minutes
        ));
    }
    if !raw.difficulty.accepts_minutes(raw.estimated_minutes) {
        return Err(format!(
            "estimated_minutes {} inconsistent with difficulty {}",
            raw.estimated_minutes, raw.difficulty
        ));
    }

    let tags: Vec<String> = raw
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if !(MIN_TAGS..=MAX_TAGS).contains(&tags.len()) {
        return Err(format!(
            "expected {MIN_TAGS}-{MAX_TAGS} tags, got {}",
            tags.len()
        ));
    }

    Ok(ExtractedMetadata {
        category: raw.category,
        difficulty: raw.difficulty,
        estimated_minutes: raw.estimated_minutes,
        tags,
        summary: raw.summary,
    })
}

/// Deterministic fallback when the backend is disabled or its output is
/// rejected. Independent of the backend by construction.
pub fn fallback(question_text: &str) -> ExtractedMetadata {
    ExtractedMetadata {
        category: "General".to_string(),
        difficulty: Difficulty::Medium,
        estimated_minutes: 15,
        tags: vec!["debugging".to_string(), "general".to_string()],
        summary: question_text.chars().take(100).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_output() -> serde_json::Value {
        json!({
            "category": "Red-Black Tree Deletion",
            "difficulty": "HIGH",
            "estimated_minutes": 25,
            "tags": ["trees", "red-black", "deletion"],
            "summary": "Case 3 fixup loses the black-height invariant"
        })
    }

    #[test]
    fn accepts_valid_output() {
        let meta = parse_extraction(&valid_output()).unwrap();
        assert_eq!(meta.category, "Red-Black Tree Deletion");
        assert_eq!(meta.difficulty, Difficulty::High);
        assert_eq!(meta.estimated_minutes, 25);
        assert_eq!(meta.tags.len(), 3);
    }

    #[test]
    fn rejects_duration_outside_global_bounds() {
        let mut v = valid_output();
        v["estimated_minutes"] = json!(45);
        assert!(parse_extraction(&v).is_err());
    }

    #[test]
    fn rejects_duration_outside_tier_range() {
        // 8 minutes is within [5,30] but not within HIGH's [20,30].
        let mut v = valid_output();
        v["estimated_minutes"] = json!(8);
        assert!(parse_extraction(&v).is_err());
    }

    #[test]
    fn rejects_wrong_tag_count() {
        let mut v = valid_output();
        v["tags"] = json!(["one", "two"]);
        assert!(parse_extraction(&v).is_err());

        v["tags"] = json!(["1", "2", "3", "4", "5", "6", "7", "8"]);
        assert!(parse_extraction(&v).is_err());
    }

    #[test]
    fn blank_tags_do_not_count() {
        let mut v = valid_output();
        v["tags"] = json!(["trees", "  ", "", "deletion"]);
        assert!(parse_extraction(&v).is_err());
    }

    #[test]
    fn rejects_unknown_difficulty() {
        let mut v = valid_output();
        v["difficulty"] = json!("IMPOSSIBLE");
        assert!(parse_extraction(&v).is_err());
    }

    #[test]
    fn fallback_is_deterministic_and_in_bounds() {
        let a = fallback("why does my tree rotate the wrong way");
        let b = fallback("why does my tree rotate the wrong way");
        assert_eq!(a, b);
        assert_eq!(a.category, "General");
        assert_eq!(a.estimated_minutes, 15);
        assert!(a.difficulty.accepts_minutes(a.estimated_minutes));
        assert_eq!(a.tags, vec!["debugging", "general"]);
    }

    #[test]
    fn fallback_summary_truncates_at_100_chars() {
        let long = "x".repeat(250);
        assert_eq!(fallback(&long).summary.chars().count(), 100);
    }
}
