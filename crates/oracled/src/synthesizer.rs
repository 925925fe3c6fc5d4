//! Synthesis stage: metadata plus knowledge-base shortlist to teaching
//! guidance.
//!
//! The "non-spoiler" quality of the student hint is a content contract
//! enforced by the backend instructions, not validated here. An empty
//! shortlist is a normal outcome, not an error.

use oracle_common::types::{GuidanceResult, KnowledgeEntry, KnowledgeId};
use serde::Deserialize;

/// How many shortlist entries the fallback cites.
pub const FALLBACK_CITED: usize = 2;

#[derive(Deserialize)]
struct RawGuidance {
    #[serde(default)]
    similar_entry_ids: Vec<KnowledgeId>,
    similarity_explanation: String,
    answer_outline: String,
    student_hint: String,
}

/// Parse and validate backend output against the shortlist the backend was
/// shown. Cited ids outside the shortlist are a schema failure.
pub fn parse_guidance(
    value: &serde_json::Value,
    candidates: &[KnowledgeEntry],
) -> Result<GuidanceResult, String> {
    let raw: RawGuidance =
        serde_json::from_value(value.clone()).map_err(|e| format!("bad guidance shape: {e}"))?;

    for id in &raw.similar_entry_ids {
        if !candidates.iter().any(|c| c.id == *id) {
            return Err(format!("cited knowledge entry {id} was not in the shortlist"));
        }
    }
    if raw.answer_outline.trim().is_empty() {
        return Err("empty answer_outline".to_string());
    }
    if raw.student_hint.trim().is_empty() {
        return Err("empty student_hint".to_string());
    }

    Ok(GuidanceResult {
        similar_entry_ids: raw.similar_entry_ids,
        similarity_explanation: raw.similarity_explanation,
        answer_outline: raw.answer_outline,
        student_hint: raw.student_hint,
    })
}

/// Deterministic fallback: cite up to the first two shortlist entries and
/// hand out fixed generic guidance.
pub fn fallback(candidates: &[KnowledgeEntry]) -> GuidanceResult {
    GuidanceResult {
        similar_entry_ids: candidates.iter().take(FALLBACK_CITED).map(|c| c.id).collect(),
        similarity_explanation:
            "These prior cases share overlapping topics and debugging approaches.".to_string(),
        answer_outline: "1. Identify the core concept\n2. Walk through a small example\n3. Debug together\n4. Verify understanding"
            .to_string(),
        student_hint:
            "Revisit the invariants your data structure must maintain and re-check the base case."
                .to_string(),
    }
}
