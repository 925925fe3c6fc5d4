//! Ranking stage: structured metadata plus live roster to one recommended
//! helper.
//!
//! The ordering policy (expertise overlap first, then queue length, then
//! difficulty alignment, with the student preference as a bias) lives in the
//! backend prompt. This module enforces the hard rules: every returned
//! helper id must come from the supplied active roster, and at most two
//! alternates are accepted.

use oracle_common::rpc::RosterEntry;
use oracle_common::types::{HelperId, RankingResult};
use serde::Deserialize;

/// Priority score assigned by the fallback. Advisory only.
pub const FALLBACK_SCORE: f64 = 85.0;

/// At most this many alternate helpers are accepted.
pub const MAX_ALTERNATES: usize = 2;

#[derive(Deserialize)]
struct RawRanking {
    recommended_helper_id: HelperId,
    #[serde(default)]
    alternate_helper_ids: Vec<HelperId>,
    priority_score: f64,
    rationale: String,
}

/// Parse and validate backend output against the roster snapshot the
/// backend was shown. An unknown or inactive helper id, a self-referencing
/// alternate, or more than two alternates is a schema failure, not
/// something to repair.
pub fn parse_ranking(
    value: &serde_json::Value,
    roster: &[RosterEntry],
) -> Result<RankingResult, String> {
    let raw: RawRanking =
        serde_json::from_value(value.clone()).map_err(|e| format!("bad ranking shape: {e}"))?;

    if !roster.iter().any(|h| h.id == raw.recommended_helper_id) {
        return Err(format!(
            "recommended helper {} is not in the active roster",
            raw.recommended_helper_id
        ));
    }
    if !raw.priority_score.is_finite() {
        return Err("priority_score is not a finite number".to_string());
    }

    if raw.alternate_helper_ids.len() > MAX_ALTERNATES {
        return Err(format!(
            "{} alternates returned, at most {} accepted",
            raw.alternate_helper_ids.len(),
            MAX_ALTERNATES
        ));
    }
    for id in &raw.alternate_helper_ids {
        if *id == raw.recommended_helper_id {
            return Err(format!("alternate {id} repeats the recommendation"));
        }
        if !roster.iter().any(|h| h.id == *id) {
            return Err(format!("alternate helper {id} is not in the active roster"));
        }
    }

    Ok(RankingResult {
        recommended_helper_id: raw.recommended_helper_id,
        alternate_helper_ids: raw.alternate_helper_ids,
        priority_score: raw.priority_score,
        rationale: raw.rationale,
    })
}

/// Deterministic fallback: first roster entry, ignoring expertise overlap.
/// Returns `None` only for an empty roster, which the orchestrator rejects
/// before the pipeline starts.
pub fn fallback(roster: &[RosterEntry]) -> Option<RankingResult> {
    let first = roster.first()?;
    let alternates: Vec<HelperId> = roster.iter().skip(1).take(1).map(|h| h.id).collect();
    Some(RankingResult {
        recommended_helper_id: first.id,
        alternate_helper_ids: alternates,
        priority_score: FALLBACK_SCORE,
        rationale: format!(
            "Fallback assignment to {} (first available helper); expertise and load were not weighed",
            first.name
        ),
    })
}
