//! Wire types for the daemon's HTTP API, shared with the CLI client.

use crate::types::{HelperId, KnowledgeId, QueueId, QueueStatus};
use serde::{Deserialize, Serialize};

/// Submission intake payload (`POST /v1/questions`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub student_name: String,
    pub course: String,
    pub question_text: String,
    #[serde(default)]
    pub code_snippet: Option<String>,
    #[serde(default)]
    pub preferred_helper_id: Option<HelperId>,
}

/// What the student gets back after the pipeline has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub queue_id: QueueId,
    pub assigned_helper_name: String,
    pub estimated_wait_minutes: u32,
    pub category: String,
    pub tags: Vec<String>,
    pub summary: String,
    pub similar_entry_ids: Vec<KnowledgeId>,
}

/// One active helper with its live unresolved-queue count (`GET /v1/roster`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: HelperId,
    pub name: String,
    pub expertise_tags: Vec<String>,
    pub queue_count: usize,
}

/// Flattened view of one non-DONE queue entry (`GET /v1/queue`).
///
/// Extraction fields fall back to defaults when the pipeline has not
/// attached metadata; guidance fields stay `None` until synthesized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueView {
    pub queue_id: QueueId,
    pub student_name: String,
    pub course: String,
    pub question_text: String,
    pub code_snippet: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub estimated_minutes: u32,
    pub assigned_helper_name: String,
    pub status: QueueStatus,
    pub summary: String,
    pub answer_outline: Option<String>,
    pub student_hint: Option<String>,
}

/// Queue snapshot pushed to observers after each store mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueUpdate {
    pub queue: Vec<QueueView>,
}

/// Acknowledgement for `POST /v1/queue/{id}/resolve`.
///
/// `newly_resolved` is false when the entry was already DONE; resolution is
/// idempotent and a repeat never grows the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveAck {
    pub queue_id: QueueId,
    pub newly_resolved: bool,
    pub knowledge_entry_id: Option<KnowledgeId>,
}

/// Counters exposed by `GET /v1/metrics`.
///
/// `estimated_time_saved_minutes` is resolved count times a fixed constant;
/// it is illustrative, not a validated model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub resolved_count: usize,
    pub active_queue_count: usize,
    pub knowledge_base_size: usize,
    pub estimated_time_saved_minutes: usize,
}
