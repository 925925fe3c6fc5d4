//! Entity types for the routing pipeline and case store.
//!
//! Identifiers are per-entity-type monotonic counters assigned by the store
//! at creation. They are never reused or recycled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type HelperId = u64;
pub type RequestId = u64;
pub type QueueId = u64;
pub type KnowledgeId = u64;

/// Difficulty tier assigned by the extraction stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

impl Difficulty {
    /// Inclusive estimated-minutes range declared for this tier.
    pub fn minutes_range(self) -> (u32, u32) {
        match self {
            Self::Low => (5, 10),
            Self::Medium => (10, 20),
            Self::High => (20, 30),
        }
    }

    /// Whether an estimate is consistent with this tier.
    pub fn accepts_minutes(self, minutes: u32) -> bool {
        let (lo, hi) = self.minutes_range();
        (lo..=hi).contains(&minutes)
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Lifecycle status of a queue entry. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    Queued,
    InProgress,
    Done,
}

impl QueueStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }

    /// Forward-only transitions: QUEUED -> IN_PROGRESS -> DONE, or
    /// QUEUED -> DONE directly. Everything else is a regression.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::InProgress)
                | (Self::Queued, Self::Done)
                | (Self::InProgress, Self::Done)
        )
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "QUEUED"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Done => write!(f, "DONE"),
        }
    }
}

/// Pipeline output attached to a request after creation.
///
/// A request starts with both derived fields `Pending`; the orchestrator
/// attaches each computed value exactly once, before the queue entry is
/// created. The value is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Derived<T> {
    Pending,
    Ready(T),
}

impl<T> Derived<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending => None,
        }
    }
}

impl<T> Default for Derived<T> {
    fn default() -> Self {
        Self::Pending
    }
}

/// A staff helper eligible to receive routed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Helper {
    pub id: HelperId,
    pub name: String,
    pub expertise_tags: Vec<String>,
    pub is_active: bool,
}

/// A submitted help request and its append-only derived fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub student_name: String,
    pub course: String,
    pub question_text: String,
    pub code_snippet: Option<String>,
    pub preferred_helper_id: Option<HelperId>,
    pub created_at: DateTime<Utc>,
    pub extraction: Derived<ExtractedMetadata>,
    pub guidance: Derived<GuidanceResult>,
}

/// Structured metadata produced by the extraction stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    pub category: String,
    pub difficulty: Difficulty,
    pub estimated_minutes: u32,
    pub tags: Vec<String>,
    pub summary: String,
}

/// Ranked helper recommendation produced by the ranking stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub recommended_helper_id: HelperId,
    pub alternate_helper_ids: Vec<HelperId>,
    pub priority_score: f64,
    pub rationale: String,
}

/// Teaching guidance produced by the synthesis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceResult {
    pub similar_entry_ids: Vec<KnowledgeId>,
    pub similarity_explanation: String,
    /// Step outline (3-5 steps) for the helper.
    pub answer_outline: String,
    /// Non-spoiler hint for the student while they wait.
    pub student_hint: String,
}

/// Live work item binding a request to its assigned helper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: QueueId,
    pub request_id: RequestId,
    pub helper_id: HelperId,
    pub estimated_minutes: u32,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
}

/// A resolved case retained for future similarity matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: KnowledgeId,
    pub request_id: RequestId,
    pub category: String,
    pub tags: Vec<String>,
    pub summary: String,
    pub solution_outline: String,
    pub created_at: DateTime<Utc>,
}
