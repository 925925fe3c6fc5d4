//! Case store: helpers, requests, the live queue, and the knowledge base.
//!
//! The store is the single owner of all mutable entity state. Components
//! read snapshots and hand back newly-constructed records; only the
//! orchestrator attaches derived fields and moves queue entries through
//! their lifecycle. Entries are never deleted: the "active queue" is a
//! filter on status, and identifiers are per-type monotonic counters.

use chrono::Utc;
use oracle_common::rpc::{MetricsReport, QueueUpdate, QueueView, RosterEntry, Submission};
use oracle_common::types::{
    Derived, ExtractedMetadata, GuidanceResult, Helper, HelperId, KnowledgeEntry, KnowledgeId,
    QueueEntry, QueueId, QueueStatus, Request, RequestId,
};
use oracle_common::OracleError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// search_kb returns at most this many entries.
pub const KB_SEARCH_CAP: usize = 5;

/// Fixed per-resolution constant behind the "time saved" metric.
pub const TIME_SAVED_PER_RESOLVE_MINUTES: usize = 5;

#[derive(Default)]
pub struct CaseStore {
    helpers: Vec<Helper>,
    requests: Vec<Request>,
    queue: Vec<QueueEntry>,
    knowledge: Vec<KnowledgeEntry>,

    helper_seq: HelperId,
    request_seq: RequestId,
    queue_seq: QueueId,
    knowledge_seq: KnowledgeId,
}

impl CaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Helpers ---

    pub fn add_helper(&mut self, name: &str, expertise_tags: Vec<String>) -> HelperId {
        self.helper_seq += 1;
        self.helpers.push(Helper {
            id: self.helper_seq,
            name: name.to_string(),
            expertise_tags,
            is_active: true,
        });
        self.helper_seq
    }

    pub fn set_helper_active(&mut self, id: HelperId, active: bool) -> Result<(), OracleError> {
        let helper = self
            .helpers
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(OracleError::UnknownHelper(id))?;
        helper.is_active = active;
        Ok(())
    }

    pub fn helper(&self, id: HelperId) -> Option<&Helper> {
        self.helpers.iter().find(|h| h.id == id)
    }

    fn helper_name(&self, id: HelperId) -> String {
        self.helper(id)
            .map(|h| h.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Unresolved work items currently assigned to a helper.
    pub fn helper_queue_count(&self, id: HelperId) -> usize {
        self.queue
            .iter()
            .filter(|e| e.helper_id == id && !e.status.is_terminal())
            .count()
    }

    /// Active helpers annotated with live queue counts, in roster order.
    pub fn active_roster(&self) -> Vec<RosterEntry> {
        self.helpers
            .iter()
            .filter(|h| h.is_active)
            .map(|h| RosterEntry {
                id: h.id,
                name: h.name.clone(),
                expertise_tags: h.expertise_tags.clone(),
                queue_count: self.helper_queue_count(h.id),
            })
            .collect()
    }

    // --- Requests ---

    pub fn add_request(&mut self, submission: &Submission) -> RequestId {
        self.request_seq += 1;
        self.requests.push(Request {
            id: self.request_seq,
            student_name: submission.student_name.clone(),
            course: submission.course.clone(),
            question_text: submission.question_text.clone(),
            code_snippet: submission.code_snippet.clone(),
            preferred_helper_id: submission.preferred_helper_id,
            created_at: Utc::now(),
            extraction: Derived::Pending,
            guidance: Derived::Pending,
        });
        self.request_seq
    }

    pub fn request(&self, id: RequestId) -> Option<&Request> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// Attach extraction output. Set exactly once; a second attempt is
    /// ignored with a warning because derived fields are append-only.
    pub fn attach_extraction(
        &mut self,
        id: RequestId,
        metadata: ExtractedMetadata,
    ) -> Result<(), OracleError> {
        let request = self
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(OracleError::UnknownRequest(id))?;
        if request.extraction.is_ready() {
            warn!(request_id = id, "extraction already attached, ignoring");
            return Ok(());
        }
        request.extraction = Derived::Ready(metadata);
        Ok(())
    }

    /// Attach synthesis output. Same set-once discipline as extraction.
    pub fn attach_guidance(
        &mut self,
        id: RequestId,
        guidance: GuidanceResult,
    ) -> Result<(), OracleError> {
        let request = self
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(OracleError::UnknownRequest(id))?;
        if request.guidance.is_ready() {
            warn!(request_id = id, "guidance already attached, ignoring");
            return Ok(());
        }
        request.guidance = Derived::Ready(guidance);
        Ok(())
    }

    // --- Queue ---

    /// Append a queue entry. The request must exist and the helper must be
    /// known (active or not); otherwise the write is rejected whole.
    pub fn add_queue_entry(
        &mut self,
        request_id: RequestId,
        helper_id: HelperId,
        estimated_minutes: u32,
    ) -> Result<QueueId, OracleError> {
        if self.request(request_id).is_none() {
            return Err(OracleError::UnknownRequest(request_id));
        }
        if self.helper(helper_id).is_none() {
            return Err(OracleError::UnknownHelper(helper_id));
        }
        self.queue_seq += 1;
        self.queue.push(QueueEntry {
            id: self.queue_seq,
            request_id,
            helper_id,
            estimated_minutes,
            status: QueueStatus::Queued,
            created_at: Utc::now(),
        });
        Ok(self.queue_seq)
    }

    pub fn queue_entry(&self, id: QueueId) -> Option<&QueueEntry> {
        self.queue.iter().find(|e| e.id == id)
    }

    /// List queue entries, optionally including resolved ones. Entries are
    /// never deleted, so the active queue is just a filter on status.
    pub fn queue_entries(&self, include_done: bool) -> Vec<&QueueEntry> {
        self.queue
            .iter()
            .filter(|e| include_done || !e.status.is_terminal())
            .collect()
    }

    pub fn active_queue(&self) -> Vec<&QueueEntry> {
        self.queue_entries(false)
    }

    /// Apply a status transition. Returns `Ok(true)` when applied and
    /// `Ok(false)` when the transition would regress (DONE is terminal),
    /// which callers treat as an idempotent no-op.
    pub fn transition_queue_entry(
        &mut self,
        id: QueueId,
        next: QueueStatus,
    ) -> Result<bool, OracleError> {
        let entry = self
            .queue
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(OracleError::QueueEntryNotFound(id))?;
        if !entry.status.can_transition_to(next) {
            return Ok(false);
        }
        entry.status = next;
        Ok(true)
    }

    // --- Knowledge base ---

    pub fn add_knowledge_entry(
        &mut self,
        request_id: RequestId,
        category: &str,
        tags: Vec<String>,
        summary: &str,
        solution_outline: &str,
    ) -> Result<KnowledgeId, OracleError> {
        if self.request(request_id).is_none() {
            return Err(OracleError::UnknownRequest(request_id));
        }
        self.knowledge_seq += 1;
        self.knowledge.push(KnowledgeEntry {
            id: self.knowledge_seq,
            request_id,
            category: category.to_string(),
            tags,
            summary: summary.to_string(),
            solution_outline: solution_outline.to_string(),
            created_at: Utc::now(),
        });
        Ok(self.knowledge_seq)
    }

    pub fn knowledge_len(&self) -> usize {
        self.knowledge.len()
    }

    /// Coarse similarity pre-filter: an entry matches when its tag set
    /// intersects the query tags, or the query category is a
    /// case-insensitive substring of its category. Results keep store
    /// insertion order and are capped at [`KB_SEARCH_CAP`]; any semantic
    /// narrowing is the synthesizer's job.
    pub fn search_kb(&self, tags: &[String], category: Option<&str>) -> Vec<KnowledgeEntry> {
        let category_lower = category.map(|c| c.to_lowercase());
        self.knowledge
            .iter()
            .filter(|entry| {
                let tag_overlap = entry.tags.iter().any(|t| tags.contains(t));
                let category_match = category_lower
                    .as_deref()
                    .map(|c| !c.is_empty() && entry.category.to_lowercase().contains(c))
                    .unwrap_or(false);
                tag_overlap || category_match
            })
            .take(KB_SEARCH_CAP)
            .cloned()
            .collect()
    }

    // --- Projections ---

    /// Flattened view of every non-DONE queue entry, merging request,
    /// extraction (or defaults), helper name, and guidance fields.
    pub fn queue_views(&self) -> Vec<QueueView> {
        self.active_queue()
            .into_iter()
            .filter_map(|entry| {
                let request = self.request(entry.request_id)?;
                let (category, tags, summary) = match request.extraction.as_ready() {
                    Some(m) => (m.category.clone(), m.tags.clone(), m.summary.clone()),
                    None => ("General".to_string(), Vec::new(), String::new()),
                };
                let (answer_outline, student_hint) = match request.guidance.as_ready() {
                    Some(g) => (Some(g.answer_outline.clone()), Some(g.student_hint.clone())),
                    None => (None, None),
                };
                Some(QueueView {
                    queue_id: entry.id,
                    student_name: request.student_name.clone(),
                    course: request.course.clone(),
                    question_text: request.question_text.clone(),
                    code_snippet: request.code_snippet.clone(),
                    category,
                    tags,
                    estimated_minutes: entry.estimated_minutes,
                    assigned_helper_name: self.helper_name(entry.helper_id),
                    status: entry.status,
                    summary,
                    answer_outline,
                    student_hint,
                })
            })
            .collect()
    }

    pub fn queue_update(&self) -> QueueUpdate {
        QueueUpdate {
            queue: self.queue_views(),
        }
    }

    pub fn metrics(&self) -> MetricsReport {
        let resolved_count = self
            .queue_entries(true)
            .iter()
            .filter(|e| e.status.is_terminal())
            .count();
        MetricsReport {
            total_requests: self.requests.len(),
            resolved_count,
            active_queue_count: self.active_queue().len(),
            knowledge_base_size: self.knowledge.len(),
            estimated_time_saved_minutes: resolved_count * TIME_SAVED_PER_RESOLVE_MINUTES,
        }
    }
}

/// Thread-safe shared store handle.
pub type SharedStore = Arc<RwLock<CaseStore>>;

pub fn create_shared_store() -> SharedStore {
    Arc::new(RwLock::new(CaseStore::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_common::types::Difficulty;

    fn submission(text: &str) -> Submission {
        Submission {
            student_name: "Sam".into(),
            course: "CS 400".into(),
            question_text: text.into(),
            code_snippet: None,
            preferred_helper_id: None,
        }
    }

    fn metadata(tags: &[&str]) -> ExtractedMetadata {
        ExtractedMetadata {
            category: "Red-Black Tree Deletion".into(),
            difficulty: Difficulty::Medium,
            estimated_minutes: 15,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            summary: "summary".into(),
        }
    }

    fn store_with_kb() -> CaseStore {
        let mut store = CaseStore::new();
        for i in 0..7 {
            let rid = store.add_request(&submission(&format!("past question {i}")));
            store
                .add_knowledge_entry(
                    rid,
                    "Red-Black Tree Deletion",
                    vec!["trees".into(), "rotations".into()],
                    "summary",
                    "1. step",
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn ids_are_monotonic_per_type() {
        let mut store = CaseStore::new();
        let h1 = store.add_helper("Alice", vec!["trees".into()]);
        let h2 = store.add_helper("Bob", vec!["pointers".into()]);
        assert!(h2 > h1);

        let r1 = store.add_request(&submission("first"));
        let r2 = store.add_request(&submission("second"));
        assert!(r2 > r1);

        let q1 = store.add_queue_entry(r1, h1, 10).unwrap();
        let q2 = store.add_queue_entry(r2, h1, 10).unwrap();
        assert!(q2 > q1);
    }

    #[test]
    fn queue_count_tracks_unresolved_entries_only() {
        let mut store = CaseStore::new();
        let h = store.add_helper("Alice", vec!["trees".into()]);
        let r1 = store.add_request(&submission("one"));
        let r2 = store.add_request(&submission("two"));
        let q1 = store.add_queue_entry(r1, h, 10).unwrap();
        store.add_queue_entry(r2, h, 10).unwrap();
        assert_eq!(store.helper_queue_count(h), 2);

        store
            .transition_queue_entry(q1, QueueStatus::InProgress)
            .unwrap();
        assert_eq!(store.helper_queue_count(h), 2);

        store.transition_queue_entry(q1, QueueStatus::Done).unwrap();
        assert_eq!(store.helper_queue_count(h), 1);
    }

    #[test]
    fn roster_excludes_inactive_helpers() {
        let mut store = CaseStore::new();
        let h1 = store.add_helper("Alice", vec!["trees".into()]);
        let h2 = store.add_helper("Bob", vec!["pointers".into()]);
        store.set_helper_active(h2, false).unwrap();

        let roster = store.active_roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, h1);
    }

    #[test]
    fn queue_entry_rejects_unknown_references_without_partial_write() {
        let mut store = CaseStore::new();
        let h = store.add_helper("Alice", vec!["trees".into()]);
        let r = store.add_request(&submission("q"));

        assert!(matches!(
            store.add_queue_entry(999, h, 10),
            Err(OracleError::UnknownRequest(999))
        ));
        assert!(matches!(
            store.add_queue_entry(r, 999, 10),
            Err(OracleError::UnknownHelper(999))
        ));
        assert!(store.active_queue().is_empty());
    }

    #[test]
    fn inactive_helper_can_still_be_referenced_by_queue_entry() {
        let mut store = CaseStore::new();
        let h = store.add_helper("Alice", vec!["trees".into()]);
        store.set_helper_active(h, false).unwrap();
        let r = store.add_request(&submission("q"));
        assert!(store.add_queue_entry(r, h, 10).is_ok());
    }

    #[test]
    fn done_is_terminal_and_repeat_transition_is_a_noop() {
        let mut store = CaseStore::new();
        let h = store.add_helper("Alice", vec![]);
        let r = store.add_request(&submission("q"));
        let q = store.add_queue_entry(r, h, 10).unwrap();

        assert!(store.transition_queue_entry(q, QueueStatus::Done).unwrap());
        assert!(!store.transition_queue_entry(q, QueueStatus::Done).unwrap());
        assert!(!store
            .transition_queue_entry(q, QueueStatus::InProgress)
            .unwrap());
        assert_eq!(store.queue_entry(q).unwrap().status, QueueStatus::Done);
    }

    #[test]
    fn transition_of_unknown_entry_is_not_found() {
        let mut store = CaseStore::new();
        assert!(matches!(
            store.transition_queue_entry(42, QueueStatus::Done),
            Err(OracleError::QueueEntryNotFound(42))
        ));
    }

    #[test]
    fn derived_fields_attach_once() {
        let mut store = CaseStore::new();
        let r = store.add_request(&submission("q"));
        store.attach_extraction(r, metadata(&["trees"])).unwrap();

        let mut second = metadata(&["other"]);
        second.category = "Overwrite Attempt".into();
        store.attach_extraction(r, second).unwrap();

        let attached = store.request(r).unwrap().extraction.as_ready().unwrap();
        assert_eq!(attached.category, "Red-Black Tree Deletion");
    }

    #[test]
    fn search_kb_caps_at_five_in_insertion_order() {
        let store = store_with_kb();
        let results = store.search_kb(&["trees".to_string()], None);
        assert_eq!(results.len(), KB_SEARCH_CAP);
        let ids: Vec<_> = results.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn search_kb_matches_by_tag_or_category_substring() {
        let mut store = CaseStore::new();
        let r1 = store.add_request(&submission("a"));
        store
            .add_knowledge_entry(r1, "Memory Allocation Error", vec!["malloc".into()], "s", "o")
            .unwrap();
        let r2 = store.add_request(&submission("b"));
        store
            .add_knowledge_entry(r2, "Graph Traversal", vec!["bfs".into()], "s", "o")
            .unwrap();

        // Tag overlap, no category.
        let by_tag = store.search_kb(&["malloc".to_string()], None);
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].category, "Memory Allocation Error");

        // Case-insensitive category substring, disjoint tags.
        let by_category = store.search_kb(&["unrelated".to_string()], Some("memory allocation"));
        assert_eq!(by_category.len(), 1);

        // Neither condition holds.
        assert!(store
            .search_kb(&["unrelated".to_string()], Some("networking"))
            .is_empty());
    }

    #[test]
    fn queue_views_merge_defaults_when_extraction_is_pending() {
        let mut store = CaseStore::new();
        let h = store.add_helper("Alice", vec![]);
        let r = store.add_request(&submission("q"));
        store.add_queue_entry(r, h, 15).unwrap();

        let views = store.queue_views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].category, "General");
        assert!(views[0].tags.is_empty());
        assert_eq!(views[0].assigned_helper_name, "Alice");
        assert!(views[0].answer_outline.is_none());
    }

    #[test]
    fn metrics_count_resolved_and_time_saved() {
        let mut store = CaseStore::new();
        let h = store.add_helper("Alice", vec![]);
        let r1 = store.add_request(&submission("a"));
        let r2 = store.add_request(&submission("b"));
        let q1 = store.add_queue_entry(r1, h, 10).unwrap();
        store.add_queue_entry(r2, h, 10).unwrap();
        store.transition_queue_entry(q1, QueueStatus::Done).unwrap();

        let metrics = store.metrics();
        assert_eq!(metrics.total_requests, 2);
        assert_eq!(metrics.resolved_count, 1);
        assert_eq!(metrics.active_queue_count, 1);
        assert_eq!(
            metrics.estimated_time_saved_minutes,
            TIME_SAVED_PER_RESOLVE_MINUTES
        );
    }
}
