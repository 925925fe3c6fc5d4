//! Pipeline orchestrator.
//!
//! Runs the three generation stages strictly in sequence for each
//! submission and commits the results to the store in a single write
//! section, so readers never observe a half-written submission. Generation
//! failures never abort the pipeline (each stage falls back inside the
//! gateway); the only hard failures are store integrity violations, which
//! propagate to the caller with the store unmodified.

use crate::gateway::Gateway;
use crate::notifier::QueueNotifier;
use crate::store::SharedStore;
use oracle_common::rpc::{
    MetricsReport, QueueUpdate, QueueView, ResolveAck, RosterEntry, Submission, SubmissionReceipt,
};
use oracle_common::types::QueueStatus;
use oracle_common::OracleError;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

/// At most this many knowledge-base candidates reach the synthesizer.
pub const SYNTHESIS_SHORTLIST: usize = 3;

#[derive(Clone)]
pub struct Pipeline {
    gateway: Arc<Gateway>,
    store: SharedStore,
    notifier: Arc<QueueNotifier>,
}

impl Pipeline {
    pub fn new(gateway: Arc<Gateway>, store: SharedStore, notifier: Arc<QueueNotifier>) -> Self {
        Self {
            gateway,
            store,
            notifier,
        }
    }

    /// Run a submission through extract -> rank -> synthesize and queue it.
    pub async fn submit(&self, submission: Submission) -> Result<SubmissionReceipt, OracleError> {
        let roster = self.store.read().await.active_roster();
        if roster.is_empty() {
            return Err(OracleError::EmptyRoster);
        }

        let metadata = self.gateway.extract(&submission).await;
        info!(
            category = %metadata.category,
            difficulty = %metadata.difficulty,
            minutes = metadata.estimated_minutes,
            "extraction complete"
        );

        let ranking = self
            .gateway
            .rank(&metadata, &roster, submission.preferred_helper_id)
            .await
            .ok_or(OracleError::EmptyRoster)?;
        info!(
            helper_id = ranking.recommended_helper_id,
            score = ranking.priority_score,
            "ranking complete"
        );

        let candidates = {
            let store = self.store.read().await;
            let mut hits = store.search_kb(&metadata.tags, Some(&metadata.category));
            hits.truncate(SYNTHESIS_SHORTLIST);
            hits
        };
        let guidance = self
            .gateway
            .synthesize(&submission.question_text, &metadata, &candidates)
            .await;
        info!(
            similar = guidance.similar_entry_ids.len(),
            "synthesis complete"
        );

        // Commit everything under one write lock: request, both derived
        // fields, then the queue entry. The helper existence check comes
        // first so an integrity violation leaves the store untouched.
        let (receipt, update) = {
            let mut store = self.store.write().await;
            if store.helper(ranking.recommended_helper_id).is_none() {
                return Err(OracleError::UnknownHelper(ranking.recommended_helper_id));
            }
            let request_id = store.add_request(&submission);
            store.attach_extraction(request_id, metadata.clone())?;
            store.attach_guidance(request_id, guidance.clone())?;
            let queue_id = store.add_queue_entry(
                request_id,
                ranking.recommended_helper_id,
                metadata.estimated_minutes,
            )?;

            let receipt = SubmissionReceipt {
                queue_id,
                assigned_helper_name: store
                    .helper(ranking.recommended_helper_id)
                    .map(|h| h.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                estimated_wait_minutes: metadata.estimated_minutes,
                category: metadata.category.clone(),
                tags: metadata.tags.clone(),
                summary: metadata.summary.clone(),
                similar_entry_ids: guidance.similar_entry_ids.clone(),
            };
            (receipt, store.queue_update())
        };

        self.notifier.publish(update).await;
        Ok(receipt)
    }

    /// Mark a queue entry DONE and, when both derived request fields are
    /// present, promote them into a knowledge-base entry. Resolving an
    /// already-DONE entry is an acknowledged no-op.
    pub async fn resolve(&self, queue_id: u64) -> Result<ResolveAck, OracleError> {
        let (ack, update) = {
            let mut store = self.store.write().await;
            let entry = store
                .queue_entry(queue_id)
                .cloned()
                .ok_or(OracleError::QueueEntryNotFound(queue_id))?;

            let newly_resolved = store.transition_queue_entry(queue_id, QueueStatus::Done)?;

            let mut knowledge_entry_id = None;
            if newly_resolved {
                // Both derived fields present is the normal case; a request
                // that missed a stage just skips knowledge-base growth.
                let promoted = store.request(entry.request_id).and_then(|request| {
                    let metadata = request.extraction.as_ready()?;
                    let guidance = request.guidance.as_ready()?;
                    Some((
                        metadata.category.clone(),
                        metadata.tags.clone(),
                        metadata.summary.clone(),
                        guidance.answer_outline.clone(),
                    ))
                });
                if let Some((category, tags, summary, outline)) = promoted {
                    let id = store.add_knowledge_entry(
                        entry.request_id,
                        &category,
                        tags,
                        &summary,
                        &outline,
                    )?;
                    knowledge_entry_id = Some(id);
                    info!(queue_id, knowledge_entry_id = id, "resolved into knowledge base");
                } else {
                    info!(queue_id, "resolved without knowledge-base growth");
                }
            }

            (
                ResolveAck {
                    queue_id,
                    newly_resolved,
                    knowledge_entry_id,
                },
                store.queue_update(),
            )
        };

        self.notifier.publish(update).await;
        Ok(ack)
    }

    pub async fn queue(&self) -> Vec<QueueView> {
        self.store.read().await.queue_views()
    }

    pub async fn roster(&self) -> Vec<RosterEntry> {
        self.store.read().await.active_roster()
    }

    pub async fn metrics(&self) -> MetricsReport {
        self.store.read().await.metrics()
    }

    /// Register a queue observer (used by the SSE watch route).
    pub async fn watch(&self, name: &str) -> UnboundedReceiver<QueueUpdate> {
        self.notifier.subscribe(name).await
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}
