//! API routes for oracled.

use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use oracle_common::rpc::{
    MetricsReport, QueueView, ResolveAck, RosterEntry, Submission, SubmissionReceipt,
};
use oracle_common::{OracleError, VERSION};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::info;

type AppStateArc = Arc<AppState>;

pub fn api_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(root))
        .route("/v1/roster", get(get_roster))
        .route("/v1/questions", post(submit_question))
        .route("/v1/queue", get(get_queue))
        .route("/v1/queue/watch", get(watch_queue))
        .route("/v1/queue/:queue_id/resolve", post(resolve_question))
        .route("/v1/metrics", get(get_metrics))
}

/// Map the error taxonomy onto HTTP statuses: not-found lookups are 404,
/// rejected writes are 422.
fn reject(err: OracleError) -> (StatusCode, String) {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, err.to_string())
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": "Office Hours Oracle",
        "version": VERSION,
        "status": "running",
    }))
}

async fn get_roster(State(state): State<AppStateArc>) -> Json<Vec<RosterEntry>> {
    Json(state.pipeline.roster().await)
}

async fn submit_question(
    State(state): State<AppStateArc>,
    Json(submission): Json<Submission>,
) -> Result<Json<SubmissionReceipt>, (StatusCode, String)> {
    info!(student = %submission.student_name, course = %submission.course, "new question");
    state
        .pipeline
        .submit(submission)
        .await
        .map(Json)
        .map_err(reject)
}

async fn get_queue(State(state): State<AppStateArc>) -> Json<Vec<QueueView>> {
    Json(state.pipeline.queue().await)
}

async fn resolve_question(
    State(state): State<AppStateArc>,
    Path(queue_id): Path<u64>,
) -> Result<Json<ResolveAck>, (StatusCode, String)> {
    state
        .pipeline
        .resolve(queue_id)
        .await
        .map(Json)
        .map_err(reject)
}

async fn get_metrics(State(state): State<AppStateArc>) -> Json<MetricsReport> {
    Json(state.pipeline.metrics().await)
}

/// Server-sent queue snapshots: one initial snapshot, then one event per
/// store mutation for as long as the client stays connected.
async fn watch_queue(
    State(state): State<AppStateArc>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before taking the snapshot so a mutation landing in between
    // is buffered in the channel rather than lost. The client may see that
    // mutation twice; it never misses one.
    let rx = state.pipeline.watch("sse-client").await;
    let initial = state.pipeline.store().read().await.queue_update();

    let stream = tokio_stream::once(initial)
        .chain(UnboundedReceiverStream::new(rx))
        .map(|update| {
            let event = Event::default().event("queue_update");
            Ok(match event.json_data(&update) {
                Ok(event) => event,
                // QueueUpdate serialization cannot fail; keep the stream
                // alive with an empty event if it somehow does.
                Err(_) => Event::default().event("queue_update"),
            })
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
