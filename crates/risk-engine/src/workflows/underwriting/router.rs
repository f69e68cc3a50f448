use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::audit::AuditSink;
use super::domain::{RawRecord, RejectedRecord, ScoredRecord};
use super::pipeline::{PipelineSummary, RiskPipeline};

/// Batch of raw applicant records submitted for scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub records: Vec<RawRecord>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    summary: PipelineSummary,
    valid: Vec<ScoredRecord>,
    rejected: Vec<RejectedRecord>,
}

/// Router builder exposing the scoring endpoint.
pub fn scoring_router<A>(pipeline: Arc<RiskPipeline<A>>) -> Router
where
    A: AuditSink + 'static,
{
    Router::new()
        .route("/api/v1/applicants/score", post(score_handler::<A>))
        .with_state(pipeline)
}

pub(crate) async fn score_handler<A>(
    State(pipeline): State<Arc<RiskPipeline<A>>>,
    Json(request): Json<ScoreRequest>,
) -> Response
where
    A: AuditSink + 'static,
{
    // Audit sinks may write files, so the batch runs on the blocking pool.
    let scoring = tokio::task::spawn_blocking(move || pipeline.process(request.records));
    let partitioned = match scoring.await {
        Ok(partitioned) => partitioned,
        Err(err) => {
            error!(error = %err, "scoring task failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "scoring task failed" })),
            )
                .into_response();
        }
    };
    let body = ScoreResponse {
        summary: partitioned.summary(),
        valid: partitioned.valid,
        rejected: partitioned.rejected,
    };
    (StatusCode::OK, Json(body)).into_response()
}
