use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::underwriting::audit::{AuditError, AuditSink, RejectionEntry};
use crate::workflows::underwriting::pipeline::RiskPipeline;
use crate::workflows::underwriting::router::{score_handler, scoring_router, ScoreRequest};
use crate::workflows::underwriting::scoring::RiskScorer;

#[tokio::test]
async fn score_handler_returns_partitioned_batch() {
    let (pipeline, audit) = build_pipeline();
    let request = ScoreRequest {
        records: mixed_batch(),
    };

    let response = score_handler::<MemoryAudit>(State(Arc::new(pipeline)), Json(request)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["summary"]["total"], 6);
    assert_eq!(body["summary"]["valid"], 3);
    assert_eq!(body["summary"]["rejected"], 3);
    assert_eq!(body["valid"][0]["status"], "Valid");
    assert_eq!(body["valid"][0]["risk_score"], 0);
    assert_eq!(body["valid"][0]["state"], "IA");
    assert_eq!(body["rejected"][0]["status"], "Rejected");
    assert_eq!(
        body["rejected"][0]["error_reason"],
        "age: -5 is below minimum 0"
    );
    assert_eq!(audit.entries().len(), 3);
}

#[tokio::test]
async fn score_route_accepts_json_records() {
    let (pipeline, _) = build_pipeline();
    let router = scoring_router(Arc::new(pipeline));
    let payload = json!({
        "records": [
            {
                "applicant_id": 20000001,
                "name": "Test",
                "age": 20,
                "credit_score": 500,
                "claims_history": 0,
                "state": "TX"
            },
            {
                "applicant_id": 20000002,
                "name": "Test",
                "age": 30,
                "credit_score": 9000,
                "claims_history": 0
            }
        ]
    });

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/applicants/score")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&payload).expect("payload encodes"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["valid"][0]["applicant_id"], 20000001);
    assert_eq!(body["valid"][0]["risk_score"], 50);
    assert_eq!(body["valid"][0]["state"], "TX");
    assert!(body["rejected"][0]["error_reason"]
        .as_str()
        .expect("reason is text")
        .contains("credit_score"));
}

#[tokio::test]
async fn score_route_rejects_malformed_json() {
    let (pipeline, _) = build_pipeline();
    let router = scoring_router(Arc::new(pipeline));

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/applicants/score")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from("{\"records\": [1, 2"))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn nested_extra_fields_do_not_sink_the_batch() {
    let (pipeline, audit) = build_pipeline();
    let router = scoring_router(Arc::new(pipeline));
    let payload = json!({
        "records": [
            {
                "applicant_id": 30000001,
                "name": "Plain",
                "age": 40,
                "credit_score": 720,
                "claims_history": 0
            },
            {
                "applicant_id": 30000002,
                "name": "Tagged",
                "age": 40,
                "credit_score": 720,
                "claims_history": 1,
                "tags": ["x"],
                "vehicle": { "make": "Volvo", "year": 2019 }
            },
            {
                "applicant_id": 30000003,
                "name": { "first": "Nested" },
                "age": 40,
                "credit_score": 720,
                "claims_history": 0
            }
        ]
    });

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/applicants/score")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["summary"]["total"], 3);
    assert_eq!(body["summary"]["valid"], 2);
    assert_eq!(body["valid"][1]["tags"], json!(["x"]));
    assert_eq!(body["valid"][1]["vehicle"]["make"], "Volvo");
    assert_eq!(body["valid"][1]["risk_score"], 20);
    assert_eq!(body["rejected"][0]["applicant_id"], 30000003);
    assert_eq!(body["rejected"][0]["name"]["first"], "Nested");
    assert_eq!(audit.entries().len(), 1);
}

#[derive(Default)]
struct ThreadRecordingAudit {
    threads: Mutex<Vec<ThreadId>>,
}

impl AuditSink for ThreadRecordingAudit {
    fn record_rejection(&self, _entry: &RejectionEntry) -> Result<(), AuditError> {
        self.threads
            .lock()
            .expect("audit mutex poisoned")
            .push(std::thread::current().id());
        Ok(())
    }
}

#[tokio::test]
async fn scoring_runs_off_the_request_thread() {
    let audit = Arc::new(ThreadRecordingAudit::default());
    let pipeline = RiskPipeline::new(RiskScorer::default(), audit.clone());

    let response = score_handler::<ThreadRecordingAudit>(
        State(Arc::new(pipeline)),
        Json(ScoreRequest {
            records: mixed_batch(),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let threads = audit.threads.lock().expect("audit mutex poisoned").clone();
    assert_eq!(threads.len(), 3);
    let request_thread = std::thread::current().id();
    assert!(threads.iter().all(|thread| *thread != request_thread));
}
