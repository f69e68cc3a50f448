use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::underwriting::audit::{AuditError, AuditSink, RejectionEntry};
use crate::workflows::underwriting::domain::RawRecord;
use crate::workflows::underwriting::pipeline::RiskPipeline;
use crate::workflows::underwriting::scoring::{RiskScorer, RuleTable};

pub(super) fn record(id: i64, age: i64, credit_score: i64, claims_history: i64) -> RawRecord {
    RawRecord::new()
        .with("applicant_id", id)
        .with("name", "Jordan Reyes")
        .with("age", age)
        .with("credit_score", credit_score)
        .with("claims_history", claims_history)
        .with("state", "IA")
        .with("vehicle_type", "Sedan")
}

pub(super) fn valid_record(id: i64) -> RawRecord {
    record(id, 30, 750, 0)
}

/// Mix of valid and invalid rows in a known order.
pub(super) fn mixed_batch() -> Vec<RawRecord> {
    vec![
        record(10000001, -5, 700, 0),
        record(10000002, 40, 9999, 1),
        valid_record(10000003),
        record(10000004, 20, 500, 0),
        RawRecord::new()
            .with("applicant_id", 10000005)
            .with("name", "No Claims Field")
            .with("age", 33)
            .with("credit_score", 640)
            .with("state", "NE"),
        record(10000006, 72, 650, 2),
    ]
}

pub(super) fn build_pipeline() -> (RiskPipeline<MemoryAudit>, Arc<MemoryAudit>) {
    let audit = Arc::new(MemoryAudit::default());
    let pipeline = RiskPipeline::new(RiskScorer::for_table(RuleTable::Extended), audit.clone());
    (pipeline, audit)
}

#[derive(Default, Clone)]
pub(super) struct MemoryAudit {
    entries: Arc<Mutex<Vec<RejectionEntry>>>,
}

impl MemoryAudit {
    pub(super) fn entries(&self) -> Vec<RejectionEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for MemoryAudit {
    fn record_rejection(&self, entry: &RejectionEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry.clone());
        Ok(())
    }
}

pub(super) struct UnavailableAudit;

impl AuditSink for UnavailableAudit {
    fn record_rejection(&self, _entry: &RejectionEntry) -> Result<(), AuditError> {
        Err(AuditError::Unavailable("audit store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
