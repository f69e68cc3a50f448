use std::sync::Arc;

use super::common::*;
use crate::workflows::underwriting::domain::{FieldValue, RawRecord, RecordStatus};
use crate::workflows::underwriting::pipeline::RiskPipeline;
use crate::workflows::underwriting::scoring::RiskScorer;

fn ids(records: impl Iterator<Item = String>) -> Vec<String> {
    records.collect()
}

#[test]
fn process_partitions_stably_by_outcome() {
    let (pipeline, _) = build_pipeline();

    let partitioned = pipeline.process(mixed_batch());

    assert_eq!(
        ids(partitioned
            .valid
            .iter()
            .map(|scored| scored.record.applicant_id_label())),
        vec!["10000003", "10000004", "10000006"]
    );
    assert_eq!(
        ids(partitioned
            .rejected
            .iter()
            .map(|rejected| rejected.record.applicant_id_label())),
        vec!["10000001", "10000002", "10000005"]
    );
    let scores: Vec<_> = partitioned
        .valid
        .iter()
        .map(|scored| scored.risk_score)
        .collect();
    assert_eq!(scores, vec![0, 50, 15 + 15 + 40]);
}

#[test]
fn every_input_lands_in_exactly_one_output() {
    let (pipeline, _) = build_pipeline();
    let batch = mixed_batch();

    let partitioned = pipeline.process(batch.clone());

    assert_eq!(partitioned.len(), batch.len());
    let summary = partitioned.summary();
    assert_eq!(summary.valid + summary.rejected, summary.total);
    for input in &batch {
        let id = input.applicant_id_label();
        let in_valid = partitioned
            .valid
            .iter()
            .filter(|scored| scored.record.applicant_id_label() == id)
            .count();
        let in_rejected = partitioned
            .rejected
            .iter()
            .filter(|rejected| rejected.record.applicant_id_label() == id)
            .count();
        assert_eq!(in_valid + in_rejected, 1, "applicant {id} placed once");
    }
}

#[test]
fn rejection_reasons_name_the_failing_field() {
    let (pipeline, _) = build_pipeline();

    let partitioned = pipeline.process(mixed_batch());

    let reasons: Vec<_> = partitioned
        .rejected
        .iter()
        .map(|rejected| rejected.error_reason())
        .collect();
    assert!(reasons[0].contains("age"));
    assert!(reasons[1].contains("credit_score"));
    assert!(reasons[2].contains("claims_history: missing required field"));
    assert!(partitioned
        .rejected
        .iter()
        .all(|rejected| rejected.status() == RecordStatus::Rejected));
    assert!(partitioned
        .valid
        .iter()
        .all(|scored| scored.status() == RecordStatus::Valid));
}

#[test]
fn passthrough_fields_survive_either_outcome() {
    let (pipeline, _) = build_pipeline();

    let partitioned = pipeline.process(mixed_batch());

    assert_eq!(
        partitioned.valid[0].record.get("state"),
        Some(&FieldValue::text("IA"))
    );
    assert_eq!(
        partitioned.valid[0].record.get("vehicle_type"),
        Some(&FieldValue::text("Sedan"))
    );
    assert_eq!(
        partitioned.rejected[2].record.get("state"),
        Some(&FieldValue::text("NE"))
    );
    assert_eq!(partitioned.valid[0].record, valid_record(10000003));
}

#[test]
fn repeated_runs_are_identical() {
    let (pipeline, _) = build_pipeline();

    let first = pipeline.process(mixed_batch());
    let second = pipeline.process(mixed_batch());

    assert_eq!(first, second);
}

#[test]
fn one_audit_entry_per_rejection() {
    let (pipeline, audit) = build_pipeline();

    pipeline.process(mixed_batch());

    let entries = audit.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].applicant_id, "10000001");
    assert_eq!(entries[0].error_reason, "age: -5 is below minimum 0");
    assert_eq!(entries[1].applicant_id, "10000002");
}

#[test]
fn audit_failures_do_not_abort_the_run() {
    let pipeline = RiskPipeline::new(RiskScorer::default(), Arc::new(UnavailableAudit));

    let partitioned = pipeline.process(mixed_batch());

    assert_eq!(partitioned.rejected.len(), 3);
    assert_eq!(partitioned.valid.len(), 3);
}

#[test]
fn missing_identifier_is_audited_with_placeholder() {
    let (pipeline, audit) = build_pipeline();
    let record = RawRecord::new().with("name", "Anonymous");

    let partitioned = pipeline.process(vec![record]);

    assert_eq!(partitioned.rejected.len(), 1);
    assert_eq!(audit.entries()[0].applicant_id, "<missing>");
}

#[test]
fn source_errors_abort_try_process() {
    let (pipeline, _) = build_pipeline();
    let source = vec![Ok(valid_record(1)), Err("source unreadable"), Ok(valid_record(2))];

    let result = pipeline.try_process(source);

    assert_eq!(result, Err("source unreadable"));
}

#[test]
fn empty_batch_yields_empty_partitions() {
    let (pipeline, audit) = build_pipeline();

    let partitioned = pipeline.process(Vec::<RawRecord>::new());

    assert!(partitioned.is_empty());
    assert!(audit.entries().is_empty());
}
