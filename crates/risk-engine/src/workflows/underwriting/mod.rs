//! Applicant underwriting: schema validation, rule-based risk scoring, and the
//! pipeline that partitions a batch into scored and rejected records.

pub mod audit;
pub mod domain;
pub mod pipeline;
pub mod router;
pub mod schema;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use audit::{
    AuditError, AuditSink, JsonLinesAuditLog, NullAuditSink, RejectionEntry, TracingAuditSink,
};
pub use domain::{Applicant, FieldValue, RawRecord, RecordStatus, RejectedRecord, ScoredRecord};
pub use pipeline::{PartitionedRecords, PipelineSummary, RiskPipeline};
pub use router::{scoring_router, ScoreRequest};
pub use schema::{validate, ConstraintViolation, ConstraintViolations, ViolationKind};
pub use scoring::{
    RiskAssessment, RiskFactor, RiskRules, RiskScorer, RuleTable, ScoreComponent,
    UnknownRuleTable,
};
