use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::audit::{AuditSink, RejectionEntry};
use super::domain::{RawRecord, RejectedRecord, ScoredRecord};
use super::schema::validate;
use super::scoring::RiskScorer;

/// Drives validation and scoring over a batch, splitting it by outcome.
pub struct RiskPipeline<A> {
    scorer: RiskScorer,
    audit: Arc<A>,
}

impl<A> RiskPipeline<A>
where
    A: AuditSink + 'static,
{
    pub fn new(scorer: RiskScorer, audit: Arc<A>) -> Self {
        Self { scorer, audit }
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    /// Validates and scores every record in input order. Each record lands in
    /// exactly one of the two outputs.
    pub fn process<I>(&self, records: I) -> PartitionedRecords
    where
        I: IntoIterator<Item = RawRecord>,
    {
        match self.try_process(records.into_iter().map(Ok::<_, std::convert::Infallible>)) {
            Ok(partitioned) => partitioned,
            Err(never) => match never {},
        }
    }

    /// Like [`RiskPipeline::process`] for sources that can fail mid-stream. A source
    /// error aborts the run; records already seen are dropped with it.
    pub fn try_process<I, E>(&self, records: I) -> Result<PartitionedRecords, E>
    where
        I: IntoIterator<Item = Result<RawRecord, E>>,
    {
        info!(rule_table = %self.scorer.rules().table, "starting validation and scoring");
        let mut partitioned = PartitionedRecords::default();

        for record in records {
            match self.evaluate(record?) {
                Outcome::Valid(scored) => partitioned.valid.push(scored),
                Outcome::Rejected(rejected) => partitioned.rejected.push(rejected),
            }
        }

        let summary = partitioned.summary();
        info!(
            total = summary.total,
            valid = summary.valid,
            rejected = summary.rejected,
            "validation and scoring finished"
        );
        Ok(partitioned)
    }

    fn evaluate(&self, record: RawRecord) -> Outcome {
        match validate(&record) {
            Ok(applicant) => {
                let risk_score = self.scorer.score(&applicant);
                debug!(applicant_id = applicant.applicant_id(), risk_score, "scored applicant");
                Outcome::Valid(ScoredRecord { record, risk_score })
            }
            Err(violations) => {
                let rejected = RejectedRecord { record, violations };
                let entry = RejectionEntry {
                    applicant_id: rejected.record.applicant_id_label(),
                    error_reason: rejected.error_reason(),
                };
                if let Err(error) = self.audit.record_rejection(&entry) {
                    warn!(
                        applicant_id = %entry.applicant_id,
                        %error,
                        "failed to record rejection in audit trail"
                    );
                }
                Outcome::Rejected(rejected)
            }
        }
    }
}

enum Outcome {
    Valid(ScoredRecord),
    Rejected(RejectedRecord),
}

/// Valid and rejected records, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartitionedRecords {
    pub valid: Vec<ScoredRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl PartitionedRecords {
    pub fn len(&self) -> usize {
        self.valid.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            total: self.len(),
            valid: self.valid.len(),
            rejected: self.rejected.len(),
        }
    }
}

/// Record counts for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub total: usize,
    pub valid: usize,
    pub rejected: usize,
}
