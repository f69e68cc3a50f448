mod config;
mod rules;

pub use config::{RiskRules, RuleTable, UnknownRuleTable};

use super::domain::Applicant;
use serde::{Deserialize, Serialize};

/// Stateless scorer that applies a rule table to validated applicants.
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    rules: RiskRules,
}

impl RiskScorer {
    pub fn new(rules: RiskRules) -> Self {
        Self { rules }
    }

    pub fn for_table(table: RuleTable) -> Self {
        Self::new(RiskRules::for_table(table))
    }

    pub fn rules(&self) -> &RiskRules {
        &self.rules
    }

    pub fn score(&self, applicant: &Applicant) -> u64 {
        rules::score_applicant(applicant, &self.rules).1
    }

    pub fn assess(&self, applicant: &Applicant) -> RiskAssessment {
        let (components, risk_score) = rules::score_applicant(applicant, &self.rules);
        RiskAssessment {
            applicant_id: applicant.applicant_id(),
            risk_score,
            components,
        }
    }
}

/// Rules that can contribute to a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    YoungDriver,
    SeniorDriver,
    LowCredit,
    FairCredit,
    ClaimsHistory,
}

/// Discrete contribution to a risk score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: RiskFactor,
    pub points: u64,
    pub notes: String,
}

/// Score plus the rules that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub applicant_id: i64,
    pub risk_score: u64,
    pub components: Vec<ScoreComponent>,
}
