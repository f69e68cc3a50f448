use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which rule table scores applicants. `Extended` is the canonical business rule;
/// `Base` reproduces the earlier table without the senior and fair-credit tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTable {
    Base,
    #[default]
    Extended,
}

impl RuleTable {
    pub const fn label(self) -> &'static str {
        match self {
            RuleTable::Base => "base",
            RuleTable::Extended => "extended",
        }
    }
}

impl fmt::Display for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule table '{0}' (expected 'base' or 'extended')")]
pub struct UnknownRuleTable(pub String);

impl FromStr for RuleTable {
    type Err = UnknownRuleTable;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(RuleTable::Base),
            "extended" => Ok(RuleTable::Extended),
            other => Err(UnknownRuleTable(other.to_string())),
        }
    }
}

/// Point weights and thresholds for the risk rubric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRules {
    pub table: RuleTable,
    /// Applicants strictly younger than this pick up `young_driver_points`.
    pub young_driver_age: u8,
    pub young_driver_points: u64,
    /// Applicants strictly older than this pick up `senior_driver_points`.
    pub senior_driver_age: Option<u8>,
    pub senior_driver_points: u64,
    pub low_credit_below: u16,
    pub low_credit_points: u64,
    /// Upper bound (exclusive) of the fair-credit tier, which starts at `low_credit_below`.
    pub fair_credit_below: Option<u16>,
    pub fair_credit_points: u64,
    pub points_per_claim: u64,
}

impl RiskRules {
    pub fn for_table(table: RuleTable) -> Self {
        let extended = table == RuleTable::Extended;
        Self {
            table,
            young_driver_age: 25,
            young_driver_points: 20,
            senior_driver_age: extended.then_some(70),
            senior_driver_points: 15,
            low_credit_below: 600,
            low_credit_points: 30,
            fair_credit_below: extended.then_some(700),
            fair_credit_points: 15,
            points_per_claim: 20,
        }
    }
}

impl Default for RiskRules {
    fn default() -> Self {
        Self::for_table(RuleTable::default())
    }
}
