use super::super::domain::Applicant;
use super::config::RiskRules;
use super::{RiskFactor, ScoreComponent};

pub(crate) fn score_applicant(
    applicant: &Applicant,
    rules: &RiskRules,
) -> (Vec<ScoreComponent>, u64) {
    let mut components = Vec::new();

    let age = applicant.age();
    if age < rules.young_driver_age {
        components.push(ScoreComponent {
            factor: RiskFactor::YoungDriver,
            points: rules.young_driver_points,
            notes: format!("age {age} under {}", rules.young_driver_age),
        });
    }
    if let Some(senior_age) = rules.senior_driver_age {
        if age > senior_age {
            components.push(ScoreComponent {
                factor: RiskFactor::SeniorDriver,
                points: rules.senior_driver_points,
                notes: format!("age {age} over {senior_age}"),
            });
        }
    }

    let credit_score = applicant.credit_score();
    if credit_score < rules.low_credit_below {
        components.push(ScoreComponent {
            factor: RiskFactor::LowCredit,
            points: rules.low_credit_points,
            notes: format!("credit score {credit_score} below {}", rules.low_credit_below),
        });
    } else if let Some(fair_below) = rules.fair_credit_below {
        if credit_score < fair_below {
            components.push(ScoreComponent {
                factor: RiskFactor::FairCredit,
                points: rules.fair_credit_points,
                notes: format!(
                    "credit score {credit_score} in {}..{fair_below}",
                    rules.low_credit_below
                ),
            });
        }
    }

    // Negative claim counts carry no points.
    let claims = u64::try_from(applicant.claims_history()).unwrap_or(0);
    let claim_points = claims.saturating_mul(rules.points_per_claim);
    if claim_points > 0 {
        components.push(ScoreComponent {
            factor: RiskFactor::ClaimsHistory,
            points: claim_points,
            notes: format!("{claims} prior claim(s)"),
        });
    }

    let total = components
        .iter()
        .fold(0u64, |total, component| total.saturating_add(component.points));

    (components, total)
}
