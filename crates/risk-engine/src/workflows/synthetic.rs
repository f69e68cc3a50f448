//! Synthetic applicant generation for demos and load-free testing.

use std::collections::HashSet;

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::workflows::underwriting::RawRecord;

const FIRST_NAMES: [&str; 16] = [
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "Carlos", "Aisha", "Wei", "Priya", "Mateo", "Fatima",
];

const LAST_NAMES: [&str; 16] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Nguyen", "Patel", "Kim", "Okafor", "Schmidt", "Rossi",
];

const STATES: [&str; 10] = ["CA", "TX", "FL", "NY", "IL", "PA", "OH", "GA", "IA", "WA"];

const VEHICLE_TYPES: [&str; 5] = ["Sedan", "SUV", "Pickup", "Motorcycle", "Minivan"];

/// Prior claim counts and how often each occurs.
const CLAIM_DISTRIBUTION: [(i64, f64); 4] = [(0, 0.70), (1, 0.20), (2, 0.05), (3, 0.05)];

/// Row 0 gets this age and row 1 this credit score when invalid rows are injected.
pub const INJECTED_INVALID_AGE: i64 = -5;
pub const INJECTED_INVALID_CREDIT_SCORE: i64 = 9000;

/// Fabricates applicant rows with realistic-looking attributes.
pub struct SyntheticApplicantSource {
    rng: StdRng,
    inject_invalid: bool,
}

impl SyntheticApplicantSource {
    /// A fixed seed makes the batch reproducible; `None` draws from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            inject_invalid: true,
        }
    }

    /// Controls whether the first two rows are corrupted to exercise rejection.
    pub fn inject_invalid(mut self, inject: bool) -> Self {
        self.inject_invalid = inject;
        self
    }

    pub fn generate(&mut self, count: usize) -> Vec<RawRecord> {
        let mut seen_ids = HashSet::with_capacity(count);
        let mut records = Vec::with_capacity(count);

        for _ in 0..count {
            let applicant_id = loop {
                let candidate = self.rng.gen_range(10_000_000..100_000_000_i64);
                if seen_ids.insert(candidate) {
                    break candidate;
                }
            };
            let name = format!(
                "{} {}",
                FIRST_NAMES[self.rng.gen_range(0..FIRST_NAMES.len())],
                LAST_NAMES[self.rng.gen_range(0..LAST_NAMES.len())]
            );

            let claims_history = CLAIM_DISTRIBUTION
                .choose_weighted(&mut self.rng, |(_, weight)| *weight)
                .map(|(count, _)| *count)
                .unwrap_or(0);

            records.push(
                RawRecord::new()
                    .with("applicant_id", applicant_id)
                    .with("name", name)
                    .with("age", self.rng.gen_range(18..90_i64))
                    .with("credit_score", self.rng.gen_range(300..850_i64))
                    .with("claims_history", claims_history)
                    .with("state", STATES[self.rng.gen_range(0..STATES.len())])
                    .with(
                        "vehicle_type",
                        VEHICLE_TYPES[self.rng.gen_range(0..VEHICLE_TYPES.len())],
                    ),
            );
        }

        if self.inject_invalid {
            if let Some(first) = records.get_mut(0) {
                first.insert("age", INJECTED_INVALID_AGE);
            }
            if let Some(second) = records.get_mut(1) {
                second.insert("credit_score", INJECTED_INVALID_CREDIT_SCORE);
            }
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::underwriting::{validate, FieldValue};

    #[test]
    fn seeded_batches_are_reproducible() {
        let first = SyntheticApplicantSource::new(Some(7)).generate(50);
        let second = SyntheticApplicantSource::new(Some(7)).generate(50);

        assert_eq!(first, second);
    }

    #[test]
    fn generated_ids_are_unique_eight_digit_numbers() {
        let records = SyntheticApplicantSource::new(Some(11)).generate(500);
        let mut ids = HashSet::new();

        for record in &records {
            match record.get("applicant_id") {
                Some(FieldValue::Integer(id)) => {
                    assert!((10_000_000..100_000_000).contains(id));
                    assert!(ids.insert(*id), "duplicate id {id}");
                }
                other => panic!("expected integer id, got {other:?}"),
            }
        }
    }

    #[test]
    fn injected_rows_fail_validation_and_the_rest_pass() {
        let records = SyntheticApplicantSource::new(Some(3)).generate(100);

        let age_violation = validate(&records[0]).expect_err("row 0 has a negative age");
        assert!(age_violation.mentions("age"));
        let credit_violation = validate(&records[1]).expect_err("row 1 has a bad credit score");
        assert!(credit_violation.mentions("credit_score"));
        assert!(records[2..].iter().all(|record| validate(record).is_ok()));
    }

    #[test]
    fn injection_can_be_disabled() {
        let records = SyntheticApplicantSource::new(Some(3))
            .inject_invalid(false)
            .generate(20);

        assert!(records.iter().all(|record| validate(record).is_ok()));
    }

    #[test]
    fn tiny_batches_only_corrupt_existing_rows() {
        let records = SyntheticApplicantSource::new(Some(5)).generate(1);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("age"), Some(&FieldValue::Integer(-5)));
        assert!(SyntheticApplicantSource::new(None).generate(0).is_empty());
    }

    #[test]
    fn passthrough_columns_are_present() {
        let records = SyntheticApplicantSource::new(Some(9)).generate(10);

        assert!(records
            .iter()
            .all(|record| record.get("state").is_some() && record.get("vehicle_type").is_some()));
    }
}
