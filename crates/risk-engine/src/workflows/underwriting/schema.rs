//! Field-by-field schema checks for applicant records.
//!
//! Every declared field is inspected and every failure is collected, so a rejected
//! record carries a complete report rather than the first problem found.

use std::fmt;

use serde::Serialize;

use super::domain::{Applicant, FieldValue, RawRecord};

pub const APPLICANT_ID: &str = "applicant_id";
pub const NAME: &str = "name";
pub const AGE: &str = "age";
pub const CREDIT_SCORE: &str = "credit_score";
pub const CLAIMS_HISTORY: &str = "claims_history";

/// Schema fields in the order violations are reported.
pub const SCHEMA_FIELDS: [&str; 5] = [APPLICANT_ID, NAME, AGE, CREDIT_SCORE, CLAIMS_HISTORY];

pub const MIN_AGE: i64 = 0;
pub const MAX_AGE: i64 = 120;
pub const MIN_CREDIT_SCORE: i64 = 300;
pub const MAX_CREDIT_SCORE: i64 = 850;

/// What went wrong with a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    Missing,
    NotAnInteger { observed: String },
    NotText { observed: String },
    Empty,
    BelowMinimum { observed: i64, minimum: i64 },
    AboveMaximum { observed: i64, maximum: i64 },
}

/// A field failing its declared type or bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintViolation {
    pub field: &'static str,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl ConstraintViolation {
    fn new(field: &'static str, kind: ViolationKind) -> Self {
        Self { field, kind }
    }

    /// Structural problems (absent or untypeable values) rather than bound failures.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self.kind,
            ViolationKind::Missing
                | ViolationKind::NotAnInteger { .. }
                | ViolationKind::NotText { .. }
        )
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match &self.kind {
            ViolationKind::Missing => write!(f, "{field}: missing required field"),
            ViolationKind::NotAnInteger { observed } => {
                write!(f, "{field}: {observed:?} is not an integer")
            }
            ViolationKind::NotText { observed } => write!(f, "{field}: {observed} is not text"),
            ViolationKind::Empty => write!(f, "{field}: must not be empty"),
            ViolationKind::BelowMinimum { observed, minimum } => {
                write!(f, "{field}: {observed} is below minimum {minimum}")
            }
            ViolationKind::AboveMaximum { observed, maximum } => {
                write!(f, "{field}: {observed} is above maximum {maximum}")
            }
        }
    }
}

/// Non-empty set of violations for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("{}", join_messages(.0))]
pub struct ConstraintViolations(Vec<ConstraintViolation>);

impl ConstraintViolations {
    pub fn iter(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn mentions(&self, field: &str) -> bool {
        self.0.iter().any(|violation| violation.field == field)
    }

    pub fn is_malformed(&self) -> bool {
        self.0.iter().any(ConstraintViolation::is_malformed)
    }
}

fn join_messages(violations: &[ConstraintViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Coerces and checks the schema fields of `record`. Fields outside the schema are
/// ignored here and travel with the record untouched.
pub fn validate(record: &RawRecord) -> Result<Applicant, ConstraintViolations> {
    let mut violations = Vec::new();

    let applicant_id = integer_field(record, APPLICANT_ID, &mut violations);
    let name = text_field(record, NAME, &mut violations);
    let age = integer_field(record, AGE, &mut violations)
        .and_then(|age| bounded::<u8>(AGE, age, MIN_AGE, MAX_AGE, &mut violations));
    let credit_score = integer_field(record, CREDIT_SCORE, &mut violations).and_then(|score| {
        bounded::<u16>(
            CREDIT_SCORE,
            score,
            MIN_CREDIT_SCORE,
            MAX_CREDIT_SCORE,
            &mut violations,
        )
    });
    let claims_history = integer_field(record, CLAIMS_HISTORY, &mut violations);

    match (applicant_id, name, age, credit_score, claims_history) {
        (Some(applicant_id), Some(name), Some(age), Some(credit_score), Some(claims_history))
            if violations.is_empty() =>
        {
            Ok(Applicant {
                applicant_id,
                name,
                age,
                credit_score,
                claims_history,
            })
        }
        _ => Err(ordered(violations)),
    }
}

pub(super) fn build_applicant(
    applicant_id: i64,
    name: String,
    age: i64,
    credit_score: i64,
    claims_history: i64,
) -> Result<Applicant, ConstraintViolations> {
    let mut violations = Vec::new();
    if name.trim().is_empty() {
        violations.push(ConstraintViolation::new(NAME, ViolationKind::Empty));
    }
    let age = bounded::<u8>(AGE, age, MIN_AGE, MAX_AGE, &mut violations);
    let credit_score = bounded::<u16>(
        CREDIT_SCORE,
        credit_score,
        MIN_CREDIT_SCORE,
        MAX_CREDIT_SCORE,
        &mut violations,
    );

    match (age, credit_score) {
        (Some(age), Some(credit_score)) if violations.is_empty() => Ok(Applicant {
            applicant_id,
            name,
            age,
            credit_score,
            claims_history,
        }),
        _ => Err(ordered(violations)),
    }
}

fn ordered(mut violations: Vec<ConstraintViolation>) -> ConstraintViolations {
    violations.sort_by_key(|violation| {
        SCHEMA_FIELDS
            .iter()
            .position(|field| *field == violation.field)
            .unwrap_or(SCHEMA_FIELDS.len())
    });
    ConstraintViolations(violations)
}

/// Checks `minimum..=maximum` and narrows to the field's storage type, which the
/// bounds always fit.
fn bounded<T>(
    field: &'static str,
    value: i64,
    minimum: i64,
    maximum: i64,
    violations: &mut Vec<ConstraintViolation>,
) -> Option<T>
where
    T: TryFrom<i64>,
{
    if value < minimum {
        violations.push(ConstraintViolation::new(
            field,
            ViolationKind::BelowMinimum {
                observed: value,
                minimum,
            },
        ));
        None
    } else if value > maximum {
        violations.push(ConstraintViolation::new(
            field,
            ViolationKind::AboveMaximum {
                observed: value,
                maximum,
            },
        ));
        None
    } else {
        T::try_from(value).ok()
    }
}

fn integer_field(
    record: &RawRecord,
    field: &'static str,
    violations: &mut Vec<ConstraintViolation>,
) -> Option<i64> {
    let value = match record.get(field) {
        None | Some(FieldValue::Null) => {
            violations.push(ConstraintViolation::new(field, ViolationKind::Missing));
            return None;
        }
        Some(value) => value,
    };

    match coerce_integer(value) {
        Some(parsed) => Some(parsed),
        None => {
            violations.push(ConstraintViolation::new(
                field,
                ViolationKind::NotAnInteger {
                    observed: value.to_string(),
                },
            ));
            None
        }
    }
}

fn text_field(
    record: &RawRecord,
    field: &'static str,
    violations: &mut Vec<ConstraintViolation>,
) -> Option<String> {
    let text = match record.get(field) {
        None | Some(FieldValue::Null) => {
            violations.push(ConstraintViolation::new(field, ViolationKind::Missing));
            return None;
        }
        Some(FieldValue::Text(text)) => text.clone(),
        Some(value @ (FieldValue::Integer(_) | FieldValue::Float(_))) => value.to_string(),
        Some(other) => {
            violations.push(ConstraintViolation::new(
                field,
                ViolationKind::NotText {
                    observed: other.to_string(),
                },
            ));
            return None;
        }
    };

    if text.trim().is_empty() {
        violations.push(ConstraintViolation::new(field, ViolationKind::Empty));
        return None;
    }
    Some(text)
}

/// Lax integer coercion: whole floats and numeric text are accepted, booleans and
/// fractional values are not.
fn coerce_integer(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Integer(value) => Some(*value),
        FieldValue::Float(value) => whole_float(*value),
        FieldValue::Text(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(whole_float))
        }
        FieldValue::Bool(_) | FieldValue::Nested(_) | FieldValue::Null => None,
    }
}

fn whole_float(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    if value.is_finite()
        && value.fract() == 0.0
        && value >= i64::MIN as f64
        && value < i64::MAX as f64
    {
        Some(value as i64)
    } else {
        None
    }
}
