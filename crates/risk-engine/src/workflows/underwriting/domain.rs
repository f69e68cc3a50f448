use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::schema::ConstraintViolations;

/// Untyped cell value as delivered by an upstream source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Arrays and objects, carried through untouched.
    Nested(serde_json::Value),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(value) => write!(f, "{value}"),
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Float(value) => write!(f, "{value}"),
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Nested(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Applicant row before validation. Field order is the column order of the source
/// and is kept so written tables line up with what was read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, FieldValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a field, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Fields other than `reserved`, which an output stage is about to set itself.
    pub fn iter_except<'a>(
        &'a self,
        reserved: &'a [&'a str],
    ) -> impl Iterator<Item = (&'a str, &'a FieldValue)> + 'a {
        self.iter().filter(move |(name, _)| !reserved.contains(name))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Identifier used in audit entries, even when the record is malformed.
    pub fn applicant_id_label(&self) -> String {
        match self.get("applicant_id") {
            Some(value) if !value.is_null() => value.to_string(),
            _ => "<missing>".to_string(),
        }
    }
}

impl FromIterator<(String, FieldValue)> for RawRecord {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        let mut record = RawRecord::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl Serialize for RawRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawRecordVisitor;

        impl<'de> Visitor<'de> for RawRecordVisitor {
            type Value = RawRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of applicant fields")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<RawRecord, M::Error> {
                let mut record = RawRecord::new();
                while let Some((name, value)) = access.next_entry::<String, FieldValue>()? {
                    record.insert(name, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RawRecordVisitor)
    }
}

/// Applicant whose schema fields all satisfy their constraints. Only obtainable
/// through [`Applicant::new`] or [`super::schema::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applicant {
    pub(super) applicant_id: i64,
    pub(super) name: String,
    pub(super) age: u8,
    pub(super) credit_score: u16,
    pub(super) claims_history: i64,
}

impl Applicant {
    pub fn new(
        applicant_id: i64,
        name: impl Into<String>,
        age: i64,
        credit_score: i64,
        claims_history: i64,
    ) -> Result<Self, ConstraintViolations> {
        super::schema::build_applicant(applicant_id, name.into(), age, credit_score, claims_history)
    }

    pub fn applicant_id(&self) -> i64 {
        self.applicant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn credit_score(&self) -> u16 {
        self.credit_score
    }

    pub fn claims_history(&self) -> i64 {
        self.claims_history
    }
}

/// Terminal outcome of a record in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Valid,
    Rejected,
}

impl RecordStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RecordStatus::Valid => "Valid",
            RecordStatus::Rejected => "Rejected",
        }
    }
}

/// Validated record with its risk score; original fields are carried untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: RawRecord,
    pub risk_score: u64,
}

impl ScoredRecord {
    /// Columns computed by scoring; input fields of the same name are replaced.
    pub const OUTPUT_FIELDS: [&'static str; 2] = ["risk_score", "status"];

    pub const fn status(&self) -> RecordStatus {
        RecordStatus::Valid
    }
}

impl Serialize for ScoredRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.record.iter_except(&Self::OUTPUT_FIELDS) {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("risk_score", &self.risk_score)?;
        map.serialize_entry("status", self.status().label())?;
        map.end()
    }
}

/// Record that failed validation, with every violated constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub record: RawRecord,
    pub violations: ConstraintViolations,
}

impl RejectedRecord {
    /// Columns computed by validation; input fields of the same name are replaced.
    pub const OUTPUT_FIELDS: [&'static str; 2] = ["status", "error_reason"];

    pub const fn status(&self) -> RecordStatus {
        RecordStatus::Rejected
    }

    pub fn error_reason(&self) -> String {
        self.violations.to_string()
    }
}

impl Serialize for RejectedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.record.iter_except(&Self::OUTPUT_FIELDS) {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("status", self.status().label())?;
        map.serialize_entry("error_reason", &self.error_reason())?;
        map.end()
    }
}
