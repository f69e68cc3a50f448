use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One rejected applicant, as handed to the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionEntry {
    pub applicant_id: String,
    pub error_reason: String,
}

/// Outbound hook receiving one entry per rejected record. Delivery is best effort:
/// the pipeline logs a failed delivery and keeps going.
pub trait AuditSink: Send + Sync {
    fn record_rejection(&self, entry: &RejectionEntry) -> Result<(), AuditError>;
}

/// Audit dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit log unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("audit entry could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Discards every entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record_rejection(&self, _entry: &RejectionEntry) -> Result<(), AuditError> {
        Ok(())
    }
}

/// Emits rejections as `tracing` warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record_rejection(&self, entry: &RejectionEntry) -> Result<(), AuditError> {
        warn!(
            applicant_id = %entry.applicant_id,
            error_reason = %entry.error_reason,
            "rejected applicant"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct AuditLine<'a> {
    recorded_at: String,
    level: &'static str,
    applicant_id: &'a str,
    error_reason: &'a str,
}

/// Appends rejections to a file, one JSON object per line.
pub struct JsonLinesAuditLog {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesAuditLog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AuditError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl AuditSink for JsonLinesAuditLog {
    fn record_rejection(&self, entry: &RejectionEntry) -> Result<(), AuditError> {
        let line = AuditLine {
            recorded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level: "WARNING",
            applicant_id: &entry.applicant_id,
            error_reason: &entry.error_reason,
        };

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| AuditError::Unavailable("audit log mutex poisoned".to_string()))?;
        serde_json::to_writer(&mut *writer, &line)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// An absent sink accepts everything, so optional outputs compose with `(A, B)`.
impl<A> AuditSink for Option<A>
where
    A: AuditSink,
{
    fn record_rejection(&self, entry: &RejectionEntry) -> Result<(), AuditError> {
        match self {
            Some(sink) => sink.record_rejection(entry),
            None => Ok(()),
        }
    }
}

/// Fans an entry out to both sinks; both are attempted before the first error is
/// returned.
impl<A, B> AuditSink for (A, B)
where
    A: AuditSink,
    B: AuditSink,
{
    fn record_rejection(&self, entry: &RejectionEntry) -> Result<(), AuditError> {
        let first = self.0.record_rejection(entry);
        let second = self.1.record_rejection(entry);
        first.and(second)
    }
}
