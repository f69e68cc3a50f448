use std::io::Read;

use tracing::warn;

use super::IntakeError;
use crate::workflows::underwriting::{FieldValue, RawRecord};

/// Prefix for cells beyond the header width, numbered from 1.
pub const EXTRA_FIELD_PREFIX: &str = "_extra_";

/// Reads applicant rows keyed by the header line. Cells stay textual so that
/// passthrough columns are written back exactly as read; blank cells become `Null`.
/// Short rows simply lack the trailing fields and fail validation downstream.
pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<RawRecord>, IntakeError> {
    RecordStream::new(reader)?.collect()
}

/// Row-at-a-time reader; a broken row ends the stream with an error.
pub struct RecordStream<R> {
    headers: csv::StringRecord,
    rows: csv::StringRecordsIntoIter<R>,
}

impl<R: Read> RecordStream<R> {
    pub(crate) fn new(reader: R) -> Result<Self, IntakeError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        for (index, name) in headers.iter().enumerate() {
            if headers.iter().take(index).any(|earlier| earlier == name) {
                return Err(IntakeError::DuplicateColumn {
                    name: name.to_string(),
                });
            }
        }

        Ok(Self {
            headers,
            rows: csv_reader.into_records(),
        })
    }

    fn to_record(&self, row: &csv::StringRecord) -> RawRecord {
        let mut record = self
            .headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name.to_string(), cell_value(cell)))
            .collect::<RawRecord>();

        let extra = row.len().saturating_sub(self.headers.len());
        if extra > 0 {
            warn!(
                line = row.position().map(|position| position.line()),
                extra, "row is wider than the header; keeping surplus cells"
            );
            let mut suffix = 0;
            for cell in row.iter().skip(self.headers.len()) {
                let name = loop {
                    suffix += 1;
                    let candidate = format!("{EXTRA_FIELD_PREFIX}{suffix}");
                    if record.get(&candidate).is_none() {
                        break candidate;
                    }
                };
                record.insert(name, cell_value(cell));
            }
        }

        record
    }
}

impl<R: Read> Iterator for RecordStream<R> {
    type Item = Result<RawRecord, IntakeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(
            row.map(|row| self.to_record(&row))
                .map_err(IntakeError::from),
        )
    }
}

fn cell_value(cell: &str) -> FieldValue {
    if cell.is_empty() {
        FieldValue::Null
    } else {
        FieldValue::text(cell)
    }
}
