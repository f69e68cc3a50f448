//! CSV persistence for applicant batches: raw input tables in, scored and rejected
//! tables out.

mod parser;
mod writer;

pub use parser::{RecordStream, EXTRA_FIELD_PREFIX};

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::workflows::underwriting::{PartitionedRecords, RawRecord, RejectedRecord, ScoredRecord};

pub const VALID_FILE_NAME: &str = "valid_applicants.csv";
pub const REJECTED_FILE_NAME: &str = "rejected_applicants.csv";

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("failed to access applicant table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid applicant CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("applicant table header repeats column `{name}`")]
    DuplicateColumn { name: String },
}

/// Locations of the two tables written for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub valid: PathBuf,
    pub rejected: PathBuf,
}

pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawRecord>, IntakeError> {
    parser::parse_records(reader)
}

pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>, IntakeError> {
    let file = File::open(path)?;
    read_records(file)
}

/// Opens a CSV for row-at-a-time reading, for use with
/// [`RiskPipeline::try_process`](crate::workflows::underwriting::RiskPipeline::try_process).
pub fn stream_records_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<impl Iterator<Item = Result<RawRecord, IntakeError>>, IntakeError> {
    let file = File::open(path)?;
    RecordStream::new(std::io::BufReader::new(file))
}

/// Writes raw records, e.g. a freshly generated synthetic batch.
pub fn write_records<W: Write>(writer: W, records: &[RawRecord]) -> Result<(), IntakeError> {
    Ok(writer::write_raw(writer, records)?)
}

pub fn write_scored<W: Write>(writer: W, records: &[ScoredRecord]) -> Result<(), IntakeError> {
    Ok(writer::write_scored(writer, records)?)
}

pub fn write_rejected<W: Write>(
    writer: W,
    records: &[RejectedRecord],
) -> Result<(), IntakeError> {
    Ok(writer::write_rejected(writer, records)?)
}

/// Writes `valid_applicants.csv` and `rejected_applicants.csv` under `dir`,
/// creating it when needed.
pub fn write_outputs<P: AsRef<Path>>(
    dir: P,
    partitioned: &PartitionedRecords,
) -> Result<OutputPaths, IntakeError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let paths = OutputPaths {
        valid: dir.join(VALID_FILE_NAME),
        rejected: dir.join(REJECTED_FILE_NAME),
    };
    write_scored(BufWriter::new(File::create(&paths.valid)?), &partitioned.valid)?;
    write_rejected(
        BufWriter::new(File::create(&paths.rejected)?),
        &partitioned.rejected,
    )?;

    Ok(paths)
}
