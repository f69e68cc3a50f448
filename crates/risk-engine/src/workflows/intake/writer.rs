use std::io::Write;

use crate::workflows::underwriting::{RawRecord, RejectedRecord, ScoredRecord};

pub(crate) fn write_raw<W: Write>(writer: W, records: &[RawRecord]) -> Result<(), csv::Error> {
    let columns = field_columns(records.iter(), &[]);
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(&columns)?;
    for record in records {
        csv_writer.write_record(cells(record, &columns))?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub(crate) fn write_scored<W: Write>(
    writer: W,
    records: &[ScoredRecord],
) -> Result<(), csv::Error> {
    let columns = field_columns(
        records.iter().map(|scored| &scored.record),
        &ScoredRecord::OUTPUT_FIELDS,
    );
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = columns.clone();
    header.extend(ScoredRecord::OUTPUT_FIELDS.map(String::from));
    csv_writer.write_record(&header)?;

    for scored in records {
        let mut row = cells(&scored.record, &columns);
        row.push(scored.risk_score.to_string());
        row.push(scored.status().label().to_string());
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub(crate) fn write_rejected<W: Write>(
    writer: W,
    records: &[RejectedRecord],
) -> Result<(), csv::Error> {
    let columns = field_columns(
        records.iter().map(|rejected| &rejected.record),
        &RejectedRecord::OUTPUT_FIELDS,
    );
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = columns.clone();
    header.extend(RejectedRecord::OUTPUT_FIELDS.map(String::from));
    csv_writer.write_record(&header)?;

    for rejected in records {
        let mut row = cells(&rejected.record, &columns);
        row.push(rejected.status().label().to_string());
        row.push(rejected.error_reason());
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Union of field names across records, in first-seen order, leaving out the
/// columns the caller appends itself.
fn field_columns<'a>(
    records: impl Iterator<Item = &'a RawRecord>,
    reserved: &[&str],
) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for (name, _) in record.iter_except(reserved) {
            if !columns.iter().any(|column| column == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

fn cells(record: &RawRecord, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|column| {
            record
                .get(column)
                .map(|value| value.to_string())
                .unwrap_or_default()
        })
        .collect()
}
