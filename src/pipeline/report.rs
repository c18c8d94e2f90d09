use super::ReportRow;
use crate::error::BatchError;
use std::path::Path;

/// CSV header, in column order.
pub const REPORT_HEADER: [&str; 3] = ["prompt", "parsed_output", "raw_response"];

/// Write the report, replacing any existing file. The header is written even
/// when `rows` is empty; there is no index column.
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<(), BatchError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(REPORT_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a report written by [`write_report`].
pub fn read_report(path: &Path) -> Result<Vec<ReportRow>, BatchError> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<ReportRow>, csv::Error>>()?;
    Ok(rows)
}
