//! CSV writing and reading for PCA sales detail records.
//!
//! The legacy import format: a header row of bare field names, then one row
//! per record with every value wrapped in double quotes. Values are wrapped
//! as-is; the layout has no escaping for embedded quotes.

use super::PcaConfig;
use super::record::PcaRecord;
use super::schema::{FIELD_COUNT, SCHEMA_VERSION, header_names};
use crate::core::PcaError;

const BOM: char = '\u{feff}';

/// Serialize records with the default [`PcaConfig`] (LF, no BOM).
///
/// Zero records produce the header row alone.
pub fn to_csv(records: &[PcaRecord]) -> String {
    to_csv_with(records, &PcaConfig::default())
}

/// Serialize records. Rows are separated by the configured line ending;
/// the last row has no terminator.
pub fn to_csv_with(records: &[PcaRecord], config: &PcaConfig) -> String {
    let eol = config.line_ending.as_str();
    let mut out = String::new();

    if config.bom {
        out.push(BOM);
    }
    write_header(&mut out);

    for record in records {
        out.push_str(eol);
        write_row(&mut out, record);
    }

    out
}

fn write_header(out: &mut String) {
    for (i, name) in header_names().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(name);
    }
}

fn write_row(out: &mut String, record: &PcaRecord) {
    for (i, value) in record.values().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        out.push_str(value);
        out.push('"');
    }
}

/// Read a PCA sales detail CSV back into records.
///
/// The header must match the layout exactly. A leading BOM and either line
/// ending are accepted.
pub fn from_csv(text: &str) -> Result<Vec<PcaRecord>, PcaError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| PcaError::Csv(e.to_string()))?;
    if headers.len() != FIELD_COUNT || !headers.iter().eq(header_names()) {
        return Err(PcaError::Csv(format!(
            "header does not match sales detail layout v{SCHEMA_VERSION} ({} columns, expected {FIELD_COUNT})",
            headers.len()
        )));
    }

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let row_data = result.map_err(|e| PcaError::Csv(format!("row {}: {e}", row + 1)))?;
        let values: Vec<String> = row_data.iter().map(str::to_string).collect();
        let found = values.len();
        let record = PcaRecord::from_values(values).ok_or_else(|| {
            PcaError::Csv(format!(
                "row {}: expected {FIELD_COUNT} fields, found {found}",
                row + 1
            ))
        })?;
        records.push(record);
    }
    Ok(records)
}
