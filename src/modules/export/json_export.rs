//! JSON Export
//!
//! Full records, enrichment included, in display order.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{ContractRecord, DisplayRow};

pub fn write_records(
    path: &Path,
    rows: &[DisplayRow],
    records: &[ContractRecord],
) -> Result<usize, Box<dyn std::error::Error>> {
    let ordered: Vec<&ContractRecord> = rows
        .iter()
        .filter_map(|row| records.get(row.source_index))
        .collect();

    let json = serde_json::to_string_pretty(&ordered)?;

    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;

    Ok(ordered.len())
}
