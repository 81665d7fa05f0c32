//! CSV Export
//!
//! One line per visible row, in display order, with untruncated values.

use std::path::Path;

use crate::domain::{ContractRecord, DisplayRow};

pub fn write_rows(
    path: &Path,
    rows: &[DisplayRow],
    records: &[ContractRecord],
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "address",
        "contract_name",
        "gas_eth",
        "txcount",
        "avg_daa",
        "owner_project",
        "usage_category",
        "verified",
        "is_proxy",
        "record_id",
    ])?;

    for row in rows {
        let Some(record) = records.get(row.source_index) else {
            continue;
        };
        wtr.write_record([
            row.address.full.clone(),
            record.display_name().unwrap_or_default().to_string(),
            row.gas_spent_eth.clone(),
            row.tx_count.clone(),
            row.avg_daily_active_addresses.clone(),
            row.owner_project.clone(),
            row.usage_category.clone(),
            row.verified.to_string(),
            record.enrichment.is_proxy.to_string(),
            record.record_id.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(rows.len())
}
