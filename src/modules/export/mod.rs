//! Export Module
//!
//! - `:export csv` → the table as currently projected (sorted, filtered)
//! - `:export json` → the enriched records behind it
//! - Files land in `<data dir>/exports/` with a timestamped name

mod csv_export;
mod json_export;

use std::fs;
use std::path::Path;

use chrono::Local;

use crate::core::{Action, NotifyLevel};
use crate::domain::{ContractRecord, DisplayRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            None | Some("") | Some("csv") => Some(ExportFormat::Csv),
            Some("json") => Some(ExportFormat::Json),
            _ => None,
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// What to export: the visible rows and the records they point into.
pub struct ExportRequest<'a> {
    pub origin_key: &'a str,
    pub rows: &'a [DisplayRow],
    pub records: &'a [ContractRecord],
}

/// Generate a timestamped filename
fn generate_filename(prefix: &str, extension: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    format!("{}-{}.{}", prefix, timestamp, extension)
}

pub fn export(format: ExportFormat, request: &ExportRequest<'_>, dir: &Path) -> Action {
    if request.rows.is_empty() {
        return Action::Notify("No contracts to export".to_string(), NotifyLevel::Warn);
    }

    if let Err(e) = fs::create_dir_all(dir) {
        return Action::Notify(
            format!("Failed to create export directory: {}", e),
            NotifyLevel::Error,
        );
    }

    let filename = generate_filename(
        &format!("contracts-{}", request.origin_key),
        format.extension(),
    );
    let path = dir.join(&filename);

    let written = match format {
        ExportFormat::Csv => csv_export::write_rows(&path, request.rows, request.records),
        ExportFormat::Json => json_export::write_records(&path, request.rows, request.records),
    };

    match written {
        Ok(count) => {
            tracing::info!(path = %path.display(), count, "export written");
            Action::Notify(
                format!("Exported {} contracts to {}", count, path.display()),
                NotifyLevel::Info,
            )
        }
        Err(e) => Action::Notify(format!("Export failed: {}", e), NotifyLevel::Error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{project, RecordId, SortState};

    fn records() -> Vec<ContractRecord> {
        let mut a = ContractRecord::new(RecordId::new("rec1"), "0x1111111111111111111111111111111111111111");
        a.contract_name = "Vault".to_string();
        a.gas_spent_eth = 1.5;
        a.tx_count = 4;
        a.owner_project = Some("acme".to_string());
        let b = ContractRecord::new(RecordId::new("rec2"), "0x2222222222222222222222222222222222222222");
        vec![b, a]
    }

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("labeldesk-export-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse(None), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse(Some("JSON")), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::parse(Some("xlsx")), None);
    }

    #[test]
    fn test_csv_follows_projection() {
        let records = records();
        let rows = project(&records, SortState::default());
        let dir = temp_dir("csv");

        let action = export(
            ExportFormat::Csv,
            &ExportRequest {
                origin_key: "base",
                rows: &rows,
                records: &records,
            },
            &dir,
        );
        assert!(matches!(action, Action::Notify(_, NotifyLevel::Info)));

        let file = fs::read_dir(&dir).unwrap().next().unwrap().unwrap().path();
        let content = fs::read_to_string(file).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("address,contract_name"));
        assert!(lines[1].starts_with("0x1111111111111111111111111111111111111111,Vault,1.500,4"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_json_contains_record_ids() {
        let records = records();
        let rows = project(&records, SortState::default());
        let dir = temp_dir("json");

        export(
            ExportFormat::Json,
            &ExportRequest {
                origin_key: "base",
                rows: &rows,
                records: &records,
            },
            &dir,
        );

        let file = fs::read_dir(&dir).unwrap().next().unwrap().unwrap().path();
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(file).unwrap()).unwrap();
        assert_eq!(parsed[0]["record_id"], "rec1");
        assert_eq!(parsed[1]["record_id"], "rec2");
        assert_eq!(parsed[0]["enrichment"]["verified"], false);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_nothing_to_export() {
        let action = export(
            ExportFormat::Csv,
            &ExportRequest {
                origin_key: "base",
                rows: &[],
                records: &[],
            },
            Path::new("/nonexistent"),
        );
        assert!(matches!(action, Action::Notify(_, NotifyLevel::Warn)));
    }
}
