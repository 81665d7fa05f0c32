//! Sortable table view-model for the contract list.
//!
//! Ordering is two-level: rows with a display name always come first, then the
//! user-selected numeric key. Both passes are stable, so ties keep the order
//! the store returned.

use std::cmp::Ordering;

use super::record::{ContractRecord, NO_NAME};

const NAME_MAX_CHARS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    GasSpentEth,
    TxCount,
    AvgDailyActiveAddresses,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [
        SortKey::GasSpentEth,
        SortKey::TxCount,
        SortKey::AvgDailyActiveAddresses,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SortKey::GasSpentEth => "Gas (ETH)",
            SortKey::TxCount => "Tx Count",
            SortKey::AvgDailyActiveAddresses => "Avg DAA",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "gas" | "gas_eth" | "gasspenteth" => Some(SortKey::GasSpentEth),
            "tx" | "txs" | "txcount" | "tx_count" => Some(SortKey::TxCount),
            "daa" | "avg_daa" | "avgdaa" => Some(SortKey::AvgDailyActiveAddresses),
            _ => None,
        }
    }

    fn compare(&self, a: &ContractRecord, b: &ContractRecord) -> Ordering {
        match self {
            SortKey::GasSpentEth => a.gas_spent_eth.total_cmp(&b.gas_spent_eth),
            SortKey::TxCount => a.tx_count.cmp(&b.tx_count),
            SortKey::AvgDailyActiveAddresses => a
                .avg_daily_active_addresses
                .total_cmp(&b.avg_daily_active_addresses),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    /// Same key flips direction; a different key starts ascending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == Some(key) {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.key = Some(key);
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn indicator(&self, key: SortKey) -> &'static str {
        if self.key == Some(key) {
            self.direction.arrow()
        } else {
            ""
        }
    }
}

/// Short label plus the untruncated value for copy-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedText {
    pub short: String,
    pub full: String,
}

impl TruncatedText {
    pub fn is_truncated(&self) -> bool {
        self.short != self.full
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    /// Index into the slice passed to [`project`]
    pub source_index: usize,
    pub address: TruncatedText,
    pub name: TruncatedText,
    pub has_name: bool,
    pub gas_spent_eth: String,
    pub tx_count: String,
    pub avg_daily_active_addresses: String,
    pub owner_project: String,
    pub usage_category: String,
    pub verified: bool,
}

pub fn project(records: &[ContractRecord], sort: SortState) -> Vec<DisplayRow> {
    project_where(records, sort, |_| true)
}

/// Like [`project`], over the records `keep` accepts. Row indices still point
/// into the full slice.
pub fn project_where(
    records: &[ContractRecord],
    sort: SortState,
    keep: impl Fn(&ContractRecord) -> bool,
) -> Vec<DisplayRow> {
    let mut order: Vec<usize> = (0..records.len())
        .filter(|&index| keep(&records[index]))
        .collect();

    order.sort_by(|&a, &b| {
        let (ra, rb) = (&records[a], &records[b]);
        let named = rb
            .display_name()
            .is_some()
            .cmp(&ra.display_name().is_some());
        named.then_with(|| match sort.key {
            Some(key) => {
                let ord = key.compare(ra, rb);
                match sort.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            }
            None => Ordering::Equal,
        })
    });

    order
        .into_iter()
        .map(|index| display_row(index, &records[index]))
        .collect()
}

fn display_row(source_index: usize, record: &ContractRecord) -> DisplayRow {
    let name = record.display_name().unwrap_or(NO_NAME).to_string();
    DisplayRow {
        source_index,
        address: TruncatedText {
            short: short_addr(&record.address),
            full: record.address.clone(),
        },
        name: TruncatedText {
            short: truncate_name(&name),
            full: name,
        },
        has_name: record.display_name().is_some(),
        gas_spent_eth: format!("{:.3}", record.gas_spent_eth),
        tx_count: record.tx_count.to_string(),
        avg_daily_active_addresses: format_daa(record.avg_daily_active_addresses),
        owner_project: record.owner_project.clone().unwrap_or_default(),
        usage_category: record.usage_category.clone().unwrap_or_default(),
        verified: record.enrichment.verified,
    }
}

/// `0x1234…abcd`
pub fn short_addr(value: &str) -> String {
    let value = value.trim();
    if value.chars().count() <= 10 {
        return value.to_string();
    }
    let start: String = value.chars().take(6).collect();
    let end: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{start}…{end}")
}

fn truncate_name(value: &str) -> String {
    if value.chars().count() <= NAME_MAX_CHARS {
        return value.to_string();
    }
    value.chars().take(NAME_MAX_CHARS).collect::<String>() + "…"
}

fn format_daa(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::RecordId;

    fn record(id: &str, name: &str, gas: f64, txs: u64) -> ContractRecord {
        let mut r = ContractRecord::new(RecordId::new(id), format!("0x{:0>40}", id));
        r.contract_name = name.to_string();
        r.gas_spent_eth = gas;
        r.tx_count = txs;
        r
    }

    fn ids(rows: &[DisplayRow], records: &[ContractRecord]) -> Vec<String> {
        rows.iter()
            .map(|row| records[row.source_index].record_id.to_string())
            .collect()
    }

    #[test]
    fn test_named_rows_precede_regardless_of_key() {
        let records = vec![record("a", "", 5.0, 0), record("b", "X", 1.0, 0)];
        let rows = project(
            &records,
            SortState::by(SortKey::GasSpentEth, SortDirection::Ascending),
        );
        assert_eq!(ids(&rows, &records), vec!["b", "a"]);
        assert_eq!(rows[0].name.full, "X");
        assert_eq!(rows[1].name.full, NO_NAME);
    }

    #[test]
    fn test_secondary_key_and_direction() {
        let records = vec![
            record("a", "A", 3.0, 30),
            record("b", "", 9.0, 90),
            record("c", "C", 1.0, 10),
            record("d", "N/A", 4.0, 40),
        ];

        let asc = project(&records, SortState::by(SortKey::TxCount, SortDirection::Ascending));
        assert_eq!(ids(&asc, &records), vec!["c", "a", "d", "b"]);

        let desc = project(&records, SortState::by(SortKey::TxCount, SortDirection::Descending));
        assert_eq!(ids(&desc, &records), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            record("a", "A", 2.0, 0),
            record("b", "B", 1.0, 0),
            record("c", "C", 2.0, 0),
            record("d", "D", 1.0, 0),
        ];
        let asc = project(
            &records,
            SortState::by(SortKey::GasSpentEth, SortDirection::Ascending),
        );
        assert_eq!(ids(&asc, &records), vec!["b", "d", "a", "c"]);

        let desc = project(
            &records,
            SortState::by(SortKey::GasSpentEth, SortDirection::Descending),
        );
        assert_eq!(ids(&desc, &records), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_unsorted_only_groups_by_name() {
        let records = vec![
            record("a", "", 0.0, 0),
            record("b", "B", 0.0, 0),
            record("c", "", 0.0, 0),
            record("d", "D", 0.0, 0),
        ];
        let rows = project(&records, SortState::default());
        assert_eq!(ids(&rows, &records), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_toggle_flips_then_resets() {
        let mut sort = SortState::default();
        sort.toggle(SortKey::TxCount);
        assert_eq!(sort, SortState::by(SortKey::TxCount, SortDirection::Ascending));
        sort.toggle(SortKey::TxCount);
        assert_eq!(sort, SortState::by(SortKey::TxCount, SortDirection::Descending));
        sort.toggle(SortKey::GasSpentEth);
        assert_eq!(
            sort,
            SortState::by(SortKey::GasSpentEth, SortDirection::Ascending)
        );
        assert_eq!(sort.indicator(SortKey::GasSpentEth), "↑");
        assert_eq!(sort.indicator(SortKey::TxCount), "");
    }

    #[test]
    fn test_display_formatting_keeps_full_values() {
        let mut r = record("a", "TransparentUpgradeableProxy", 1.23456, 7);
        r.address = "0x1234567890abcdef1234567890abcdef12345678".to_string();
        r.avg_daily_active_addresses = 12.0;
        let rows = project(&[r], SortState::default());
        let row = &rows[0];

        assert_eq!(row.address.short, "0x1234…5678");
        assert_eq!(row.address.full, "0x1234567890abcdef1234567890abcdef12345678");
        assert_eq!(row.name.short, "TransparentUpgr…");
        assert_eq!(row.name.full, "TransparentUpgradeableProxy");
        assert!(row.name.is_truncated());
        assert_eq!(row.gas_spent_eth, "1.235");
        assert_eq!(row.avg_daily_active_addresses, "12");
    }

    #[test]
    fn test_filtered_projection_keeps_source_indices() {
        let mut labeled = record("b", "B", 2.0, 0);
        labeled.owner_project = Some("acme".to_string());
        let records = vec![record("a", "A", 1.0, 0), labeled, record("c", "", 3.0, 0)];

        let rows = project_where(&records, SortState::default(), |r| !r.is_labeled());
        assert_eq!(ids(&rows, &records), vec!["a", "c"]);
        assert_eq!(rows[1].source_index, 2);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("gas"), Some(SortKey::GasSpentEth));
        assert_eq!(SortKey::parse("TX"), Some(SortKey::TxCount));
        assert_eq!(SortKey::parse("daa"), Some(SortKey::AvgDailyActiveAddresses));
        assert_eq!(SortKey::parse("name"), None);
    }
}
