//! Labeling counters. Accumulate only; nothing here ever decrements.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub count: u64,
    pub gas_spent_eth: f64,
    pub tx_count: u64,
}

impl Tally {
    pub fn add(&mut self, gas_spent_eth: f64, tx_count: u64) {
        self.count += 1;
        self.gas_spent_eth += gas_spent_eth.max(0.0);
        self.tx_count = self.tx_count.saturating_add(tx_count);
    }
}

/// Session tally lives for the process; all-time tally starts from whatever the
/// caller seeds it with (zero, or a persisted value).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LabelingStats {
    pub session: Tally,
    pub all_time: Tally,
}

impl LabelingStats {
    pub fn with_all_time(all_time: Tally) -> Self {
        Self {
            session: Tally::default(),
            all_time,
        }
    }

    pub fn record_label(&mut self, gas_spent_eth: f64, tx_count: u64) {
        self.session.add(gas_spent_eth, tx_count);
        self.all_time.add(gas_spent_eth, tx_count);
    }
}
