use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::Tally;

/// All-time labeling tally, one row keyed by `scope`.
#[derive(Debug)]
pub struct StatsStore {
    conn: Connection,
}

impl StatsStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let conn = Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    pub fn load(&self) -> Result<Tally> {
        let tally = self
            .conn
            .query_row(
                "SELECT count, gas_spent_eth, tx_count FROM tallies WHERE scope = 'all_time'",
                [],
                |row| {
                    Ok(Tally {
                        count: row.get::<_, i64>(0)?.max(0) as u64,
                        gas_spent_eth: row.get(1)?,
                        tx_count: row.get::<_, i64>(2)?.max(0) as u64,
                    })
                },
            )
            .optional()?;
        Ok(tally.unwrap_or_default())
    }

    pub fn save(&self, tally: &Tally) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tallies(scope, count, gas_spent_eth, tx_count) VALUES ('all_time', ?1, ?2, ?3)
             ON CONFLICT(scope) DO UPDATE SET
                count=excluded.count,
                gas_spent_eth=excluded.gas_spent_eth,
                tx_count=excluded.tx_count",
            params![
                i64::try_from(tally.count).unwrap_or(i64::MAX),
                tally.gas_spent_eth,
                i64::try_from(tally.tx_count).unwrap_or(i64::MAX)
            ],
        )?;
        Ok(())
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tallies (
                scope         TEXT PRIMARY KEY,
                count         INTEGER NOT NULL,
                gas_spent_eth REAL NOT NULL,
                tx_count      INTEGER NOT NULL
            );",
        )?;
        Ok(())
    }
}
