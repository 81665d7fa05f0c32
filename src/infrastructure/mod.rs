//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - The Airtable record store
//! - Blockscout and Sourcify clients, plus batch enrichment
//! - Tokio runtime bridge for async operations

pub mod enrich;
pub mod explorer;
pub mod records;
pub mod runtime;
pub mod sourcify;

pub use enrich::enrich;
pub use explorer::{BlockscoutClient, ContractLookup, ExplorerContract};
pub use records::{AirtableSettings, AirtableStore, RecordStore, LABELER_IDENTITY};
pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent, Services};
pub use sourcify::{AddressStatus, SourceBundle, SourceFile, SourcifyClient};
