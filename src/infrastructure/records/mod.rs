//! Record store: where contract records live and where labels are written back

mod airtable;

pub use airtable::{AirtableSettings, AirtableStore, LABELER_IDENTITY};

use async_trait::async_trait;

use crate::domain::{ContractRecord, LabelDraft, RecordId};
use crate::error::Result;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records for a chain, in store order.
    async fn list_records(&self, chain_id: &str) -> Result<Vec<ContractRecord>>;

    /// Exact, case-sensitive address match over a fresh listing.
    async fn find_record_by_address(
        &self,
        chain_id: &str,
        address: &str,
    ) -> Result<Option<ContractRecord>> {
        let records = self.list_records(chain_id).await?;
        Ok(records.into_iter().find(|record| record.address == address))
    }

    async fn update_record(&self, record_id: &RecordId, draft: &LabelDraft) -> Result<()>;

    /// Known owner projects, for label suggestions
    async fn list_projects(&self) -> Result<Vec<String>>;

    /// Known usage categories, for label suggestions
    async fn list_categories(&self) -> Result<Vec<String>>;
}
