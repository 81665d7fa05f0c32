//! Batch explorer enrichment for a record listing

use futures::future::join_all;

use super::explorer::ContractLookup;
use crate::domain::{ChainRegistry, ContractRecord, Enrichment};
use crate::error::Result;

/// Look up every record at once and merge what comes back.
///
/// The output is index-aligned with `records`. A failed lookup is logged and
/// leaves that record with default enrichment; it never fails the batch. Only
/// an unknown chain does, before any request is made.
pub async fn enrich(
    lookup: &dyn ContractLookup,
    registry: &ChainRegistry,
    records: Vec<ContractRecord>,
    chain_id: &str,
) -> Result<Vec<ContractRecord>> {
    registry.lookup(chain_id)?;

    let lookups = records
        .iter()
        .map(|record| lookup.lookup_contract(chain_id, &record.address));
    let results = join_all(lookups).await;

    let mut failed = 0usize;
    let enriched: Vec<ContractRecord> = records
        .into_iter()
        .zip(results)
        .map(|(mut record, result)| {
            match result {
                Ok(contract) => {
                    if let Some(name) = contract.name.as_deref().map(str::trim) {
                        if !name.is_empty() {
                            record.contract_name = name.to_string();
                        }
                    }
                    record.enrichment = contract.enrichment();
                }
                Err(err) => {
                    failed += 1;
                    tracing::warn!(
                        chain_id,
                        address = %record.address,
                        operation = "enrich",
                        error = %err,
                        "explorer lookup failed"
                    );
                    record.enrichment = Enrichment::default();
                }
            }
            record
        })
        .collect();

    tracing::info!(
        chain_id,
        total = enriched.len(),
        failed,
        "enrichment settled"
    );
    Ok(enriched)
}
