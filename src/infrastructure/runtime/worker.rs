//! Async worker - runs in the Tokio runtime and performs network operations

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::Duration;

use anyhow::Result;

use crate::infrastructure::enrich::enrich;
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent, Services};

/// Run the async worker loop until `Shutdown` or the UI hangs up.
///
/// Each command becomes its own task, so a slow store call never holds up an
/// explorer lookup. Ordering between results is therefore not guaranteed;
/// the app sorts that out with tickets and generations.
pub async fn run_async_worker(
    services: Services,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    tracing::debug!(chains = services.registry.len(), "runtime worker started");

    loop {
        loop {
            match cmd_rx.try_recv() {
                Ok(RuntimeCommand::Shutdown) => {
                    tracing::debug!("runtime worker shutting down");
                    return Ok(());
                }
                Ok(cmd) => dispatch(&services, cmd, &evt_tx),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn dispatch(services: &Services, cmd: RuntimeCommand, evt_tx: &Sender<RuntimeEvent>) {
    let services = services.clone();
    let evt_tx = evt_tx.clone();

    tokio::spawn(async move {
        let event = handle(&services, cmd).await;
        if let Some(event) = event {
            let _ = evt_tx.send(event);
        }
    });
}

/// Execute one command. Errors travel inside the event, never out of here.
pub(crate) async fn handle(services: &Services, cmd: RuntimeCommand) -> Option<RuntimeEvent> {
    let event = match cmd {
        RuntimeCommand::LoadRecords {
            generation,
            chain_id,
        } => {
            let result = services.store.list_records(&chain_id).await;
            if let Err(ref err) = result {
                tracing::error!(chain_id = %chain_id, operation = "list_records", error = %err, "listing failed");
            }
            RuntimeEvent::RecordsLoaded {
                generation,
                chain_id,
                result,
            }
        }

        RuntimeCommand::EnrichRecords {
            generation,
            chain_id,
            records,
        } => {
            let result = enrich(
                services.explorer.as_ref(),
                &services.registry,
                records,
                &chain_id,
            )
            .await;
            if let Err(ref err) = result {
                tracing::error!(chain_id = %chain_id, operation = "enrich", error = %err, "enrichment failed");
            }
            RuntimeEvent::RecordsEnriched {
                generation,
                chain_id,
                result,
            }
        }

        RuntimeCommand::ResolveRecord {
            ticket,
            chain_id,
            address,
        } => {
            let result = services
                .store
                .find_record_by_address(&chain_id, &address)
                .await;
            match result {
                Ok(None) => {
                    tracing::warn!(chain_id = %chain_id, address = %address, operation = "resolve", "no record for address")
                }
                Err(ref err) => {
                    tracing::error!(chain_id = %chain_id, address = %address, operation = "resolve", error = %err, "resolution failed")
                }
                Ok(Some(_)) => {}
            }
            RuntimeEvent::RecordResolved { ticket, result }
        }

        RuntimeCommand::SubmitLabel {
            ticket,
            chain_id,
            address,
            record_id,
            draft,
        } => {
            let result = services.store.update_record(&record_id, &draft).await;
            if let Err(ref err) = result {
                tracing::error!(chain_id = %chain_id, address = %address, record_id = %record_id, operation = "update_record", error = %err, "label write failed");
            }
            RuntimeEvent::LabelSubmitted {
                ticket,
                record_id,
                result,
            }
        }

        RuntimeCommand::CheckVerification { chain_id, address } => {
            let result = services
                .sourcify
                .check_verification(&chain_id, &address)
                .await;
            if let Err(ref err) = result {
                tracing::error!(chain_id = %chain_id, address = %address, operation = "check_verification", error = %err, "verification check failed");
            }
            RuntimeEvent::VerificationChecked {
                chain_id,
                address,
                result,
            }
        }

        RuntimeCommand::FetchSources { chain_id, address } => {
            let result = services.sourcify.fetch_sources(&chain_id, &address).await;
            if let Err(ref err) = result {
                tracing::error!(chain_id = %chain_id, address = %address, operation = "fetch_sources", error = %err, "source fetch failed");
            }
            RuntimeEvent::SourcesFetched {
                chain_id,
                address,
                result,
            }
        }

        RuntimeCommand::FetchContract { chain_id, address } => {
            let result = services.explorer.lookup_contract(&chain_id, &address).await;
            if let Err(ref err) = result {
                tracing::error!(chain_id = %chain_id, address = %address, operation = "lookup_contract", error = %err, "contract lookup failed");
            }
            RuntimeEvent::ContractFetched {
                chain_id,
                address,
                result,
            }
        }

        RuntimeCommand::LoadCatalog => {
            let (projects, categories) = tokio::join!(
                services.store.list_projects(),
                services.store.list_categories()
            );
            RuntimeEvent::CatalogLoaded {
                projects,
                categories,
            }
        }

        RuntimeCommand::Shutdown => return None,
    };
    Some(event)
}
