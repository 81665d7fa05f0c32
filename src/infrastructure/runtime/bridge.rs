//! Runtime bridge - connects the sync TUI thread with the async Tokio runtime
//!
//! The UI thread never blocks on the network. It sends [`RuntimeCommand`]s and
//! drains [`RuntimeEvent`]s between frames; every event carries the ticket or
//! generation of the request that produced it so the app can drop stale ones.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tokio::runtime::Runtime;

use crate::domain::{ChainRegistry, ContractRecord, LabelDraft, RecordId, Ticket};
use crate::error::Result;
use crate::infrastructure::explorer::{ContractLookup, ExplorerContract};
use crate::infrastructure::records::RecordStore;
use crate::infrastructure::runtime::worker::run_async_worker;
use crate::infrastructure::sourcify::{AddressStatus, SourceBundle, SourcifyClient};

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCommand {
    /// List records for a chain
    LoadRecords { generation: u64, chain_id: String },
    /// Explorer lookups for a listing
    EnrichRecords {
        generation: u64,
        chain_id: String,
        records: Vec<ContractRecord>,
    },
    /// Find the record id behind an address
    ResolveRecord {
        ticket: Ticket,
        chain_id: String,
        address: String,
    },
    /// Write a label
    SubmitLabel {
        ticket: Ticket,
        chain_id: String,
        address: String,
        record_id: RecordId,
        draft: LabelDraft,
    },
    CheckVerification { chain_id: String, address: String },
    FetchSources { chain_id: String, address: String },
    FetchContract { chain_id: String, address: String },
    /// Project and category names for suggestions
    LoadCatalog,
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    RecordsLoaded {
        generation: u64,
        chain_id: String,
        result: Result<Vec<ContractRecord>>,
    },
    RecordsEnriched {
        generation: u64,
        chain_id: String,
        result: Result<Vec<ContractRecord>>,
    },
    RecordResolved {
        ticket: Ticket,
        result: Result<Option<ContractRecord>>,
    },
    LabelSubmitted {
        ticket: Ticket,
        record_id: RecordId,
        result: Result<()>,
    },
    VerificationChecked {
        chain_id: String,
        address: String,
        result: Result<Vec<AddressStatus>>,
    },
    SourcesFetched {
        chain_id: String,
        address: String,
        result: Result<SourceBundle>,
    },
    ContractFetched {
        chain_id: String,
        address: String,
        result: Result<ExplorerContract>,
    },
    CatalogLoaded {
        projects: Result<Vec<String>>,
        categories: Result<Vec<String>>,
    },
    /// Worker-level failure (not tied to a request)
    Error { message: String },
}

/// Clients the worker talks to. Cheap to clone into spawned tasks.
#[derive(Clone)]
pub struct Services {
    pub registry: Arc<ChainRegistry>,
    pub store: Arc<dyn RecordStore>,
    pub explorer: Arc<dyn ContractLookup>,
    pub sourcify: Arc<SourcifyClient>,
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    pub fn new(services: Services) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        thread::Builder::new()
            .name("labeldesk-runtime".to_string())
            .spawn(move || {
                let rt = match Runtime::new() {
                    Ok(rt) => rt,
                    Err(err) => {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Failed to start runtime: {err}"),
                        });
                        return;
                    }
                };
                rt.block_on(async {
                    if let Err(err) = run_async_worker(services, cmd_rx, evt_tx.clone()).await {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Block until the next event arrives or the worker is gone
    pub fn recv(&self) -> Option<RuntimeEvent> {
        self.evt_rx.recv().ok()
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
