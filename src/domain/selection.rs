//! Selection and label-submission state machine.
//!
//! Every async request leaves with a ticket; a result is applied only when its
//! ticket is still the latest one of that kind. Changing address or chain bumps
//! the ticket, which drops whatever was in flight.

use crate::error::{Error, Result};

use super::record::{ContractRecord, DraftField, LabelDraft, RecordId};
use super::stats::LabelingStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Resolving,
    Resolved,
    Submitting,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Resolving => "resolving",
            Phase::Resolved => "resolved",
            Phase::Submitting => "submitting",
        }
    }
}

/// Outcome of the most recent submit, shown next to the form.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmitStatus {
    #[default]
    None,
    Pending,
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionState {
    pub chain_id: String,
    pub selected_address: String,
    /// Empty until a record with `selected_address` is found on `chain_id`
    pub resolved_record_id: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub ticket: Ticket,
    pub chain_id: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub ticket: Ticket,
    pub record_id: RecordId,
    pub draft: LabelDraft,
}

/// What the caller should do after a submit result has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Ticket was never issued or already settled
    Ignored,
    /// Label written. `refresh` is false when the write landed on a chain
    /// the session has since left.
    Saved { refresh: bool },
    Failed(Error),
}

#[derive(Debug, Default)]
pub struct LabelSession {
    state: SelectionState,
    phase: Phase,
    draft: LabelDraft,
    submit_status: SubmitStatus,
    /// Gas/tx of the resolved record, credited to stats on a successful submit
    resolved_usage: Option<(f64, u64)>,
    last_error: Option<Error>,
    next_ticket: u64,
    resolve_ticket: Ticket,
    submit_ticket: Option<Ticket>,
    /// Submits still awaiting a result, with their chain and the usage they
    /// will credit. Survives reselection: a write that lands still counts.
    in_flight: Vec<(Ticket, String, f64, u64)>,
}

impl LabelSession {
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            state: SelectionState {
                chain_id: chain_id.into(),
                ..SelectionState::default()
            },
            ..Self::default()
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn draft(&self) -> &LabelDraft {
        &self.draft
    }

    pub fn submit_status(&self) -> &SubmitStatus {
        &self.submit_status
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn chain_id(&self) -> &str {
        &self.state.chain_id
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    /// Start resolving `address` on the current chain.
    pub fn select(&mut self, address: impl Into<String>) -> ResolveRequest {
        let address = address.into().trim().to_string();
        let ticket = self.issue_ticket();

        self.state.selected_address = address.clone();
        self.state.resolved_record_id = None;
        self.resolved_usage = None;
        self.draft = LabelDraft::default();
        self.submit_status = SubmitStatus::None;
        self.last_error = None;
        self.phase = Phase::Resolving;
        self.resolve_ticket = ticket;
        self.submit_ticket = None;

        ResolveRequest {
            ticket,
            chain_id: self.state.chain_id.clone(),
            address,
        }
    }

    /// Apply a resolution result. Returns false if `ticket` is stale.
    pub fn apply_resolution(
        &mut self,
        ticket: Ticket,
        result: Result<Option<ContractRecord>>,
    ) -> bool {
        if ticket != self.resolve_ticket || self.phase != Phase::Resolving {
            return false;
        }

        self.phase = Phase::Resolved;
        match result {
            Ok(Some(record)) if record.address == self.state.selected_address => {
                if let Some(name) = record.display_name() {
                    self.draft.contract_name = name.to_string();
                }
                self.resolved_usage = Some((record.gas_spent_eth, record.tx_count));
                self.state.resolved_record_id = Some(record.record_id);
                self.last_error = None;
            }
            Ok(_) => {
                self.last_error = Some(Error::NotFound {
                    chain_id: self.state.chain_id.clone(),
                    address: self.state.selected_address.clone(),
                });
            }
            Err(err) => {
                self.last_error = Some(err);
            }
        }
        true
    }

    /// Switch chain. Everything selection-related is dropped and pending
    /// results become stale; the caller reloads the record list.
    pub fn change_chain(&mut self, chain_id: impl Into<String>) {
        self.state = SelectionState {
            chain_id: chain_id.into(),
            ..SelectionState::default()
        };
        self.phase = Phase::Idle;
        self.draft = LabelDraft::default();
        self.submit_status = SubmitStatus::None;
        self.resolved_usage = None;
        self.last_error = None;
        self.resolve_ticket = self.issue_ticket();
        self.submit_ticket = None;
    }

    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    /// Validate locally and hand back the request to send.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest> {
        if self.phase == Phase::Submitting {
            return Err(Error::ValidationFailed(
                "a submission is already in flight".to_string(),
            ));
        }
        let Some(record_id) = self.state.resolved_record_id.clone() else {
            let err = Error::ValidationFailed(if self.state.selected_address.is_empty() {
                "no contract selected".to_string()
            } else {
                format!(
                    "no record resolved for {}",
                    self.state.selected_address
                )
            });
            self.submit_status = SubmitStatus::Failed(err.to_string());
            return Err(err);
        };

        let ticket = self.issue_ticket();
        let (gas, txs) = self.resolved_usage.unwrap_or_default();
        self.in_flight
            .push((ticket, self.state.chain_id.clone(), gas, txs));
        self.submit_ticket = Some(ticket);
        self.phase = Phase::Submitting;
        self.submit_status = SubmitStatus::Pending;

        Ok(SubmitRequest {
            ticket,
            record_id,
            draft: self.draft.clone(),
        })
    }

    pub fn finish_submit(
        &mut self,
        ticket: Ticket,
        result: Result<()>,
        stats: &mut LabelingStats,
    ) -> SubmitOutcome {
        let Some(pos) = self.in_flight.iter().position(|(t, _, _, _)| *t == ticket) else {
            return SubmitOutcome::Ignored;
        };
        let (_, chain_id, gas, txs) = self.in_flight.remove(pos);
        let current = self.submit_ticket == Some(ticket);

        match result {
            Ok(()) => {
                stats.record_label(gas, txs);
                if current {
                    self.submit_ticket = None;
                    self.draft = LabelDraft::default();
                    self.state.selected_address.clear();
                    self.state.resolved_record_id = None;
                    self.resolved_usage = None;
                    self.phase = Phase::Idle;
                    self.submit_status = SubmitStatus::Succeeded;
                }
                SubmitOutcome::Saved {
                    refresh: chain_id == self.state.chain_id,
                }
            }
            Err(err) => {
                if current {
                    self.submit_ticket = None;
                    self.phase = Phase::Resolved;
                    self.submit_status = SubmitStatus::Failed(err.to_string());
                    self.last_error = Some(err.clone());
                }
                SubmitOutcome::Failed(err)
            }
        }
    }
}
