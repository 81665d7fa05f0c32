//! Domain types: chains, records, selection, table projection and stats

pub mod chain;
pub mod record;
pub mod selection;
pub mod stats;
pub mod table;

pub use chain::{ChainDescriptor, ChainRegistry};
pub use record::{ContractRecord, DraftField, Enrichment, LabelDraft, RecordId, NO_NAME};
pub use selection::{
    LabelSession, Phase, ResolveRequest, SelectionState, SubmitOutcome, SubmitRequest,
    SubmitStatus, Ticket,
};
pub use stats::{LabelingStats, Tally};
pub use table::{
    project, project_where, short_addr, DisplayRow, SortDirection, SortKey, SortState,
    TruncatedText,
};
