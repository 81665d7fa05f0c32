use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy_primitives::Address;

use crate::core::{parse_command, Action, Command, NotifyLevel};
use crate::domain::{
    project_where, ChainDescriptor, ChainRegistry, ContractRecord, DisplayRow, DraftField,
    LabelSession, LabelingStats, Phase, SortKey, SortState, SubmitOutcome,
};
use crate::error::Error;
use crate::infrastructure::{
    AddressStatus, ExplorerContract, RuntimeCommand, RuntimeEvent, SourceBundle,
};
use crate::modules::export::{self, ExportFormat, ExportRequest};

const STATUS_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Table,
    Form,
    Inspector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
    Edit(DraftField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

impl From<NotifyLevel> for StatusLevel {
    fn from(level: NotifyLevel) -> Self {
        match level {
            NotifyLevel::Info => StatusLevel::Info,
            NotifyLevel::Warn => StatusLevel::Warn,
            NotifyLevel::Error => StatusLevel::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Listing,
    Enriching,
}

#[derive(Debug, Default, Clone)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

/// Known project and category names from the store.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub projects: Vec<String>,
    pub categories: Vec<String>,
}

impl Catalog {
    /// Best case-insensitive substring match: prefix matches first, then the
    /// shortest name.
    pub fn suggest(&self, field: DraftField, input: &str) -> Option<&str> {
        let names = match field {
            DraftField::OwnerProject => &self.projects,
            DraftField::UsageCategory => &self.categories,
            DraftField::ContractName => return None,
        };
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        names
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .min_by_key(|name| (!name.to_lowercase().starts_with(&needle), name.len()))
            .map(String::as_str)
            .filter(|name| !name.eq_ignore_ascii_case(input.trim()))
    }
}

/// Analysis results for one address. Reset whenever the address changes.
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    pub address: String,
    pub verification: Option<Vec<AddressStatus>>,
    pub sources: Option<SourceBundle>,
    pub contract: Option<ExplorerContract>,
    pub scroll: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    Explorer,
    Api,
    Dedaub,
    Github,
    Google,
}

impl LinkTarget {
    pub const ALL: [LinkTarget; 5] = [
        LinkTarget::Explorer,
        LinkTarget::Api,
        LinkTarget::Dedaub,
        LinkTarget::Github,
        LinkTarget::Google,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "explorer" | "scan" => Some(LinkTarget::Explorer),
            "api" | "blockscout" => Some(LinkTarget::Api),
            "dedaub" => Some(LinkTarget::Dedaub),
            "github" | "gh" => Some(LinkTarget::Github),
            "google" => Some(LinkTarget::Google),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LinkTarget::Explorer => "explorer",
            LinkTarget::Api => "api",
            LinkTarget::Dedaub => "dedaub",
            LinkTarget::Github => "github",
            LinkTarget::Google => "google",
        }
    }

    pub fn url(&self, chain: &ChainDescriptor, address: &str) -> Option<String> {
        match self {
            LinkTarget::Explorer => chain.browse_url(address),
            LinkTarget::Api => Some(chain.explorer_url(address)),
            LinkTarget::Dedaub => Some(chain.analysis_url(address)),
            LinkTarget::Github => Some(format!(
                "https://github.com/search?q={address}&type=code"
            )),
            LinkTarget::Google => Some(format!("https://www.google.com/search?q={address}")),
        }
    }
}

pub struct App {
    pub registry: Arc<ChainRegistry>,
    pub chain_id: String,
    pub records: Vec<ContractRecord>,
    pub rows: Vec<DisplayRow>,
    pub sort: SortState,
    pub selected_row: usize,
    pub unlabeled_only: bool,

    pub session: LabelSession,
    pub stats: LabelingStats,
    pub catalog: Catalog,
    pub inspector: Inspector,

    pub focus: Focus,
    pub form_field: DraftField,
    pub input_mode: InputMode,
    pub command: CommandBar,
    pub help_open: bool,
    pub load_state: LoadState,
    pub auto_enrich: bool,
    pub exports_dir: Option<PathBuf>,
    pub should_quit: bool,

    status: Option<StatusMessage>,
    generation: u64,
    pending: Vec<RuntimeCommand>,
    clipboard: Option<String>,
    stats_dirty: bool,
}

impl App {
    /// Build the app on `chain_id` (or the first known chain if that one is
    /// unknown) and queue the initial listing and catalog load.
    pub fn new(registry: Arc<ChainRegistry>, chain_id: &str, stats: LabelingStats) -> Self {
        let (chain_id, fallback) = match registry.find(chain_id) {
            Some(chain) => (chain.chain_id.clone(), false),
            None => (
                registry
                    .iter()
                    .next()
                    .map(|chain| chain.chain_id.clone())
                    .unwrap_or_default(),
                true,
            ),
        };

        let mut app = Self {
            registry,
            session: LabelSession::new(chain_id.clone()),
            chain_id,
            records: Vec::new(),
            rows: Vec::new(),
            sort: SortState::default(),
            selected_row: 0,
            unlabeled_only: false,
            stats,
            catalog: Catalog::default(),
            inspector: Inspector::default(),
            focus: Focus::Table,
            form_field: DraftField::OwnerProject,
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            help_open: false,
            load_state: LoadState::Idle,
            auto_enrich: true,
            exports_dir: None,
            should_quit: false,
            status: None,
            generation: 0,
            pending: Vec::new(),
            clipboard: None,
            stats_dirty: false,
        };

        if fallback {
            app.set_status(
                format!("Unknown chain, using {}", app.chain_label()),
                StatusLevel::Warn,
            );
        }
        app.reload();
        app.pending.push(RuntimeCommand::LoadCatalog);
        app
    }

    pub fn current_chain(&self) -> Option<&ChainDescriptor> {
        self.registry.lookup(&self.chain_id).ok()
    }

    pub fn chain_label(&self) -> String {
        self.current_chain()
            .map(|chain| format!("{} ({})", chain.display_name, chain.chain_id))
            .unwrap_or_else(|| self.chain_id.clone())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // === Status ===

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    fn report(&mut self, err: &Error) {
        let level = match err {
            Error::NotFound { .. } | Error::ValidationFailed(_) => StatusLevel::Warn,
            _ => StatusLevel::Error,
        };
        self.set_status(format!("{}: {}", err.kind(), err), level);
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
    }

    // === Outbound requests ===

    /// Commands queued for the runtime since the last call.
    pub fn drain_requests(&mut self) -> Vec<RuntimeCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn take_clipboard(&mut self) -> Option<String> {
        self.clipboard.take()
    }

    /// True once after the all-time tally changed.
    pub fn take_stats_dirty(&mut self) -> bool {
        std::mem::take(&mut self.stats_dirty)
    }

    // === Records ===

    /// Re-list the current chain. Anything still in flight for the previous
    /// generation is dropped on arrival.
    pub fn reload(&mut self) {
        self.generation += 1;
        self.load_state = LoadState::Listing;
        self.pending.push(RuntimeCommand::LoadRecords {
            generation: self.generation,
            chain_id: self.chain_id.clone(),
        });
    }

    pub fn request_enrichment(&mut self) {
        if self.records.is_empty() {
            self.set_status("Nothing to enrich", StatusLevel::Warn);
            return;
        }
        // The records on hand belong to the previous listing until it lands.
        if self.load_state == LoadState::Listing {
            self.set_status("Listing in progress, enrich after it lands", StatusLevel::Warn);
            return;
        }
        self.load_state = LoadState::Enriching;
        self.pending.push(RuntimeCommand::EnrichRecords {
            generation: self.generation,
            chain_id: self.chain_id.clone(),
            records: self.records.clone(),
        });
    }

    pub fn change_chain(&mut self, needle: &str) {
        let Some(chain) = self.registry.find(needle) else {
            self.report(&Error::UnknownChain(needle.trim().to_string()));
            return;
        };
        let chain_id = chain.chain_id.clone();
        if chain_id == self.chain_id {
            return;
        }

        tracing::info!(from = %self.chain_id, to = %chain_id, "chain changed");
        self.chain_id = chain_id.clone();
        self.session.change_chain(chain_id);
        self.records.clear();
        self.rows.clear();
        self.selected_row = 0;
        self.inspector = Inspector::default();
        if let InputMode::Edit(_) = self.input_mode {
            self.exit_input();
        }
        self.reload();
        self.set_status(format!("Loading {}", self.chain_label()), StatusLevel::Info);
    }

    pub fn cycle_chain(&mut self, forward: bool) {
        if let Some(next) = self.registry.cycle(&self.chain_id, forward) {
            let next = next.chain_id.clone();
            self.change_chain(&next);
        }
    }

    /// Re-project the table, keeping the cursor on the same address.
    pub fn rebuild_rows(&mut self) {
        let keep = self.selected_table_row().map(|row| row.address.full.clone());
        let unlabeled_only = self.unlabeled_only;
        self.rows = project_where(&self.records, self.sort, |record| {
            !unlabeled_only || !record.is_labeled()
        });
        self.selected_row = keep
            .and_then(|address| self.rows.iter().position(|row| row.address.full == address))
            .unwrap_or(self.selected_row)
            .min(self.rows.len().saturating_sub(1));
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort.toggle(key);
        self.rebuild_rows();
    }

    pub fn toggle_unlabeled(&mut self) {
        self.unlabeled_only = !self.unlabeled_only;
        self.rebuild_rows();
        let text = if self.unlabeled_only {
            "Showing unlabeled contracts only"
        } else {
            "Showing all contracts"
        };
        self.set_status(text, StatusLevel::Info);
    }

    pub fn selected_table_row(&self) -> Option<&DisplayRow> {
        self.rows.get(self.selected_row)
    }

    pub fn selected_record(&self) -> Option<&ContractRecord> {
        self.selected_table_row()
            .and_then(|row| self.records.get(row.source_index))
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.selected_row = 0;
            return;
        }
        let last = self.rows.len() - 1;
        self.selected_row = self.selected_row.saturating_add_signed(delta).min(last);
    }

    pub fn go_to_top(&mut self) {
        self.selected_row = 0;
    }

    pub fn go_to_bottom(&mut self) {
        self.selected_row = self.rows.len().saturating_sub(1);
    }

    // === Selection & labeling ===

    pub fn select_current_row(&mut self) {
        match self.selected_table_row() {
            Some(row) => {
                let address = row.address.full.clone();
                self.select_address(&address);
            }
            None => self.set_status("No contract under cursor", StatusLevel::Warn),
        }
    }

    pub fn select_address(&mut self, address: &str) {
        let address = address.trim();
        if Address::from_str(address).is_err() {
            self.report(&Error::ValidationFailed(format!(
                "'{address}' is not a contract address"
            )));
            return;
        }

        let request = self.session.select(address);
        if self.inspector.address != request.address {
            self.inspector = Inspector {
                address: request.address.clone(),
                ..Inspector::default()
            };
        }
        if let Some(index) = self
            .rows
            .iter()
            .position(|row| row.address.full == request.address)
        {
            self.selected_row = index;
        }
        self.set_status(
            format!("Resolving {}", crate::domain::short_addr(&request.address)),
            StatusLevel::Info,
        );
        self.pending.push(RuntimeCommand::ResolveRecord {
            ticket: request.ticket,
            chain_id: request.chain_id,
            address: request.address,
        });
    }

    pub fn set_field(&mut self, field: DraftField, value: &str) {
        self.session.set_field(field, value.trim());
    }

    /// Use the full name of the row under the cursor as the contract name.
    pub fn adopt_row_name(&mut self) {
        let Some(row) = self.selected_table_row() else {
            return;
        };
        if !row.has_name {
            self.set_status("Row has no name to adopt", StatusLevel::Warn);
            return;
        }
        let name = row.name.full.clone();
        self.session.set_field(DraftField::ContractName, name.as_str());
        self.set_status(format!("Contract name set to {name}"), StatusLevel::Info);
    }

    pub fn submit(&mut self) {
        let address = self.session.state().selected_address.clone();
        match self.session.begin_submit() {
            Ok(request) => {
                self.set_status(
                    format!("Submitting label for {}", request.record_id),
                    StatusLevel::Info,
                );
                self.pending.push(RuntimeCommand::SubmitLabel {
                    ticket: request.ticket,
                    chain_id: self.chain_id.clone(),
                    address,
                    record_id: request.record_id,
                    draft: request.draft,
                });
            }
            Err(err) => {
                tracing::warn!(chain_id = %self.chain_id, address = %address, operation = "submit", error = %err, "submit rejected");
                self.report(&err);
            }
        }
    }

    // === Analysis ===

    /// Address the analysis actions work on: the selection, else the cursor row.
    pub fn analysis_target(&self) -> Option<String> {
        let selected = &self.session.state().selected_address;
        if !selected.is_empty() {
            return Some(selected.clone());
        }
        self.selected_table_row().map(|row| row.address.full.clone())
    }

    fn prepare_inspector(&mut self) -> Option<String> {
        let Some(address) = self.analysis_target() else {
            self.set_status("Select a contract first", StatusLevel::Warn);
            return None;
        };
        if self.inspector.address != address {
            self.inspector = Inspector {
                address: address.clone(),
                ..Inspector::default()
            };
        }
        Some(address)
    }

    pub fn request_verification(&mut self) {
        if let Some(address) = self.prepare_inspector() {
            self.pending.push(RuntimeCommand::CheckVerification {
                chain_id: self.chain_id.clone(),
                address,
            });
            self.set_status("Checking Sourcify…", StatusLevel::Info);
        }
    }

    pub fn request_sources(&mut self) {
        if let Some(address) = self.prepare_inspector() {
            self.pending.push(RuntimeCommand::FetchSources {
                chain_id: self.chain_id.clone(),
                address,
            });
            self.set_status("Fetching source files…", StatusLevel::Info);
        }
    }

    pub fn request_contract(&mut self) {
        if let Some(address) = self.prepare_inspector() {
            self.pending.push(RuntimeCommand::FetchContract {
                chain_id: self.chain_id.clone(),
                address,
            });
            self.set_status("Querying explorer…", StatusLevel::Info);
        }
    }

    pub fn link(&self, target: LinkTarget) -> Option<String> {
        let address = self.analysis_target()?;
        target.url(self.current_chain()?, &address)
    }

    // === Input modes ===

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn begin_edit(&mut self, field: DraftField) {
        self.form_field = field;
        self.focus = Focus::Form;
        self.input_mode = InputMode::Edit(field);
        self.command.input = self.session.draft().get(field).to_string();
    }

    pub fn exit_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self.input_mode {
            InputMode::Edit(field) => self.catalog.suggest(field, &self.command.input),
            _ => None,
        }
    }

    pub fn accept_suggestion(&mut self) {
        if let Some(suggestion) = self.suggestion().map(str::to_string) {
            self.command.input = suggestion;
        }
    }

    pub fn apply_edit(&mut self) {
        if let InputMode::Edit(field) = self.input_mode {
            let value = self.command.input.clone();
            self.set_field(field, &value);
        }
        self.exit_input();
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        self.exit_input();
        if input.is_empty() {
            return;
        }
        let cmd = parse_command(&input);
        self.command.last = Some(input);
        let action = self.execute_command(&cmd);
        self.apply_action(action);
    }

    /// Execute a parsed command
    pub fn execute_command(&mut self, cmd: &Command) -> Action {
        match cmd {
            Command::Chain(chain) => {
                self.change_chain(chain);
                Action::None
            }
            Command::Select(address) => {
                self.select_address(address);
                Action::None
            }
            Command::Sort(key) => match SortKey::parse(key) {
                Some(key) => {
                    self.toggle_sort(key);
                    Action::Notify(
                        format!("Sorted by {} {}", key.title(), self.sort.indicator(key)),
                        NotifyLevel::Info,
                    )
                }
                None => Action::Notify(
                    format!("Unknown sort key '{key}' (gas, tx, daa)"),
                    NotifyLevel::Warn,
                ),
            },
            Command::Refresh => {
                self.reload();
                Action::Notify(format!("Reloading {}", self.chain_label()), NotifyLevel::Info)
            }
            Command::Enrich => {
                self.request_enrichment();
                Action::None
            }
            Command::Unlabeled => {
                self.toggle_unlabeled();
                Action::None
            }
            Command::Owner(value) => {
                self.set_field(DraftField::OwnerProject, value);
                Action::None
            }
            Command::Category(value) => {
                self.set_field(DraftField::UsageCategory, value);
                Action::None
            }
            Command::Name(value) => {
                self.set_field(DraftField::ContractName, value);
                Action::None
            }
            Command::Submit => {
                self.submit();
                Action::None
            }
            Command::Verify => {
                self.request_verification();
                Action::None
            }
            Command::Sources => {
                self.request_sources();
                Action::None
            }
            Command::Lookup => {
                self.request_contract();
                Action::None
            }
            Command::Open(target) => {
                let target = match target.as_deref() {
                    None => LinkTarget::Explorer,
                    Some(name) => match LinkTarget::parse(name) {
                        Some(target) => target,
                        None => {
                            return Action::Notify(
                                format!(
                                    "Unknown link '{name}' ({})",
                                    LinkTarget::ALL.map(|t| t.title()).join(", ")
                                ),
                                NotifyLevel::Warn,
                            )
                        }
                    },
                };
                match self.link(target) {
                    Some(url) => Action::Copy(url),
                    None => Action::Notify(
                        format!("No {} link for this contract", target.title()),
                        NotifyLevel::Warn,
                    ),
                }
            }
            Command::Copy => match self.analysis_target() {
                Some(address) => Action::Copy(address),
                None => Action::Notify("Nothing to copy".to_string(), NotifyLevel::Warn),
            },
            Command::Export(format) => self.export(format.as_deref()),
            Command::Help => {
                self.help_open = !self.help_open;
                Action::None
            }
            Command::Quit => Action::Quit,
            Command::Unknown(s) => {
                Action::Notify(format!("Unknown command: {}", s), NotifyLevel::Warn)
            }
        }
    }

    fn export(&self, format: Option<&str>) -> Action {
        let Some(format) = ExportFormat::parse(format) else {
            return Action::Notify("Export format must be csv or json".to_string(), NotifyLevel::Warn);
        };
        let Some(dir) = self.exports_dir.as_deref() else {
            return Action::Notify("No export directory available".to_string(), NotifyLevel::Error);
        };
        let origin_key = self
            .current_chain()
            .map(|chain| chain.origin_key.as_str())
            .unwrap_or("unknown");
        export::export(
            format,
            &ExportRequest {
                origin_key,
                rows: &self.rows,
                records: &self.records,
            },
            dir,
        )
    }

    /// Apply an action returned by a command or module
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Copy(text) => {
                self.clipboard = Some(text);
            }
            Action::Notify(msg, level) => self.set_status(msg, level.into()),
            Action::Quit => self.should_quit = true,
        }
    }

    // === Runtime events ===

    pub fn apply_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::RecordsLoaded {
                generation,
                chain_id,
                result,
            } => {
                if generation != self.generation || chain_id != self.chain_id {
                    tracing::debug!(generation, chain_id = %chain_id, "stale listing dropped");
                    return;
                }
                match result {
                    Ok(records) => {
                        let count = records.len();
                        self.records = records;
                        self.rebuild_rows();
                        if self.auto_enrich && count > 0 {
                            self.request_enrichment();
                        } else {
                            self.load_state = LoadState::Idle;
                        }
                        self.set_status(
                            format!("{count} contracts on {}", self.chain_label()),
                            StatusLevel::Info,
                        );
                    }
                    Err(err) => {
                        self.load_state = LoadState::Idle;
                        self.report(&err);
                    }
                }
            }

            RuntimeEvent::RecordsEnriched {
                generation,
                chain_id,
                result,
            } => {
                if generation != self.generation || chain_id != self.chain_id {
                    tracing::debug!(generation, chain_id = %chain_id, "stale enrichment dropped");
                    return;
                }
                self.load_state = LoadState::Idle;
                match result {
                    Ok(records) => {
                        let verified = records.iter().filter(|r| r.enrichment.verified).count();
                        self.records = records;
                        self.rebuild_rows();
                        self.set_status(
                            format!("Enriched: {verified}/{} verified", self.records.len()),
                            StatusLevel::Info,
                        );
                    }
                    Err(err) => {
                        tracing::error!(chain_id = %chain_id, operation = "enrich", error = %err, "enrichment rejected");
                        self.report(&err);
                    }
                }
            }

            RuntimeEvent::RecordResolved { ticket, result } => {
                if !self.session.apply_resolution(ticket, result) {
                    tracing::debug!(ticket = ticket.value(), "stale resolution dropped");
                    return;
                }
                let resolved = self.session.state().resolved_record_id.clone();
                let failure = self.session.last_error().cloned();
                match (resolved, failure) {
                    (Some(id), _) => {
                        self.focus = Focus::Form;
                        self.set_status(
                            format!("Resolved {id}; edit the label and submit"),
                            StatusLevel::Info,
                        );
                    }
                    (None, Some(err)) => self.report(&err),
                    (None, None) => {}
                }
            }

            RuntimeEvent::LabelSubmitted {
                ticket,
                record_id,
                result,
            } => match self.session.finish_submit(ticket, result, &mut self.stats) {
                SubmitOutcome::Saved { refresh } => {
                    self.stats_dirty = true;
                    if refresh {
                        self.reload();
                    }
                    self.focus = Focus::Table;
                    self.set_status(format!("Label saved for {record_id}"), StatusLevel::Info);
                }
                SubmitOutcome::Failed(err) => self.report(&err),
                SubmitOutcome::Ignored => {}
            },

            RuntimeEvent::VerificationChecked {
                chain_id,
                address,
                result,
            } => {
                if !self.inspects(&chain_id, &address) {
                    return;
                }
                match result {
                    Ok(statuses) => {
                        let summary = statuses
                            .iter()
                            .find_map(|s| s.match_on(&chain_id))
                            .unwrap_or("not verified")
                            .to_string();
                        self.inspector.verification = Some(statuses);
                        self.set_status(format!("Sourcify: {summary}"), StatusLevel::Info);
                    }
                    Err(err) => self.report(&err),
                }
            }

            RuntimeEvent::SourcesFetched {
                chain_id,
                address,
                result,
            } => {
                if !self.inspects(&chain_id, &address) {
                    return;
                }
                match result {
                    Ok(bundle) => {
                        self.set_status(
                            format!("{} source files ({})", bundle.files.len(), bundle.status),
                            StatusLevel::Info,
                        );
                        self.inspector.sources = Some(bundle);
                        self.inspector.scroll = 0;
                        self.focus = Focus::Inspector;
                    }
                    Err(err) => self.report(&err),
                }
            }

            RuntimeEvent::ContractFetched {
                chain_id,
                address,
                result,
            } => {
                if !self.inspects(&chain_id, &address) {
                    return;
                }
                match result {
                    Ok(contract) => {
                        self.inspector.contract = Some(contract);
                        self.focus = Focus::Inspector;
                    }
                    Err(err) => self.report(&err),
                }
            }

            RuntimeEvent::CatalogLoaded {
                projects,
                categories,
            } => {
                match projects {
                    Ok(projects) => self.catalog.projects = projects,
                    Err(err) => tracing::warn!(operation = "list_projects", error = %err, "catalog unavailable"),
                }
                match categories {
                    Ok(categories) => self.catalog.categories = categories,
                    Err(err) => tracing::warn!(operation = "list_categories", error = %err, "catalog unavailable"),
                }
            }

            RuntimeEvent::Error { message } => {
                tracing::error!(%message, "runtime error");
                self.set_status(message, StatusLevel::Error);
            }
        }
    }

    fn inspects(&self, chain_id: &str, address: &str) -> bool {
        chain_id == self.chain_id && address == self.inspector.address
    }

    pub fn is_busy(&self) -> bool {
        self.load_state != LoadState::Idle
            || matches!(self.session.phase(), Phase::Resolving | Phase::Submitting)
    }
}
