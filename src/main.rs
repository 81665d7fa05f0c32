use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use labeldesk::app::{App, Focus, InputMode, StatusLevel};
use labeldesk::config::{self, Config};
use labeldesk::core::Command;
use labeldesk::domain::{
    project, ChainRegistry, DraftField, LabelingStats, SortKey, SortState,
};
use labeldesk::infrastructure::{
    enrich, AirtableStore, BlockscoutClient, RecordStore, RuntimeBridge, RuntimeCommand,
    Services, SourcifyClient,
};
use labeldesk::logging::{self, LogSink};
use labeldesk::store::StatsStore;
use labeldesk::ui;

#[derive(Debug, Parser)]
#[command(
    name = "labeldesk",
    version,
    about = "Labeldesk: label smart contracts from a terminal"
)]
struct Args {
    /// Chain to open (id, origin key or name)
    #[arg(long)]
    chain: Option<String>,

    /// Config file (defaults to ~/.config/labeldesk/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the enriched table for the chain and exit
    #[arg(long)]
    dump: bool,

    /// Sort key for --dump (gas, tx, daa)
    #[arg(long, requires = "dump")]
    sort: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    match (args.dump, config::log_path()) {
        (false, Some(path)) => logging::init(LogSink::File(&path))?,
        _ => logging::init(LogSink::Stderr)?,
    }

    let config = config::load(args.config.as_deref());
    let registry = Arc::new(config.registry());
    let chain = args
        .chain
        .clone()
        .unwrap_or_else(|| config.default_chain.clone());

    if args.dump {
        return dump(&config, registry, &chain, args.sort.as_deref());
    }

    let services = build_services(&config, registry.clone())?;
    let runtime = RuntimeBridge::new(services)?;

    let stats_store = if config.persist_all_time_stats {
        open_stats_store()
    } else {
        None
    };
    let stats = stats_store
        .as_ref()
        .and_then(|store| match store.load() {
            Ok(tally) => Some(LabelingStats::with_all_time(tally)),
            Err(err) => {
                tracing::warn!(error = %err, "all-time stats unavailable");
                None
            }
        })
        .unwrap_or_default();

    let mut app = App::new(registry, &chain, stats);
    app.auto_enrich = config.auto_enrich;
    app.exports_dir = config::exports_dir();

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime, stats_store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "terminal loop failed");
        eprintln!("{err:?}");
    }

    Ok(())
}

fn build_services(config: &Config, registry: Arc<ChainRegistry>) -> Result<Services> {
    let settings = config
        .airtable_settings()
        .context("record store credentials")?;
    let store = AirtableStore::new(settings, registry.clone(), config.timeout())?;
    let explorer = BlockscoutClient::new(registry.clone(), config.timeout())?;
    let sourcify = SourcifyClient::new(registry.clone(), config.timeout())?;
    Ok(Services {
        registry,
        store: Arc::new(store),
        explorer: Arc::new(explorer),
        sourcify: Arc::new(sourcify),
    })
}

fn open_stats_store() -> Option<StatsStore> {
    let path = config::stats_db_path()?;
    match StatsStore::open(&path) {
        Ok(store) => Some(store),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "stats db disabled");
            None
        }
    }
}

/// Headless listing: load, enrich, project and print, then exit.
fn dump(
    config: &Config,
    registry: Arc<ChainRegistry>,
    chain: &str,
    sort: Option<&str>,
) -> Result<()> {
    let chain_id = registry
        .find(chain)
        .map(|chain| chain.chain_id.clone())
        .ok_or_else(|| labeldesk::Error::UnknownChain(chain.to_string()))?;
    let sort = match sort {
        Some(key) => {
            let key = SortKey::parse(key)
                .with_context(|| format!("unknown sort key '{key}' (gas, tx, daa)"))?;
            let mut state = SortState::default();
            state.toggle(key);
            state
        }
        None => SortState::default(),
    };

    let services = build_services(config, registry.clone())?;
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;

    let records = rt.block_on(async {
        let records = services.store.list_records(&chain_id).await?;
        if config.auto_enrich {
            enrich(services.explorer.as_ref(), &registry, records, &chain_id).await
        } else {
            Ok(records)
        }
    })?;

    println!(
        "{:<42}  {:<24}  {:>10}  {:>8}  {:>8}  {:<16}  {:<16}  V",
        "address", "name", "gas_eth", "txcount", "avg_daa", "owner", "category"
    );
    for row in project(&records, sort) {
        println!(
            "{:<42}  {:<24}  {:>10}  {:>8}  {:>8}  {:<16}  {:<16}  {}",
            row.address.full,
            row.name.short,
            row.gas_spent_eth,
            row.tx_count,
            row.avg_daily_active_addresses,
            row.owner_project,
            row.usage_category,
            if row.verified { "y" } else { "" },
        );
    }
    tracing::info!(chain_id = %chain_id, count = records.len(), "dump finished");
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
    stats_store: Option<StatsStore>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime, stats_store.as_ref());
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if let Some(text) = app.take_clipboard() {
            copy_to_clipboard(&mut app, text);
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

/// Apply worker events, forward queued requests, persist stats.
fn pump_background(app: &mut App, runtime: &RuntimeBridge, stats_store: Option<&StatsStore>) {
    for event in runtime.poll_events() {
        app.apply_event(event);
    }

    for cmd in app.drain_requests() {
        if let Err(err) = runtime.send(cmd) {
            app.set_status(format!("Runtime unavailable: {err}"), StatusLevel::Error);
            break;
        }
    }

    if app.take_stats_dirty() {
        if let Some(store) = stats_store {
            if let Err(err) = store.save(&app.stats.all_time) {
                tracing::warn!(error = %err, "saving all-time stats failed");
                app.set_status(format!("Stats not saved: {err}"), StatusLevel::Warn);
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
        InputMode::Edit(_) => handle_edit_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => app.should_quit = true,
        (KeyCode::Char('q'), _) => app.should_quit = true,
        (KeyCode::Char('?'), _) => app.help_open = true,
        (KeyCode::Char(':') | KeyCode::Char('/'), _) => app.enter_command(),
        (KeyCode::Tab, _) => cycle_focus(app),
        (KeyCode::Esc, _) => app.focus = Focus::Table,
        (KeyCode::Char('['), _) => app.cycle_chain(false),
        (KeyCode::Char(']'), _) => app.cycle_chain(true),
        (KeyCode::Char('r'), _) => run(app, Command::Refresh),
        (KeyCode::Char('u'), _) => app.toggle_unlabeled(),
        (KeyCode::Char('y'), _) => run(app, Command::Copy),
        (KeyCode::Char('s'), _) => app.toggle_sort(SortKey::GasSpentEth),
        (KeyCode::Char('t'), _) => app.toggle_sort(SortKey::TxCount),
        (KeyCode::Char('d'), _) => app.toggle_sort(SortKey::AvgDailyActiveAddresses),
        (KeyCode::Char('o'), _) => app.begin_edit(DraftField::OwnerProject),
        (KeyCode::Char('c'), _) => app.begin_edit(DraftField::UsageCategory),
        (KeyCode::Char('n'), _) => app.begin_edit(DraftField::ContractName),
        (KeyCode::Char('a'), _) => app.adopt_row_name(),
        (KeyCode::Char('v'), _) => app.request_verification(),
        (KeyCode::Char('f'), _) => app.request_sources(),
        (KeyCode::Char('l'), _) => app.request_contract(),
        (KeyCode::Char('g') | KeyCode::Home, _) => match app.focus {
            Focus::Inspector => app.inspector.scroll = 0,
            _ => app.go_to_top(),
        },
        (KeyCode::Char('G') | KeyCode::End, _) => app.go_to_bottom(),
        (KeyCode::Char('j') | KeyCode::Down, _) => handle_nav(app, 1),
        (KeyCode::Char('k') | KeyCode::Up, _) => handle_nav(app, -1),
        (KeyCode::PageDown, _) => handle_nav(app, page_amount() as isize),
        (KeyCode::PageUp, _) => handle_nav(app, -(page_amount() as isize)),
        (KeyCode::Enter, _) => handle_enter(app),
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_input(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}

fn handle_edit_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_input(),
        KeyCode::Enter => app.apply_edit(),
        KeyCode::Tab => app.accept_suggestion(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}

fn run(app: &mut App, cmd: Command) {
    let action = app.execute_command(&cmd);
    app.apply_action(action);
}

fn cycle_focus(app: &mut App) {
    app.focus = match app.focus {
        Focus::Table => Focus::Form,
        Focus::Form => Focus::Inspector,
        Focus::Inspector => Focus::Table,
    };
}

fn handle_nav(app: &mut App, delta: isize) {
    match app.focus {
        Focus::Table => app.move_selection(delta),
        Focus::Form => {
            if delta > 0 {
                app.form_field = app.form_field.next();
            } else {
                app.form_field = app.form_field.next().next();
            }
        }
        Focus::Inspector => {
            app.inspector.scroll = app
                .inspector
                .scroll
                .saturating_add_signed(delta.clamp(i16::MIN as isize, i16::MAX as isize) as i16);
        }
    }
}

fn handle_enter(app: &mut App) {
    match app.focus {
        Focus::Table => app.select_current_row(),
        Focus::Form => app.submit(),
        Focus::Inspector => {}
    }
}

fn terminal_rect() -> Option<Rect> {
    let (width, height) = crossterm::terminal::size().ok()?;
    Some(Rect {
        x: 0,
        y: 0,
        width,
        height,
    })
}

fn page_amount() -> usize {
    let Some(size) = terminal_rect() else {
        return 10;
    };
    ui::layout::table_page(ui::layout::areas(size).table)
}

fn copy_to_clipboard(app: &mut App, text: String) {
    use arboard::Clipboard;

    match Clipboard::new() {
        Ok(mut clipboard) => {
            if clipboard.set_text(&text).is_ok() {
                app.set_status(format!("Copied: {text}"), StatusLevel::Info);
            } else {
                app.set_status("Failed to copy to clipboard", StatusLevel::Error);
            }
        }
        Err(_) => {
            app.set_status(format!("Clipboard not available: {text}"), StatusLevel::Warn);
        }
    }
}
