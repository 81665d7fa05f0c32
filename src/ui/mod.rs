use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap,
};
use ratatui::Frame;

pub mod layout;

use crate::app::{App, Focus, InputMode, LinkTarget, LoadState, StatusLevel};
use crate::domain::{short_addr, DraftField, SortKey, SubmitStatus, Tally};
use crate::infrastructure::explorer::format_verified_at;

const SOURCE_PREVIEW_LINES: usize = 400;

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_table(f, areas.table, app);
    draw_form(f, areas.form, app);
    draw_inspector(f, areas.inspector, app);
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size, app);
    }
}

fn label_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::LightCyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn border_for(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn tally_spans(name: &'static str, tally: &Tally) -> Vec<Span<'static>> {
    vec![
        Span::styled(name, label_style()),
        Span::raw(format!(
            " {} labels  {:.3} ETH  {} txs  ",
            tally.count, tally.gas_spent_eth, tally.tx_count
        )),
    ]
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let loading = match app.load_state {
        LoadState::Listing => "  loading…",
        LoadState::Enriching => "  enriching…",
        LoadState::Idle if app.is_busy() => "  working…",
        LoadState::Idle => "",
    };
    let title = Line::from(vec![
        Span::styled(
            "Labeldesk",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Chain", label_style()),
        Span::raw(format!(" {}  ", app.chain_label())),
        Span::styled("Contracts", label_style()),
        Span::raw(format!(" {}/{}", app.rows.len(), app.records.len())),
        Span::styled(loading, Style::default().fg(Color::LightYellow)),
    ]);
    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let mut spans = tally_spans("Session", &app.stats.session);
    spans.extend(tally_spans("All time", &app.stats.all_time));
    let right = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_table(f: &mut Frame, area: Rect, app: &App) {
    let column = |title: &str, key: SortKey| {
        format!("{title} {}", app.sort.indicator(key))
            .trim_end()
            .to_string()
    };
    let header = Row::new(vec![
        Cell::from("Address"),
        Cell::from("Name"),
        Cell::from(column("Gas ETH", SortKey::GasSpentEth)),
        Cell::from(column("Txs", SortKey::TxCount)),
        Cell::from(column("DAA", SortKey::AvgDailyActiveAddresses)),
        Cell::from("Owner"),
        Cell::from("Category"),
        Cell::from("V"),
    ])
    .style(label_style().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .rows
        .iter()
        .map(|row| {
            let name_style = if row.has_name {
                Style::default().fg(Color::White)
            } else {
                label_style()
            };
            let verified = if row.verified { "✓" } else { "" };
            Row::new(vec![
                Cell::from(row.address.short.clone()),
                Cell::from(row.name.short.clone()).style(name_style),
                Cell::from(row.gas_spent_eth.clone()),
                Cell::from(row.tx_count.clone()),
                Cell::from(row.avg_daily_active_addresses.clone()),
                Cell::from(row.owner_project.clone()),
                Cell::from(row.usage_category.clone()),
                Cell::from(verified).style(Style::default().fg(Color::LightGreen)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(13),
        Constraint::Length(17),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Min(8),
        Constraint::Min(8),
        Constraint::Length(2),
    ];

    let highlight_style = if app.focus == Focus::Table {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let mut title = String::from("Contracts");
    if app.unlabeled_only {
        title.push_str(" (unlabeled)");
    }
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_for(app, Focus::Table)),
        )
        .highlight_style(highlight_style)
        .highlight_symbol(">> ");

    let mut state = TableState::default();
    if !app.rows.is_empty() {
        state.select(Some(app.selected_row));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_form(f: &mut Frame, area: Rect, app: &App) {
    let selection = app.session.state();
    let target = if selection.selected_address.is_empty() {
        "--".to_string()
    } else {
        short_addr(&selection.selected_address)
    };
    let record = selection
        .resolved_record_id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "--".to_string());

    let mut lines = vec![Line::from(vec![
        Span::styled("Contract ", label_style()),
        Span::raw(format!("{target}  ")),
        Span::styled("Record ", label_style()),
        Span::raw(format!("{record}  ")),
        Span::styled("Phase ", label_style()),
        Span::raw(app.session.phase().label()),
    ])];

    for field in DraftField::ALL {
        let editing = app.input_mode == InputMode::Edit(field);
        let marker = if app.focus == Focus::Form && app.form_field == field {
            "> "
        } else {
            "  "
        };
        let value = if editing {
            format!("{}_", app.command.input)
        } else {
            app.session.draft().get(field).to_string()
        };
        let style = if editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        let mut spans = vec![
            Span::raw(marker),
            Span::styled(format!("{:<16}", field.title()), label_style()),
            Span::styled(value, style),
        ];
        if editing {
            if let Some(suggestion) = app.suggestion() {
                spans.push(Span::styled(
                    format!("  Tab: {suggestion}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
        lines.push(Line::from(spans));
    }

    let (text, color) = match app.session.submit_status() {
        SubmitStatus::None => ("".to_string(), Color::White),
        SubmitStatus::Pending => ("submitting…".to_string(), Color::LightYellow),
        SubmitStatus::Succeeded => ("saved".to_string(), Color::LightGreen),
        SubmitStatus::Failed(reason) => (format!("failed: {reason}"), Color::LightRed),
    };
    if !text.is_empty() {
        lines.push(Line::from(Span::styled(text, Style::default().fg(color))));
    }
    if let Some(err) = app.session.last_error() {
        lines.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::LightRed),
        )));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Label")
                .border_style(border_for(app, Focus::Form)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn inspector_lines(app: &App) -> Vec<Line<'static>> {
    let inspector = &app.inspector;
    let address = if inspector.address.is_empty() {
        match app.analysis_target() {
            Some(address) => address,
            None => return vec![Line::from("No contract selected")],
        }
    } else {
        inspector.address.clone()
    };

    let mut lines = vec![Line::from(vec![
        Span::styled("Address ", label_style()),
        Span::raw(address.clone()),
    ])];

    if let Some(record) = app.records.iter().find(|r| r.address == address) {
        let e = &record.enrichment;
        lines.push(Line::from(format!(
            "Verified: {}  Proxy: {}",
            yes_no(e.verified),
            yes_no(e.is_proxy)
        )));
        if !e.verified_at.is_empty() {
            lines.push(Line::from(format!("Verified at: {}", e.verified_at)));
        }
        if !e.file_path.is_empty() {
            lines.push(Line::from(format!("File: {}", e.file_path)));
        }
    }

    if let Some(contract) = inspector.contract.as_ref() {
        lines.push(Line::from(""));
        lines.push(heading("Explorer"));
        lines.push(Line::from(format!(
            "Name: {}",
            contract.name.as_deref().unwrap_or("--")
        )));
        lines.push(Line::from(format!(
            "Verified: {} (full: {}, sourcify: {})",
            yes_no(contract.any_verification()),
            yes_no(contract.is_fully_verified.unwrap_or(false)),
            yes_no(contract.is_verified_via_sourcify.unwrap_or(false)),
        )));
        if let Some(compiler) = contract.compiler_version.as_deref() {
            lines.push(Line::from(format!("Compiler: {compiler}")));
        }
        if let Some(at) = contract.verified_at.as_deref() {
            lines.push(Line::from(format!("Verified at: {}", format_verified_at(at))));
        }
        if let Some(implementation) = contract.minimal_proxy_address_hash.as_deref() {
            lines.push(Line::from(format!("Minimal proxy of: {implementation}")));
        }
    }

    if let Some(statuses) = inspector.verification.as_ref() {
        lines.push(Line::from(""));
        lines.push(heading("Sourcify"));
        if statuses.is_empty() {
            lines.push(Line::from("  no result"));
        }
        for status in statuses {
            let verdict = status
                .match_on(&app.chain_id)
                .or(status.status.as_deref())
                .unwrap_or("not verified");
            lines.push(Line::from(format!(
                "  {}: {verdict}",
                short_addr(&status.address)
            )));
        }
    }

    if let Some(bundle) = inspector.sources.as_ref() {
        lines.push(Line::from(""));
        lines.push(heading(&format!(
            "Sources ({}, {} files)",
            bundle.status,
            bundle.files.len()
        )));
        let mut budget = SOURCE_PREVIEW_LINES;
        for file in &bundle.files {
            lines.push(Line::from(Span::styled(
                file.display_path().to_string(),
                Style::default().fg(Color::LightYellow),
            )));
            for line in file.content.lines().take(budget) {
                lines.push(Line::from(line.to_string()));
                budget -= 1;
            }
            if budget == 0 {
                lines.push(Line::from("…"));
                break;
            }
        }
    }

    let links: Vec<String> = LinkTarget::ALL
        .iter()
        .filter(|target| app.link(**target).is_some())
        .map(|target| target.title().to_string())
        .collect();
    if !links.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(":open {}", links.join("|")),
            label_style(),
        )));
    }
    lines
}

fn draw_inspector(f: &mut Frame, area: Rect, app: &App) {
    let paragraph = Paragraph::new(Text::from(inspector_lines(app)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Inspector")
                .border_style(border_for(app, Focus::Inspector)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.inspector.scroll, 0));
    f.render_widget(paragraph, area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let sort = match app.sort.key {
        Some(key) => format!("{} {}", key.title(), app.sort.indicator(key)),
        None => "--".to_string(),
    };
    let mut spans = vec![
        Span::styled("Sort ", label_style()),
        Span::raw(format!("{sort}  ")),
        Span::styled("Filter ", label_style()),
        Span::raw(if app.unlabeled_only { "unlabeled  " } else { "all  " }),
        Span::styled("Projects ", label_style()),
        Span::raw(format!("{}  ", app.catalog.projects.len())),
        Span::styled("Categories ", label_style()),
        Span::raw(app.catalog.categories.len().to_string()),
    ];
    if let Some(row) = app.selected_table_row() {
        if row.name.is_truncated() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled("Name ", label_style()));
            spans.push(Span::raw(row.name.full.clone()));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("chain", "Switch chain (id, key or name)"),
        ("select", "Select contract by address"),
        ("sort", "Sort by gas | tx | daa"),
        ("refresh", "Reload the listing"),
        ("enrich", "Query the explorer for every row"),
        ("unlabeled", "Toggle unlabeled-only filter"),
        ("owner", "Set owner project"),
        ("category", "Set usage category"),
        ("name", "Set contract name"),
        ("submit", "Write the label"),
        ("verify", "Sourcify verification status"),
        ("sources", "Fetch verified sources"),
        ("lookup", "Explorer details"),
        ("open", "Copy link: explorer|api|dedaub|github|google"),
        ("copy", "Copy address"),
        ("export", "Export table: csv | json"),
        ("help", "Toggle help"),
        ("quit", "Quit"),
    ];

    let word = input.split_whitespace().next().unwrap_or_default();
    commands
        .iter()
        .find(|(cmd, _)| cmd.starts_with(word))
        .map(|(_, desc)| *desc)
}

fn action_hints(app: &App) -> Line<'static> {
    let hints = match app.focus {
        Focus::Table => "Enter select  s/t/d sort  u unlabeled  [ ] chain  : command  ? help",
        Focus::Form => "o owner  c category  n name  a adopt row name  Enter submit  Esc back",
        Focus::Inspector => "j/k scroll  v verify  f sources  l lookup  Esc back",
    };
    Line::from(Span::styled(hints, label_style()))
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint = command_hint(&app.command.input);
            let hint_text = hint.unwrap_or("type a command, Enter to run");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.as_str()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Edit(field) => Line::from(vec![
            Span::styled(
                format!("> {} ", field.title().to_lowercase()),
                Style::default().fg(Color::LightCyan),
            ),
            Span::raw(app.command.input.as_str()),
            Span::styled(
                "  (Tab=accept suggestion, Enter=ok, Esc=cancel)",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text, Style::default().fg(color)),
                ])
            } else {
                action_hints(app)
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect(72, 70, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Navigation"),
        Line::from("  Tab        Cycle focus"),
        Line::from("  j / k      Move selection (vim)"),
        Line::from("  g / G      Top / bottom"),
        Line::from("  PgUp/PgDn  Page up/down"),
        Line::from("  [ / ]      Previous / next chain"),
        Line::from("  Enter      Select contract (table) / submit (form)"),
        Line::from("  Esc        Back / close"),
        Line::from(""),
        Line::from("Table"),
        Line::from("  s / t / d  Sort by gas / txs / daily active addresses"),
        Line::from("  u          Unlabeled only"),
        Line::from("  r          Reload"),
        Line::from("  y          Copy address"),
        Line::from(""),
        Line::from("Label form"),
        Line::from("  o / c / n  Edit owner / category / name"),
        Line::from("  a          Adopt the row's name"),
        Line::from(""),
        Line::from("Inspector"),
        Line::from("  v          Sourcify verification"),
        Line::from("  f          Fetch source files"),
        Line::from("  l          Explorer lookup"),
        Line::from(""),
        Line::from("Commands"),
        Line::from("  :chain <id>  :select <addr>  :sort gas|tx|daa"),
        Line::from("  :owner <p>  :category <c>  :name <n>  :submit"),
        Line::from("  :open [explorer|api|dedaub|github|google]  :export [csv|json]"),
        Line::from("  :enrich  :unlabeled  :refresh  :quit"),
        Line::from(""),
        Line::from(format!("Chain: {}", app.chain_label())),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
