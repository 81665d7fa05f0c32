//! App state transitions driven by synthetic runtime events, no network.

use std::sync::Arc;

use labeldesk::app::{App, Focus, LoadState, StatusLevel};
use labeldesk::core::Command;
use labeldesk::domain::{
    ChainRegistry, ContractRecord, LabelingStats, Phase, RecordId, SubmitStatus, Ticket,
};
use labeldesk::error::Error;
use labeldesk::infrastructure::{RuntimeCommand, RuntimeEvent};

const ADDR_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const ADDR_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

fn app() -> App {
    let mut app = App::new(Arc::new(ChainRegistry::builtin()), "8453", LabelingStats::default());
    app.auto_enrich = false;
    app.drain_requests();
    app
}

fn record(id: &str, address: &str, gas: f64, txs: u64) -> ContractRecord {
    let mut r = ContractRecord::new(RecordId::new(id), address);
    r.gas_spent_eth = gas;
    r.tx_count = txs;
    r
}

fn resolve_ticket(app: &mut App) -> Ticket {
    match app.drain_requests().as_slice() {
        [RuntimeCommand::ResolveRecord { ticket, .. }] => *ticket,
        other => panic!("expected a single resolve request, got {other:?}"),
    }
}

fn submit_ticket(app: &mut App) -> Ticket {
    match app.drain_requests().as_slice() {
        [RuntimeCommand::SubmitLabel { ticket, .. }] => *ticket,
        other => panic!("expected a single submit request, got {other:?}"),
    }
}

#[test]
fn test_reselect_drops_earlier_resolution() {
    let mut app = app();
    app.select_address(ADDR_A);
    let first = resolve_ticket(&mut app);
    app.select_address(ADDR_B);
    let second = resolve_ticket(&mut app);

    app.apply_event(RuntimeEvent::RecordResolved {
        ticket: second,
        result: Ok(Some(record("recB", ADDR_B, 1.0, 1))),
    });
    app.apply_event(RuntimeEvent::RecordResolved {
        ticket: first,
        result: Ok(Some(record("recA", ADDR_A, 1.0, 1))),
    });

    assert_eq!(app.session.state().selected_address, ADDR_B);
    assert_eq!(
        app.session.state().resolved_record_id,
        Some(RecordId::new("recB"))
    );
}

#[test]
fn test_chain_change_invalidates_everything_in_flight() {
    let mut app = app();
    app.select_address(ADDR_A);
    let ticket = resolve_ticket(&mut app);

    app.execute_command(&Command::Chain("optimism".to_string()));
    assert_eq!(app.chain_id, "10");
    assert_eq!(app.generation(), 2);
    assert!(matches!(
        app.drain_requests().as_slice(),
        [RuntimeCommand::LoadRecords { generation: 2, chain_id }] if chain_id == "10"
    ));

    app.apply_event(RuntimeEvent::RecordResolved {
        ticket,
        result: Ok(Some(record("recA", ADDR_A, 1.0, 1))),
    });
    app.apply_event(RuntimeEvent::RecordsLoaded {
        generation: 1,
        chain_id: "8453".to_string(),
        result: Ok(vec![record("recA", ADDR_A, 1.0, 1)]),
    });

    assert!(app.session.state().selected_address.is_empty());
    assert_eq!(app.session.phase(), Phase::Idle);
    assert!(app.records.is_empty());
    assert_eq!(app.load_state, LoadState::Listing);
}

#[test]
fn test_unknown_chain_keeps_current_one() {
    let mut app = app();
    app.execute_command(&Command::Chain("342".to_string()));
    assert_eq!(app.chain_id, "8453");
    assert!(app.drain_requests().is_empty());
    let (text, level) = app.status_text().unwrap();
    assert!(text.starts_with("UnknownChain"));
    assert_eq!(level, StatusLevel::Error);
}

#[test]
fn test_unresolved_address_cannot_be_submitted() {
    let mut app = app();
    app.select_address(ADDR_A);
    let ticket = resolve_ticket(&mut app);
    app.apply_event(RuntimeEvent::RecordResolved {
        ticket,
        result: Ok(None),
    });
    assert_eq!(app.session.phase(), Phase::Resolved);
    assert!(matches!(app.session.last_error(), Some(Error::NotFound { .. })));

    app.execute_command(&Command::Owner("acme".to_string()));
    app.execute_command(&Command::Submit);
    assert!(app.drain_requests().is_empty());
    assert!(matches!(app.session.submit_status(), SubmitStatus::Failed(_)));
}

#[test]
fn test_failed_submit_keeps_draft_for_retry() {
    let mut app = app();
    app.select_address(ADDR_A);
    let ticket = resolve_ticket(&mut app);
    app.apply_event(RuntimeEvent::RecordResolved {
        ticket,
        result: Ok(Some(record("recA", ADDR_A, 2.0, 5))),
    });
    app.execute_command(&Command::Category("dex".to_string()));
    app.submit();
    let ticket = submit_ticket(&mut app);

    app.apply_event(RuntimeEvent::LabelSubmitted {
        ticket,
        record_id: RecordId::new("recA"),
        result: Err(Error::StoreUnavailable {
            operation: "update_record",
            detail: "HTTP 422".to_string(),
            payload: Some("{\"error\":\"INVALID_VALUE\"}".to_string()),
        }),
    });

    assert_eq!(app.session.phase(), Phase::Resolved);
    assert_eq!(app.session.draft().usage_category, "dex");
    assert_eq!(app.stats.session.count, 0);
    assert!(app.drain_requests().is_empty());
    assert_eq!(app.status_text().unwrap().1, StatusLevel::Error);

    app.submit();
    submit_ticket(&mut app);
    assert_eq!(app.session.phase(), Phase::Submitting);
}

#[test]
fn test_submit_landing_after_reselect_still_counts() {
    let mut app = app();
    app.select_address(ADDR_A);
    let ticket = resolve_ticket(&mut app);
    app.apply_event(RuntimeEvent::RecordResolved {
        ticket,
        result: Ok(Some(record("recA", ADDR_A, 2.0, 5))),
    });
    app.submit();
    let submit = submit_ticket(&mut app);

    app.select_address(ADDR_B);
    resolve_ticket(&mut app);

    app.apply_event(RuntimeEvent::LabelSubmitted {
        ticket: submit,
        record_id: RecordId::new("recA"),
        result: Ok(()),
    });

    assert_eq!(app.stats.session.count, 1);
    assert_eq!(app.stats.session.tx_count, 5);
    assert_eq!(app.session.state().selected_address, ADDR_B);
    assert_eq!(app.session.phase(), Phase::Resolving);
    assert!(matches!(
        app.drain_requests().as_slice(),
        [RuntimeCommand::LoadRecords { .. }]
    ));
}

#[test]
fn test_analysis_results_for_other_address_are_dropped() {
    let mut app = app();
    app.select_address(ADDR_A);
    app.drain_requests();
    app.execute_command(&Command::Lookup);
    assert!(matches!(
        app.drain_requests().as_slice(),
        [RuntimeCommand::FetchContract { address, .. }] if address == ADDR_A
    ));

    app.apply_event(RuntimeEvent::ContractFetched {
        chain_id: "8453".to_string(),
        address: ADDR_B.to_string(),
        result: Ok(Default::default()),
    });
    assert!(app.inspector.contract.is_none());

    app.apply_event(RuntimeEvent::ContractFetched {
        chain_id: "8453".to_string(),
        address: ADDR_A.to_string(),
        result: Ok(Default::default()),
    });
    assert!(app.inspector.contract.is_some());
    assert_eq!(app.focus, Focus::Inspector);
}

#[test]
fn test_records_enriched_keeps_cursor_on_address() {
    let mut app = app();
    app.apply_event(RuntimeEvent::RecordsLoaded {
        generation: 1,
        chain_id: "8453".to_string(),
        result: Ok(vec![record("recA", ADDR_A, 1.0, 1), record("recB", ADDR_B, 2.0, 2)]),
    });
    app.move_selection(1);
    assert_eq!(app.selected_table_row().unwrap().address.full, ADDR_B);

    let mut named = record("recA", ADDR_A, 1.0, 1);
    named.contract_name = "Router".to_string();
    app.apply_event(RuntimeEvent::RecordsEnriched {
        generation: 1,
        chain_id: "8453".to_string(),
        result: Ok(vec![named, record("recB", ADDR_B, 2.0, 2)]),
    });

    // Named rows sort first, the cursor follows ADDR_B.
    assert_eq!(app.rows[0].address.full, ADDR_A);
    assert_eq!(app.selected_table_row().unwrap().address.full, ADDR_B);
}

#[test]
fn test_enrich_is_refused_while_reload_is_listing() {
    let mut app = app();
    app.apply_event(RuntimeEvent::RecordsLoaded {
        generation: 1,
        chain_id: "8453".to_string(),
        result: Ok(vec![record("recA", ADDR_A, 1.0, 1)]),
    });
    app.execute_command(&Command::Enrich);
    let first = match app.drain_requests().as_slice() {
        [RuntimeCommand::EnrichRecords { generation: 1, records, .. }] => records.clone(),
        other => panic!("expected an enrichment of the first listing, got {other:?}"),
    };

    app.execute_command(&Command::Refresh);
    app.execute_command(&Command::Enrich);
    assert!(matches!(
        app.drain_requests().as_slice(),
        [RuntimeCommand::LoadRecords { generation: 2, .. }]
    ));
    assert_eq!(app.status_text().unwrap().1, StatusLevel::Warn);

    let mut labeled = record("recA", ADDR_A, 1.0, 1);
    labeled.owner_project = Some("Acme".to_string());
    app.apply_event(RuntimeEvent::RecordsLoaded {
        generation: 2,
        chain_id: "8453".to_string(),
        result: Ok(vec![labeled]),
    });
    // The pre-reload enrichment lands after the fresh listing.
    app.apply_event(RuntimeEvent::RecordsEnriched {
        generation: 1,
        chain_id: "8453".to_string(),
        result: Ok(first),
    });

    assert_eq!(app.records[0].owner_project.as_deref(), Some("Acme"));
    assert_eq!(app.rows[0].owner_project, "Acme");
    assert_eq!(app.load_state, LoadState::Idle);
}

#[test]
fn test_submit_request_names_chain_and_address() {
    let mut app = app();
    app.select_address(ADDR_A);
    let ticket = resolve_ticket(&mut app);
    app.apply_event(RuntimeEvent::RecordResolved {
        ticket,
        result: Ok(Some(record("recA", ADDR_A, 2.0, 5))),
    });
    app.submit();
    assert!(matches!(
        app.drain_requests().as_slice(),
        [RuntimeCommand::SubmitLabel { chain_id, address, record_id, .. }]
            if chain_id == "8453" && address == ADDR_A && record_id.as_str() == "recA"
    ));
}

#[test]
fn test_submit_landing_after_chain_change_skips_reload() {
    let mut app = app();
    app.select_address(ADDR_A);
    let ticket = resolve_ticket(&mut app);
    app.apply_event(RuntimeEvent::RecordResolved {
        ticket,
        result: Ok(Some(record("recA", ADDR_A, 2.0, 5))),
    });
    app.submit();
    let submit = submit_ticket(&mut app);

    app.execute_command(&Command::Chain("optimism".to_string()));
    app.drain_requests();

    app.apply_event(RuntimeEvent::LabelSubmitted {
        ticket: submit,
        record_id: RecordId::new("recA"),
        result: Ok(()),
    });

    assert_eq!(app.stats.session.count, 1);
    assert_eq!(app.generation(), 2);
    assert!(app.drain_requests().is_empty());
}
