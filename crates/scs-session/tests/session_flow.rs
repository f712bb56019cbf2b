//! Session behaviour driven step by step with explicit instants.

use std::time::Duration;

use chrono::Utc;
use scs_compiler::{BackendError, CompilerOutput, RawDiagnostic, RawPosition};
use scs_model::{CompiledContract, CompilerBuild, SavedContract, Severity};
use scs_session::{
    ContractSession, DispatchPhase, NoDispatch, SessionConfig, SessionError, SessionEvent,
};
use tokio::time::Instant;

const MS: Duration = Duration::from_millis(1);

fn builds() -> Vec<CompilerBuild> {
    vec![
        CompilerBuild::new("0.4.11", "0.4.11+commit.68ef5810", true, ""),
        CompilerBuild::new("0.4.10", "0.4.10+commit.f0d539ae", true, ""),
    ]
}

fn ready_session(config: &SessionConfig) -> ContractSession {
    let mut session = ContractSession::new(config);
    session.load_builds(builds());
    session.select_build(0).unwrap();
    session.mark_build_ready(0, Instant::now()).unwrap();
    session
}

fn contract(name: &str) -> CompiledContract {
    CompiledContract {
        name: name.to_string(),
        abi_interface: "[]".to_string(),
        bytecode: "6060604052".to_string(),
        metadata: None,
    }
}

fn output(names: &[&str]) -> CompilerOutput {
    CompilerOutput {
        contracts: names.iter().map(|name| contract(name)).collect(),
        diagnostics: Vec::new(),
    }
}

#[test]
fn test_rapid_edits_produce_one_compile_of_final_text() {
    let mut session = ready_session(&SessionConfig::default());
    let start = Instant::now();

    session.edit_source("contract A", start);
    session.edit_source("contract A {", start + 40 * MS);
    session.edit_source("contract A {}", start + 80 * MS);

    assert!(session.poll(start + 150 * MS).is_none());
    let request = session.poll(start + 180 * MS).expect("debounced compile");
    assert_eq!(request.source_text, "contract A {}");
    assert!(session.poll(start + 400 * MS).is_none());
    assert_eq!(session.dispatcher().latest_issued(), Some(request.request_id));
}

#[test]
fn test_late_answer_for_older_request_is_discarded() {
    let mut session = ready_session(&SessionConfig::manual());
    session.edit_source("contract Old {}", Instant::now());
    let r1 = session.compile_now().unwrap();
    session.edit_source("contract New {}", Instant::now());
    let r2 = session.compile_now().unwrap();

    assert!(session.apply_output(r2.request_id, output(&["New"])));
    assert!(!session.apply_output(r1.request_id, output(&["Old"])));

    let contracts = session.contracts().unwrap();
    assert!(contracts.contains("New"));
    assert!(!contracts.contains("Old"));
    assert_eq!(session.selected_contract(), Some("New"));
    assert!(!session.is_compiling());
}

#[test]
fn test_stale_answer_publishes_nothing() {
    let mut session = ready_session(&SessionConfig::manual());
    let r1 = session.compile_now().unwrap();
    let _r2 = session.compile_now().unwrap();
    let mut events = session.events().subscribe();

    assert!(!session.apply_output(r1.request_id, output(&["A"])));
    assert!(events.try_recv().is_err());
}

#[test]
fn test_diagnostics_use_the_compiled_text() {
    let mut session = ready_session(&SessionConfig::manual());
    session.edit_source("contract A {\n  uint x\n}\n", Instant::now());
    let request = session.compile_now().unwrap();
    // edited again before the answer arrives
    session.edit_source("\n\n\n\ncontract A {}", Instant::now());

    let answer = CompilerOutput {
        contracts: Default::default(),
        diagnostics: vec![RawDiagnostic::at_offset("ParserError", "Expected ';'", 22)],
    };
    assert!(session.apply_output(request.request_id, answer));

    let diagnostic = &session.diagnostics()[0];
    assert_eq!((diagnostic.line, diagnostic.column), (3, 1));
    assert_eq!(diagnostic.severity, Severity::Error);
    // errors and no contracts leave nothing compiled
    assert!(session.contracts().is_none());
    assert_eq!(session.phase(), DispatchPhase::Succeeded);
}

#[test]
fn test_selection_survives_recompile() {
    let mut session = ready_session(&SessionConfig::manual());
    let first = session.compile_now().unwrap();
    session.apply_output(first.request_id, output(&["Alpha", "Beta"]));
    assert_eq!(session.selected_contract(), Some("Alpha"));
    session.select_contract("Beta").unwrap();

    let second = session.compile_now().unwrap();
    session.apply_output(second.request_id, output(&["Alpha", "Beta"]));
    assert_eq!(session.selected_contract(), Some("Beta"));

    let third = session.compile_now().unwrap();
    session.apply_output(third.request_id, output(&["Gamma"]));
    assert_eq!(session.selected_contract(), Some("Gamma"));
}

#[test]
fn test_select_unknown_contract() {
    let mut session = ready_session(&SessionConfig::manual());
    assert_eq!(
        session.select_contract("Nope"),
        Err(SessionError::UnknownContract("Nope".to_string()))
    );
}

#[test]
fn test_select_build_out_of_range() {
    let mut session = ready_session(&SessionConfig::manual());
    let err = session.select_build(5).unwrap_err();
    assert_eq!(err, SessionError::InvalidIndex { index: 5, len: 2 });
    assert_eq!(session.registry().selected_index(), Some(0));
}

#[test]
fn test_compile_blocked_until_build_ready() {
    let mut session = ContractSession::new(&SessionConfig::default());
    session.load_builds(builds());
    assert_eq!(session.compile_now(), Err(NoDispatch::NoBuildSelected));

    session.select_build(1).unwrap();
    assert!(session.is_loading());
    let start = Instant::now();
    session.edit_source("contract A {}", start);
    assert!(session.poll(start + 100 * MS).is_none());
    assert_eq!(session.phase(), DispatchPhase::Idle);

    // readiness of the selected build schedules the compile that was skipped
    let deadline = session.mark_build_ready(1, start + 200 * MS).unwrap();
    assert_eq!(deadline, Some(start + 300 * MS));
    let request = session.poll(start + 300 * MS).unwrap();
    assert_eq!(request.build_index, 1);
}

#[test]
fn test_switching_build_keeps_in_flight_request() {
    let mut session = ready_session(&SessionConfig::manual());
    let request = session.compile_now().unwrap();
    session.select_build(1).unwrap();
    assert_eq!(session.dispatcher().latest_issued(), Some(request.request_id));
    assert!(session.apply_output(request.request_id, output(&["A"])));
}

#[test]
fn test_worker_failure_keeps_artifacts_and_blocks() {
    let mut session = ready_session(&SessionConfig::manual());
    let first = session.compile_now().unwrap();
    session.apply_output(
        first.request_id,
        CompilerOutput {
            contracts: output(&["A"]).contracts,
            diagnostics: vec![RawDiagnostic::at_offset("Warning", "Unused", 0)],
        },
    );
    assert_eq!(session.diagnostics().len(), 1);

    let second = session.compile_now().unwrap();
    assert!(session.apply_failure(second.request_id, BackendError::Crashed("oom".to_string())));
    assert_eq!(session.phase(), DispatchPhase::Failed);
    assert!(session.diagnostics().is_empty());
    assert!(session.contracts().unwrap().contains("A"));
    assert!(session.worker_error().is_some());
    assert_eq!(session.compile_now(), Err(NoDispatch::WorkerError));

    session.reset_worker();
    assert!(session.compile_now().is_ok());
}

#[test]
fn test_new_contract_resets() {
    let mut session = ready_session(&SessionConfig::manual());
    session.edit_source("contract A {}", Instant::now());
    let request = session.compile_now().unwrap();
    session.apply_output(request.request_id, output(&["A"]));
    session.mark_saved("A", Utc::now());

    session.new_contract();

    assert_eq!(session.text(), "");
    assert!(!session.is_dirty());
    assert!(session.contracts().is_none());
    assert!(session.selected_contract().is_none());
    assert!(session.diagnostics().is_empty());
    assert!(session.saved_name().is_none());
    assert_eq!(session.export_filename(), "contract.sol");
}

#[test]
fn test_load_contract_replaces_state() {
    let mut session = ready_session(&SessionConfig::default());
    let start = Instant::now();
    session.edit_source("contract Draft {}", start);
    let in_flight = session.compile_now().unwrap();

    let saved = SavedContract::new("Token", "contract Token {}");
    let deadline = session.load_contract(&saved, start + 10 * MS);

    assert_eq!(session.text(), "contract Token {}");
    assert!(!session.is_dirty());
    assert_eq!(session.saved_name(), Some("Token"));
    assert_eq!(session.saved_timestamp(), Some(saved.timestamp));
    assert!(session.contracts().is_none());
    assert_eq!(deadline, Some(start + 110 * MS));

    // the draft's answer must not repopulate the loaded contract
    assert!(!session.apply_output(in_flight.request_id, output(&["Draft"])));
    assert!(session.contracts().is_none());

    let request = session.poll(start + 110 * MS).unwrap();
    assert_eq!(request.source_text, "contract Token {}");
}

#[test]
fn test_editor_view_and_deployment() {
    let mut session = ready_session(&SessionConfig::manual());
    session.edit_source("contract A {}", Instant::now());
    let request = session.compile_now().unwrap();
    let library = RawDiagnostic {
        category: "Warning".to_string(),
        message: "Deprecated".to_string(),
        source: Some("lib.sol".to_string()),
        position: RawPosition::LineColumn { line: 2, column: 4 },
        formal: false,
    };
    session.apply_output(
        request.request_id,
        CompilerOutput {
            contracts: output(&["A"]).contracts,
            diagnostics: vec![RawDiagnostic::at_offset("Warning", "Unused", 9), library],
        },
    );

    let view = session.editor_view();
    assert_eq!(view.text, "contract A {}");
    assert_eq!(view.annotations.len(), 1);
    assert_eq!(view.annotations[0].message, "Unused");

    let payload = session.deployment_payload().unwrap();
    assert_eq!(payload.abi, "[]");
    assert_eq!(payload.bytecode_with_prefix, "0x6060604052");
    assert_eq!(payload.sourcecode, "contract A {}");
}

#[test]
fn test_options_do_not_compile() {
    let mut session = ready_session(&SessionConfig::default());
    let mut events = session.events().subscribe();
    assert!(session.toggle_optimize());
    session.select_build(1).unwrap();
    assert_eq!(session.next_deadline(), None);
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::OptionsChanged {
            optimize: true,
            autocompile: true
        }
    );
    assert_eq!(events.try_recv().unwrap(), SessionEvent::BuildSelected { index: 1 });
}

#[test]
fn test_snapshot_reflects_state() {
    let mut session = ready_session(&SessionConfig::manual());
    session.edit_source("contract A {}", Instant::now());
    let request = session.compile_now().unwrap();

    let snapshot = session.snapshot();
    assert!(snapshot.compiling);
    assert_eq!(snapshot.phase, DispatchPhase::Compiling);
    assert_eq!(snapshot.latest_request, Some(request.request_id));
    assert_eq!(snapshot.selected_build, Some(0));
    assert!(!snapshot.loading);
    assert!(snapshot.dirty);
}
