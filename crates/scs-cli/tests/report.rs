//! Compile reports built from real session state.

use scs_cli::report::CompileReport;
use scs_compiler::{BackendError, CompilerOutput, RawDiagnostic};
use scs_model::{CompiledContract, CompilerBuild};
use scs_session::{ContractSession, SessionConfig};
use tokio::time::Instant;

const SOURCE: &str = "pragma solidity ^0.4.11;\n\ncontract Foo {\n    function bar() {\n        uint x;\n    }\n}\n";

const HASH: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

fn compiled_session() -> ContractSession {
    let mut session = ContractSession::new(&SessionConfig::manual());
    session.load_builds(vec![CompilerBuild::new(
        "0.4.11",
        "0.4.11+commit.68ef5810",
        true,
        "",
    )]);
    session.select_build(0).unwrap();
    session.mark_build_ready(0, Instant::now()).unwrap();
    session.edit_source(SOURCE, Instant::now());
    session
}

#[test]
fn test_report_snapshot() {
    let mut session = compiled_session();
    let request = session.compile_now().unwrap();
    let contract = CompiledContract {
        name: "Foo".to_string(),
        abi_interface: "[]".to_string(),
        bytecode: format!("6060604052a165627a7a72305820{HASH}0029"),
        metadata: Some(r#"{"version":1}"#.to_string()),
    };
    session.apply_output(
        request.request_id,
        CompilerOutput {
            contracts: std::iter::once(contract).collect(),
            diagnostics: vec![RawDiagnostic::at_offset(
                "Warning",
                "Unused local variable",
                70,
            )],
        },
    );

    let report = CompileReport::from_snapshot(&session.snapshot());
    assert!(!report.has_errors());
    insta::assert_json_snapshot!(report, @r###"
    {
      "build": "0.4.11+commit.68ef5810",
      "optimize": false,
      "contracts": [
        {
          "name": "Foo",
          "bytecodeBytes": 48,
          "metadataHash": "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
          "selected": true
        }
      ],
      "diagnostics": [
        {
          "severity": "warning",
          "message": "Unused local variable",
          "contractName": null,
          "line": 5,
          "column": 9,
          "isFormalVerification": false
        }
      ],
      "counts": {
        "errors": 0,
        "warnings": 1,
        "infos": 0,
        "formal": 0
      },
      "workerError": null
    }
    "###);
}

#[test]
fn test_worker_failure_is_an_error() {
    let mut session = compiled_session();
    let request = session.compile_now().unwrap();
    session.apply_failure(request.request_id, BackendError::Timeout(30_000));

    let report = CompileReport::from_snapshot(&session.snapshot());
    assert!(report.has_errors());
    assert!(report.contracts.is_empty());
    assert_eq!(
        report.worker_error.as_deref(),
        Some("compiler did not respond within 30000 ms")
    );
}

#[test]
fn test_hash_needs_metadata() {
    let mut session = compiled_session();
    let request = session.compile_now().unwrap();
    let contract = CompiledContract {
        name: "Foo".to_string(),
        abi_interface: "[]".to_string(),
        bytecode: format!("6060604052a165627a7a72305820{HASH}0029"),
        metadata: None,
    };
    session.apply_output(
        request.request_id,
        CompilerOutput {
            contracts: std::iter::once(contract).collect(),
            diagnostics: Vec::new(),
        },
    );

    let report = CompileReport::from_snapshot(&session.snapshot());
    assert_eq!(report.contracts.len(), 1);
    assert_eq!(report.contracts[0].metadata_hash, None);
}
