//! Parsing of both compiler output shapes and normalization of their
//! diagnostics.

use scs_compiler::{OutputShape, RawPosition, normalize, parse_output};
use scs_compiler::output::detect_shape;
use scs_model::Severity;

const SOURCE: &str = "pragma solidity ^0.4.11;\n\ncontract Foo {\n    function bar() {\n        uint x;\n    }\n}\n";

#[test]
fn legacy_output_with_formal_results() {
    let json = r#"{
        "contracts": {
            ":Foo": {
                "interface": "[{\"constant\":false,\"inputs\":[],\"name\":\"bar\",\"outputs\":[],\"payable\":false,\"type\":\"function\"}]",
                "bytecode": "6060604052",
                "metadata": "{\"compiler\":{\"version\":\"0.4.11+commit.68ef5810\"}}"
            }
        },
        "errors": [
            ":5:9: Warning: Unused local variable\n        uint x;\n        ^----^\n"
        ],
        "formal": {
            "errors": [":4:5: Warning: Function bar has no formal specification"]
        }
    }"#;

    let output = parse_output(json).expect("parse legacy output");
    let foo = output.contracts.get("Foo").expect("contract Foo");
    assert_eq!(foo.bytecode, "6060604052");
    assert!(foo.abi_interface.starts_with("[{"));
    assert!(foo.metadata.is_some());
    assert!(!output.has_errors());

    let diagnostics = normalize(&output.diagnostics, SOURCE);
    assert_eq!(diagnostics.len(), 2);
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (5, 9));
    assert!(!diagnostics[0].is_formal_verification);
    assert!(diagnostics[1].is_formal_verification);
    assert_eq!(diagnostics[1].severity, Severity::Warning);
    assert!(diagnostics.iter().all(|d| d.is_annotation()));
}

#[test]
fn legacy_output_with_errors_has_no_contracts() {
    let json = r#"{"errors": [":3:14: ParserError: Expected identifier but got '{'\n"]}"#;
    let output = parse_output(json).expect("parse legacy output");
    assert!(output.contracts.is_empty());
    assert!(output.has_errors());
}

#[test]
fn combined_json_output() {
    let json = r#"{
        "contracts": {
            "<stdin>:Foo": {
                "abi": [{"type": "function", "name": "bar", "inputs": [], "outputs": []}],
                "bin": "0x6060604052",
                "metadata": ""
            }
        },
        "version": "0.4.24+commit.e67f0147.Linux.g++"
    }"#;
    let output = parse_output(json).expect("parse combined json");
    let foo = output.contracts.get("Foo").expect("contract Foo");
    assert_eq!(foo.bytecode, "6060604052");
    assert!(foo.abi_interface.contains("\"bar\""));
    assert_eq!(foo.metadata, None);
}

#[test]
fn standard_json_output() {
    let json = r#"{
        "contracts": {
            "Foo.sol": {
                "Foo": {
                    "abi": [],
                    "evm": {"bytecode": {"object": "6080604052"}},
                    "metadata": "{}"
                },
                "Bar": {
                    "abi": [],
                    "evm": {"bytecode": {"object": ""}}
                }
            }
        },
        "errors": [
            {
                "component": "general",
                "severity": "warning",
                "type": "Warning",
                "message": "Unused local variable.",
                "formattedMessage": "Foo.sol:5:9: Warning: Unused local variable.",
                "sourceLocation": {"file": "", "start": 70, "end": 76}
            },
            {
                "component": "general",
                "severity": "warning",
                "type": "Warning",
                "message": "CHC: Assertion violation happens here.",
                "sourceLocation": {"file": "Lib.sol", "start": 0, "end": 4}
            },
            {
                "component": "general",
                "severity": "error",
                "type": "TypeError",
                "message": "No location here."
            }
        ]
    }"#;

    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(detect_shape(&value), OutputShape::Standard);

    let output = parse_output(json).expect("parse standard output");
    assert_eq!(output.contracts.names().collect::<Vec<_>>(), vec!["Bar", "Foo"]);
    assert_eq!(output.diagnostics[0].position, RawPosition::Offset(70));
    assert_eq!(output.diagnostics[2].position, RawPosition::Unknown);

    let diagnostics = normalize(&output.diagnostics, SOURCE);
    // offset 70 is the start of `uint x;`
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (5, 9));
    assert!(diagnostics[1].is_formal_verification);
    assert_eq!(diagnostics[1].contract_name.as_deref(), Some("Lib.sol"));
    assert_eq!(diagnostics[2].severity, Severity::Error);
    assert_eq!((diagnostics[2].line, diagnostics[2].column), (1, 1));
}

#[test]
fn normalized_diagnostic_snapshot() {
    let json = r#"{"errors": [{"severity": "error", "type": "ParserError", "message": "Expected ';' but got '}'", "sourceLocation": {"file": "", "start": 77, "end": 78}}]}"#;
    let output = parse_output(json).expect("parse standard output");
    let diagnostics = normalize(&output.diagnostics, SOURCE);
    insta::assert_json_snapshot!(diagnostics, @r###"
    [
      {
        "severity": "error",
        "message": "Expected ';' but got '}'",
        "contractName": null,
        "line": 5,
        "column": 16,
        "isFormalVerification": false
      }
    ]
    "###);
}
