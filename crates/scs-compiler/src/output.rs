//! Compiler output parsing.
//!
//! Compiler builds disagree on the shape of their output. Two shapes are
//! accepted and flattened into one [`CompilerOutput`]:
//!
//! - **Legacy** (solc-js `compile`, `solc --combined-json`): contracts keyed
//!   by `Name`, `:Name` or `file:Name` with string `interface`/`abi` and
//!   `bytecode`/`bin` fields; diagnostics as preformatted
//!   `file:line:col: Type: message` strings, formal verification results
//!   under `formal.errors`.
//! - **Standard JSON**: contracts nested as `contracts[file][Name]` with a
//!   JSON `abi` and `evm.bytecode.object`; diagnostics as objects carrying a
//!   byte offset in `sourceLocation.start`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scs_model::{CompiledContract, ContractSet, Severity};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CompilerError, Result};

/// `file:line:col: Type: message`, message may span lines.
static FORMATTED_MESSAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^([^\n]*?):(\d+):(\d+):\s*([A-Za-z]+):\s*(.*)$")
        .expect("Invalid formatted message regex")
});

/// Source labels that stand for the edited buffer itself.
const ANONYMOUS_SOURCES: &[&str] = &["", "<stdin>"];

/// Components and message prefixes emitted by the formal verification
/// checker in standard-JSON output.
const FORMAL_COMPONENTS: &[&str] = &["smtchecker", "formal", "why3"];
const FORMAL_MESSAGE_PREFIXES: &[&str] = &["CHC:", "BMC:", "SMTChecker"];

/// Where a raw diagnostic points into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawPosition {
    /// Byte offset into the compiled source text.
    Offset(usize),
    /// Line and column already resolved by the compiler (1-based).
    LineColumn { line: usize, column: usize },
    /// The compiler gave no location.
    Unknown,
}

/// A diagnostic exactly as the compiler reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDiagnostic {
    /// Compiler severity or category string (`Error`, `TypeError`, `warning`).
    pub category: String,
    pub message: String,
    /// Source or contract label attached by the compiler.
    pub source: Option<String>,
    pub position: RawPosition,
    /// Produced by the formal verification checker.
    pub formal: bool,
}

impl RawDiagnostic {
    /// A diagnostic pointing at a byte offset of the anonymous source.
    pub fn at_offset(category: impl Into<String>, message: impl Into<String>, offset: usize) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
            source: None,
            position: RawPosition::Offset(offset),
            formal: false,
        }
    }

    /// Parse a preformatted `file:line:col: Type: message` diagnostic.
    ///
    /// Text that does not follow that format is kept as a position-less
    /// diagnostic so that no compiler message is ever dropped.
    pub fn from_formatted(text: &str, formal: bool) -> Self {
        if let Some(captures) = FORMATTED_MESSAGE_REGEX.captures(text) {
            let line = captures[2].parse().unwrap_or(1);
            let column = captures[3].parse().unwrap_or(1);
            return Self {
                category: captures[4].to_string(),
                message: captures[5].trim_end().to_string(),
                source: Some(captures[1].to_string()),
                position: RawPosition::LineColumn { line, column },
                formal,
            };
        }

        let category = if text.contains("Warning") {
            "Warning"
        } else {
            "Error"
        };
        Self {
            category: category.to_string(),
            message: text.trim().to_string(),
            source: None,
            position: RawPosition::Unknown,
            formal,
        }
    }

    /// The severity this diagnostic will normalize to.
    #[must_use]
    pub fn severity(&self) -> Severity {
        if self.formal {
            Severity::Warning
        } else {
            Severity::from_compiler_label(&self.category)
        }
    }

    /// The source label, with labels for the edited buffer itself mapped to
    /// `None`.
    #[must_use]
    pub fn source_label(&self) -> Option<&str> {
        self.source
            .as_deref()
            .filter(|label| !ANONYMOUS_SOURCES.contains(label))
    }
}

/// Which output shape a compiler produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    Legacy,
    Standard,
}

/// Compiler output flattened into contracts and raw diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOutput {
    pub contracts: ContractSet,
    pub diagnostics: Vec<RawDiagnostic>,
}

impl CompilerOutput {
    /// Whether any non-formal diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity() == Severity::Error)
    }
}

/// Parse compiler output JSON of either shape.
pub fn parse_output(json: &str) -> Result<CompilerOutput> {
    let value: Value = serde_json::from_str(json)?;
    parse_output_value(&value)
}

/// Parse an already decoded compiler output document.
pub fn parse_output_value(value: &Value) -> Result<CompilerOutput> {
    if !value.is_object() {
        return Err(CompilerError::InvalidOutput(
            "expected a JSON object".to_string(),
        ));
    }
    match detect_shape(value) {
        OutputShape::Legacy => parse_legacy(value),
        OutputShape::Standard => parse_standard(value),
    }
}

/// Decide which shape `value` has.
///
/// Standard JSON is recognised by object-valued `errors` entries or by
/// contracts nested one level deeper (a file whose entries are all
/// objects). Everything else is treated as legacy output.
pub fn detect_shape(value: &Value) -> OutputShape {
    let object_errors = value
        .get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| errors.iter().any(Value::is_object));
    if object_errors {
        return OutputShape::Standard;
    }

    let nested_contracts = value
        .get("contracts")
        .and_then(Value::as_object)
        .is_some_and(|contracts| contracts.values().any(is_standard_file_entry));
    if nested_contracts {
        OutputShape::Standard
    } else {
        OutputShape::Legacy
    }
}

fn is_standard_file_entry(entry: &Value) -> bool {
    let Some(fields) = entry.as_object() else {
        return false;
    };
    let has_legacy_field = ["interface", "bytecode", "bin"]
        .iter()
        .any(|key| fields.get(*key).is_some_and(Value::is_string));
    !has_legacy_field && !fields.is_empty() && fields.values().all(Value::is_object)
}

#[derive(Debug, Default, Deserialize)]
struct LegacyContract {
    #[serde(default)]
    interface: Option<Value>,
    #[serde(default)]
    abi: Option<Value>,
    #[serde(default)]
    bytecode: Option<String>,
    #[serde(default)]
    bin: Option<String>,
    #[serde(default)]
    metadata: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LegacyFormal {
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LegacyOutput {
    #[serde(default)]
    contracts: BTreeMap<String, LegacyContract>,
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    formal: Option<LegacyFormal>,
}

fn parse_legacy(value: &Value) -> Result<CompilerOutput> {
    let output = LegacyOutput::deserialize(value)
        .map_err(|e| CompilerError::InvalidOutput(format!("legacy output: {e}")))?;

    let contracts = output
        .contracts
        .into_iter()
        .map(|(key, contract)| CompiledContract {
            name: contract_name_from_key(&key).to_string(),
            abi_interface: contract
                .interface
                .or(contract.abi)
                .map(abi_to_string)
                .unwrap_or_default(),
            bytecode: strip_hex_prefix(contract.bytecode.or(contract.bin).unwrap_or_default()),
            metadata: non_empty(contract.metadata),
        })
        .collect();

    let formal = output.formal.map(|formal| formal.errors).unwrap_or_default();
    let diagnostics = output
        .errors
        .iter()
        .map(|text| RawDiagnostic::from_formatted(text, false))
        .chain(
            formal
                .iter()
                .map(|text| RawDiagnostic::from_formatted(text, true)),
        )
        .collect();

    Ok(CompilerOutput {
        contracts,
        diagnostics,
    })
}

#[derive(Debug, Default, Deserialize)]
struct StandardBytecode {
    #[serde(default)]
    object: String,
}

#[derive(Debug, Default, Deserialize)]
struct StandardEvm {
    #[serde(default)]
    bytecode: Option<StandardBytecode>,
}

#[derive(Debug, Default, Deserialize)]
struct StandardContract {
    #[serde(default)]
    abi: Option<Value>,
    #[serde(default)]
    evm: Option<StandardEvm>,
    #[serde(default)]
    metadata: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StandardSourceLocation {
    #[serde(default)]
    file: Option<String>,
    #[serde(default = "negative_offset")]
    start: i64,
}

fn negative_offset() -> i64 {
    -1
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StandardError {
    #[serde(default)]
    severity: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    component: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    formatted_message: Option<String>,
    #[serde(default)]
    source_location: Option<StandardSourceLocation>,
}

#[derive(Debug, Default, Deserialize)]
struct StandardOutput {
    #[serde(default)]
    contracts: BTreeMap<String, BTreeMap<String, StandardContract>>,
    #[serde(default)]
    errors: Vec<StandardError>,
}

fn parse_standard(value: &Value) -> Result<CompilerOutput> {
    let output = StandardOutput::deserialize(value)
        .map_err(|e| CompilerError::InvalidOutput(format!("standard JSON output: {e}")))?;

    let contracts = output
        .contracts
        .into_values()
        .flat_map(BTreeMap::into_iter)
        .map(|(name, contract)| CompiledContract {
            name,
            abi_interface: contract.abi.map(abi_to_string).unwrap_or_default(),
            bytecode: strip_hex_prefix(
                contract
                    .evm
                    .and_then(|evm| evm.bytecode)
                    .map(|bytecode| bytecode.object)
                    .unwrap_or_default(),
            ),
            metadata: non_empty(contract.metadata),
        })
        .collect();

    let diagnostics = output.errors.into_iter().map(standard_diagnostic).collect();

    Ok(CompilerOutput {
        contracts,
        diagnostics,
    })
}

fn standard_diagnostic(error: StandardError) -> RawDiagnostic {
    let message = error
        .message
        .or(error.formatted_message)
        .unwrap_or_default();
    let formal = error
        .component
        .as_deref()
        .is_some_and(|component| FORMAL_COMPONENTS.contains(&component.to_ascii_lowercase().as_str()))
        || FORMAL_MESSAGE_PREFIXES
            .iter()
            .any(|prefix| message.starts_with(prefix));
    let (source, position) = match error.source_location {
        Some(location) => {
            let position = usize::try_from(location.start)
                .map(RawPosition::Offset)
                .unwrap_or(RawPosition::Unknown);
            (location.file, position)
        }
        None => (None, RawPosition::Unknown),
    };

    RawDiagnostic {
        category: error.severity.or(error.kind).unwrap_or_default(),
        message: message.trim_end().to_string(),
        source,
        position,
        formal,
    }
}

/// `Name`, `:Name`, `file:Name` and `<stdin>:Name` all name contract `Name`.
fn contract_name_from_key(key: &str) -> &str {
    key.rsplit_once(':').map_or(key, |(_, name)| name)
}

fn abi_to_string(abi: Value) -> String {
    match abi {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn strip_hex_prefix(bytecode: String) -> String {
    match bytecode.strip_prefix("0x") {
        Some(stripped) => stripped.to_string(),
        None => bytecode,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}
