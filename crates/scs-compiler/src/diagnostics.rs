//! Diagnostic mapping.
//!
//! Turns [`RawDiagnostic`]s into editor-ready [`Diagnostic`]s. Offsets are
//! resolved against the exact source text that was compiled, so a
//! [`LineIndex`] is rebuilt for every compile.
//!
//! # Position convention
//!
//! Lines and columns are 1-based and columns count characters, not bytes.
//! An offset that points at a `\n` belongs to the line that newline ends:
//! its column is one past the last character of that line. Offsets past
//! the end of the text clamp to the end, and offsets inside a multi-byte
//! character resolve to the start of that character.

use scs_model::Diagnostic;

use crate::output::{RawDiagnostic, RawPosition};

/// Byte offsets of line starts in a source text.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                text.bytes()
                    .enumerate()
                    .filter(|(_, byte)| *byte == b'\n')
                    .map(|(index, _)| index + 1),
            )
            .collect();
        Self { text, line_starts }
    }

    /// Number of lines, counting the (possibly empty) line after a trailing
    /// newline.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Resolve a byte offset into a 1-based `(line, column)` pair.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let offset = floor_char_boundary(self.text, offset.min(self.text.len()));
        // line_starts[0] == 0, so the partition point is always at least 1
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let start = self.line_starts[line - 1];
        let column = self.text[start..offset].chars().count() + 1;
        (line, column)
    }
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Normalize raw compiler diagnostics against the compiled source text.
///
/// Pure: identical input always yields identical output, one
/// [`Diagnostic`] per raw diagnostic, in input order.
pub fn normalize(raw: &[RawDiagnostic], source_text: &str) -> Vec<Diagnostic> {
    let index = LineIndex::new(source_text);
    raw.iter()
        .map(|diagnostic| normalize_one(diagnostic, &index))
        .collect()
}

fn normalize_one(raw: &RawDiagnostic, index: &LineIndex<'_>) -> Diagnostic {
    let (line, column) = match raw.position {
        RawPosition::Offset(offset) => index.position(offset),
        RawPosition::LineColumn { line, column } => (line.max(1), column.max(1)),
        RawPosition::Unknown => (1, 1),
    };

    Diagnostic {
        severity: raw.severity(),
        message: raw.message.clone(),
        contract_name: raw.source_label().map(str::to_string),
        line,
        column,
        is_formal_verification: raw.formal,
    }
}
