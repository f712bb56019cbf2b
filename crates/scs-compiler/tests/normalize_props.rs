//! Property tests for diagnostic normalization.

use proptest::prelude::*;
use scs_compiler::{LineIndex, RawDiagnostic, normalize};

fn raw_diagnostics() -> impl Strategy<Value = Vec<RawDiagnostic>> {
    prop::collection::vec(
        (
            prop_oneof![Just("error"), Just("warning"), Just("info")],
            "[a-z ]{0,12}",
            0usize..200,
        )
            .prop_map(|(category, message, offset)| {
                RawDiagnostic::at_offset(category, message, offset)
            }),
        0..8,
    )
}

proptest! {
    #[test]
    fn normalize_is_deterministic(raw in raw_diagnostics(), text in "[a-z{};\n ]{0,120}") {
        let first = normalize(&raw, &text);
        let second = normalize(&raw, &text);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), raw.len());
    }

    #[test]
    fn positions_stay_inside_text(text in "[a-zé\n\r]{0,80}", offset in 0usize..120) {
        let index = LineIndex::new(&text);
        let (line, column) = index.position(offset);
        prop_assert!(line >= 1);
        prop_assert!(line <= index.line_count());
        prop_assert!(column >= 1);
    }

    #[test]
    fn newline_belongs_to_the_line_it_ends(text in "[a-z\n]{1,80}") {
        let index = LineIndex::new(&text);
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                let (line, column) = index.position(offset);
                let (next_line, next_column) = index.position(offset + 1);
                prop_assert_eq!(next_line, line + 1);
                prop_assert_eq!(next_column, 1);
                prop_assert!(column >= 1);
            }
        }
    }
}
