//! Control-character annotation
//!
//! One fixed mnemonic table shared by the console view and the transcript
//! log, so a frame always reads the same on screen and on disk.

/// Mnemonics for the 32 C0 control bytes, indexed by byte value.
const C0_MNEMONICS: [&str; 32] = [
    "[NUL]", "[SOH]", "[STX]", "[ETX]", "[EOT]", "[ENQ]", "[ACK]", "[BEL]",
    "[BS]", "[HT]", "[LF]", "[VT]", "[FF]", "[CR]", "[SO]", "[SI]",
    "[DLE]", "[DC1]", "[DC2]", "[DC3]", "[DC4]", "[NAK]", "[SYN]", "[ETB]",
    "[CAN]", "[EM]", "[SUB]", "[ESC]", "[FS]", "[GS]", "[RS]", "[US]",
];

/// Bracketed mnemonic for a control byte, `None` for everything else.
pub fn mnemonic(byte: u8) -> Option<&'static str> {
    match byte {
        0..=31 => Some(C0_MNEMONICS[byte as usize]),
        127 => Some("[DEL]"),
        _ => None,
    }
}

/// One run of identically-rendered console output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal printable text.
    Text(String),
    /// Bracketed control mnemonic.
    Token(&'static str),
    /// Line break emitted after an `[LF]` token to keep line structure.
    Break,
}

/// Split `data` into printable runs and control tokens for display.
///
/// Printable bytes (32-126) are grouped into `Text` runs; every control
/// byte becomes its own `Token`, and a `Break` follows each `[LF]` so the
/// console output keeps the line structure of the traffic. Bytes above 127
/// pass through as their literal character.
pub fn annotate(data: &[u8]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut run = String::new();

    for &byte in data {
        match mnemonic(byte) {
            Some(token) => {
                if !run.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut run)));
                }
                segments.push(Segment::Token(token));
                if byte == b'\n' {
                    segments.push(Segment::Break);
                }
            }
            None => run.push(byte as char),
        }
    }

    if !run.is_empty() {
        segments.push(Segment::Text(run));
    }

    segments
}

/// Uncolored rendering used for transcript serialization.
///
/// Space stays a literal space, control bytes use the shared mnemonic
/// table, and everything else passes through as its literal character. No
/// line breaks are inserted: one payload stays one log line.
pub fn plain(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &byte in data {
        match mnemonic(byte) {
            Some(token) => out.push_str(token),
            None => out.push(byte as char),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_value_renders() {
        for value in 0..=255u8 {
            let rendered = plain(&[value]);
            assert!(!rendered.is_empty(), "byte {:#04x} rendered nothing", value);
            match value {
                0..=31 | 127 => {
                    assert!(rendered.starts_with('['), "byte {:#04x}: {}", value, rendered);
                    assert!(rendered.ends_with(']'), "byte {:#04x}: {}", value, rendered);
                }
                _ => assert_eq!(rendered.chars().count(), 1, "byte {:#04x}: {}", value, rendered),
            }
        }
    }

    #[test]
    fn mnemonic_table_bounds() {
        assert_eq!(mnemonic(0), Some("[NUL]"));
        assert_eq!(mnemonic(2), Some("[STX]"));
        assert_eq!(mnemonic(3), Some("[ETX]"));
        assert_eq!(mnemonic(27), Some("[ESC]"));
        assert_eq!(mnemonic(31), Some("[US]"));
        assert_eq!(mnemonic(127), Some("[DEL]"));
        assert_eq!(mnemonic(b' '), None);
        assert_eq!(mnemonic(b'A'), None);
        assert_eq!(mnemonic(126), None);
    }

    #[test]
    fn annotate_groups_printable_runs() {
        let segments = annotate(b"OK\r\n>");
        assert_eq!(
            segments,
            vec![
                Segment::Text("OK".to_string()),
                Segment::Token("[CR]"),
                Segment::Token("[LF]"),
                Segment::Break,
                Segment::Text(">".to_string()),
            ]
        );
    }

    #[test]
    fn annotate_breaks_only_after_lf() {
        let segments = annotate(b"\r\r\n\r");
        let breaks = segments.iter().filter(|s| **s == Segment::Break).count();
        assert_eq!(breaks, 1);
    }

    #[test]
    fn plain_keeps_spaces_literal() {
        assert_eq!(plain(b"a b\tc"), "a b[HT]c");
    }

    #[test]
    fn empty_input_is_a_no_op() {
        assert!(annotate(b"").is_empty());
        assert_eq!(plain(b""), "");
    }
}
