//! Escape-sequence expansion for outbound commands
//!
//! Command files and interactive input are plain text; the documented
//! escape tokens are how they say "send a raw control byte".

/// The recognized escape tokens and the byte each expands to.
const TOKENS: [(&str, u8); 5] = [
    ("\\r", 0x0D),
    ("\\n", 0x0A),
    ("\\x02", 0x02),
    ("\\x03", 0x03),
    ("\\x1B", 0x1B),
];

/// Expand the documented escape tokens in `input` into raw bytes.
///
/// Matching is plain substring substitution against the exact spellings in
/// the token table. A backslash that does not start a recognized token
/// passes through unchanged, so there is no way to escape a backslash and
/// no input is ever rejected.
pub fn expand(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    'scan: while i < bytes.len() {
        if bytes[i] == b'\\' {
            for (token, value) in TOKENS {
                if bytes[i..].starts_with(token.as_bytes()) {
                    out.push(value);
                    i += token.len();
                    continue 'scan;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    out
}

/// Render raw bytes using the escape tokens: token bytes become their
/// spellings, printable ASCII passes through, and everything else renders
/// as `\xNN` so the result stays printable.
///
/// Reverses [`expand`] for text made of printable ASCII and the recognized
/// tokens; generated `\xNN` notation outside the token table is display
/// only and does not expand back.
pub fn escape(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &byte in data {
        match TOKENS.iter().find(|(_, value)| *value == byte) {
            Some((token, _)) => out.push_str(token),
            None if (0x20..=0x7E).contains(&byte) => out.push(byte as char),
            None => out.push_str(&format!("\\x{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_command_terminator() {
        assert_eq!(
            expand("AT+MODE=4\\r\\n"),
            vec![0x41, 0x54, 0x2B, 0x4D, 0x4F, 0x44, 0x45, 0x3D, 0x34, 0x0D, 0x0A]
        );
    }

    #[test]
    fn expands_frame_bytes() {
        assert_eq!(expand("\\x02PAY\\x03"), vec![0x02, b'P', b'A', b'Y', 0x03]);
        assert_eq!(expand("\\x1B[2J"), vec![0x1B, b'[', b'2', b'J']);
    }

    #[test]
    fn unrecognized_sequences_pass_through() {
        assert_eq!(expand("a\\tb"), b"a\\tb".to_vec());
        assert_eq!(expand("\\x04"), b"\\x04".to_vec());
        assert_eq!(expand("trailing\\"), b"trailing\\".to_vec());
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(expand("hello world"), b"hello world".to_vec());
        assert_eq!(expand(""), Vec::<u8>::new());
    }

    #[test]
    fn adjacent_tokens_expand_independently() {
        assert_eq!(expand("\\r\\n\\r\\n"), vec![0x0D, 0x0A, 0x0D, 0x0A]);
    }

    #[test]
    fn escape_round_trips() {
        let original = "PING\\r\\n\\x02x\\x03";
        assert_eq!(escape(&expand(original)), original);
    }

    #[test]
    fn unmapped_bytes_escape_as_hex_notation() {
        assert_eq!(escape(&[0x80, 0xFF]), "\\x80\\xFF");
        assert_eq!(escape(&[0x07, 0x7F]), "\\x07\\x7F");
        assert_eq!(escape(b"plain text"), "plain text");
    }
}
