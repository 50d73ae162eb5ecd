//! Colored console rendering
//!
//! Data goes to stdout, status and errors go to stderr, so piping the
//! session output leaves the narrative on the terminal. Printable text and
//! control mnemonics get distinct colors; color is dropped automatically
//! when stdout is not a terminal. Lines end with `\r\n` because the
//! interactive mode runs the terminal raw.

use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::core::format::{self, Segment};

/// Console writer with optional color.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    color: bool,
}

impl Console {
    /// Console with color when requested and stdout is a terminal.
    pub fn new(color: bool) -> Self {
        Self {
            color: color && atty::is(atty::Stream::Stdout),
        }
    }

    /// Whether output is being colored.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Render inbound data with control-character annotations.
    pub fn data(&self, data: &[u8]) {
        let mut out = io::stdout();
        for segment in format::annotate(data) {
            let _ = match segment {
                Segment::Text(text) if self.color => write!(out, "{}", text.green()),
                Segment::Text(text) => write!(out, "{text}"),
                Segment::Token(token) if self.color => write!(out, "{}", token.yellow()),
                Segment::Token(token) => write!(out, "{token}"),
                Segment::Break => write!(out, "\r\n"),
            };
        }
        let _ = out.flush();
    }

    /// Echo an outbound command line.
    pub fn sent(&self, text: &str) {
        let mut out = io::stdout();
        let _ = if self.color {
            write!(out, "{}\r\n", format!("> {text}").cyan())
        } else {
            write!(out, "> {text}\r\n")
        };
        let _ = out.flush();
    }

    /// Status notice on stderr.
    pub fn info(&self, message: &str) {
        let mut err = io::stderr();
        let _ = if self.color {
            write!(err, "{}\r\n", message.dim())
        } else {
            write!(err, "{message}\r\n")
        };
        let _ = err.flush();
    }

    /// Failure notice on stderr.
    pub fn error(&self, message: &str) {
        let mut err = io::stderr();
        let _ = if self.color {
            write!(err, "{}\r\n", format!("Error: {message}").red())
        } else {
            write!(err, "Error: {message}\r\n")
        };
        let _ = err.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_is_off_when_disabled() {
        let console = Console::new(false);
        assert!(!console.color());
    }

    // Off-terminal test runners have no tty, so a color request must
    // still come out plain.
    #[test]
    fn color_request_respects_tty() {
        let console = Console::new(true);
        assert_eq!(console.color(), atty::is(atty::Stream::Stdout));
    }
}
