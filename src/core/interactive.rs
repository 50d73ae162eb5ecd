//! Interactive manual entry
//!
//! A raw-mode prompt multiplexed with inbound traffic: keystrokes build a
//! command line while received data keeps rendering between them. Enter
//! sends the accumulated line (escape tokens included), Backspace edits
//! it, Escape leaves the mode. Raw mode means Ctrl+C arrives as a key
//! event rather than a signal, so the session handles it here.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::core::session::{ModeDriver, SessionError, SessionIo, Step};

/// Prompt glyph shown while composing a line.
const PROMPT: &str = "> ";

/// Keyboard poll tick; doubles as the loop suspension.
const POLL_TICK: Duration = Duration::from_millis(100);

/// Puts the terminal back into cooked mode on every exit path.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Manual command entry with live echo of inbound traffic.
pub struct InteractiveSession {
    line: String,
    prompt_shown: bool,
    running: Arc<AtomicBool>,
    _raw: RawModeGuard,
}

impl InteractiveSession {
    /// Switch the terminal to raw mode and set up the prompt state.
    pub fn start(running: Arc<AtomicBool>) -> io::Result<Self> {
        Ok(Self {
            line: String::new(),
            prompt_shown: false,
            running,
            _raw: RawModeGuard::enable()?,
        })
    }

    fn show_prompt(&mut self) {
        print!("{}{}", PROMPT, self.line);
        let _ = io::stdout().flush();
        self.prompt_shown = true;
    }

    fn newline() {
        print!("\r\n");
        let _ = io::stdout().flush();
    }
}

impl ModeDriver for InteractiveSession {
    fn name(&self) -> &'static str {
        "interactive"
    }

    fn on_received(&mut self, _data: &[u8]) {
        // Move inbound output off the prompt line; the prompt and any
        // partially typed line come back on the next step.
        if self.prompt_shown {
            Self::newline();
        }
        self.prompt_shown = false;
    }

    fn step(&mut self, io: &mut SessionIo<'_>) -> Result<Step, SessionError> {
        if !self.prompt_shown {
            self.show_prompt();
        }

        if !event::poll(POLL_TICK).map_err(SessionError::Terminal)? {
            return Ok(Step::Continue);
        }
        let Event::Key(key) = event::read().map_err(SessionError::Terminal)? else {
            return Ok(Step::Continue);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(Step::Continue);
        }

        match key.code {
            KeyCode::Esc => {
                Self::newline();
                return Ok(Step::Finished);
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Self::newline();
                self.running.store(false, Ordering::SeqCst);
            }
            KeyCode::Enter => {
                Self::newline();
                if !self.line.is_empty() {
                    let line = std::mem::take(&mut self.line);
                    io.send_line(&line)?;
                }
                self.prompt_shown = false;
            }
            KeyCode::Backspace => {
                if self.line.pop().is_some() {
                    print!("\x08 \x08");
                    let _ = io::stdout().flush();
                }
            }
            KeyCode::Char(c) => {
                self.line.push(c);
                print!("{c}");
                let _ = io::stdout().flush();
            }
            _ => {}
        }

        Ok(Step::Continue)
    }
}
