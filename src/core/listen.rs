//! Passive listen mode
//!
//! The fallback for every session: render whatever arrives until the user
//! interrupts.

use std::thread;
use std::time::Duration;

use crate::core::session::{ModeDriver, SessionError, SessionIo, Step};

/// Poll interval between drains. Coarse, since nothing competes with the
/// channel for responsiveness here.
const LISTEN_TICK: Duration = Duration::from_secs(1);

/// Render-only mode that never finishes on its own.
#[derive(Debug, Default)]
pub struct ListenLoop;

impl ListenLoop {
    /// A fresh listen loop.
    pub fn new() -> Self {
        Self
    }
}

impl ModeDriver for ListenLoop {
    fn name(&self) -> &'static str {
        "listen"
    }

    fn step(&mut self, _io: &mut SessionIo<'_>) -> Result<Step, SessionError> {
        thread::sleep(LISTEN_TICK);
        Ok(Step::Continue)
    }
}
