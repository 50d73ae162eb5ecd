//! Shared polling loop
//!
//! All three run modes (script playback, interactive entry, passive
//! listen) are one loop: drain the channel, render whatever arrived, take
//! one mode-specific step. The [`ModeDriver`] trait is the strategy half;
//! [`run_mode`] is the loop itself. Each step owns its suspension, so the
//! process never spins while idle.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::core::channel::{ChannelError, SerialLink};
use crate::core::console::Console;
use crate::core::escape;
use crate::core::transcript::{Direction, Transcript};

/// Failures that end a session after the channel opened.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The command file could not be read.
    #[error("cannot read command file {path}: {source}")]
    Script {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The terminal refused raw mode or event polling.
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
    /// The channel itself failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Outcome of one mode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep polling.
    Continue,
    /// Mode is done; hand control back to the dispatcher.
    Finished,
}

/// Strategy half of the poll loop: what a mode does between drains.
pub trait ModeDriver {
    /// Mode name for diagnostics.
    fn name(&self) -> &'static str;

    /// Called when a drain produced data, before it is rendered.
    fn on_received(&mut self, _data: &[u8]) {}

    /// One unit of mode-specific work, including its own suspension.
    fn step(&mut self, io: &mut SessionIo<'_>) -> Result<Step, SessionError>;
}

/// Everything a mode needs to talk to the outside world: the channel, the
/// console, and the optional transcript, kept in lockstep.
pub struct SessionIo<'a> {
    link: &'a mut dyn SerialLink,
    console: &'a Console,
    transcript: Option<&'a mut Transcript>,
}

impl<'a> SessionIo<'a> {
    /// Bundle a channel, console, and optional transcript.
    pub fn new(
        link: &'a mut dyn SerialLink,
        console: &'a Console,
        transcript: Option<&'a mut Transcript>,
    ) -> Self {
        Self {
            link,
            console,
            transcript,
        }
    }

    /// The console, for mode-specific output.
    pub fn console(&self) -> &Console {
        self.console
    }

    /// Expand escapes in `raw`, transmit, and record a `SENT` entry with
    /// the original text.
    pub fn send_line(&mut self, raw: &str) -> Result<(), ChannelError> {
        let payload = escape::expand(raw);
        self.link.write(&payload)?;
        tracing::debug!("sent {} bytes", payload.len());
        self.record(Direction::Sent, raw, None);
        Ok(())
    }

    /// Show and record an informational notice.
    pub fn note(&mut self, message: &str) {
        self.console.info(message);
        self.record(Direction::Info, message, None);
    }

    /// Record a transcript entry without console output.
    pub fn record(&mut self, direction: Direction, message: &str, raw: Option<&[u8]>) {
        if let Some(transcript) = self.transcript.as_deref_mut() {
            transcript.append(direction, message, raw);
        }
    }

    fn render_received(&mut self, data: &[u8]) {
        self.console.data(data);
        self.record(
            Direction::Recv,
            &format!("received {} bytes", data.len()),
            Some(data),
        );
    }
}

/// Drive `mode` until it finishes, the user interrupts, or the channel
/// fails.
///
/// Every iteration drains the channel first, so data that arrived during
/// the previous step is rendered before the next command goes out.
pub fn run_mode(
    mode: &mut dyn ModeDriver,
    io: &mut SessionIo<'_>,
    running: &AtomicBool,
) -> Result<(), SessionError> {
    tracing::debug!("entering {} mode", mode.name());
    while running.load(Ordering::SeqCst) {
        let data = io.link.read_available()?;
        if !data.is_empty() {
            mode.on_received(&data);
            io.render_received(&data);
        }
        match mode.step(io)? {
            Step::Continue => {}
            Step::Finished => break,
        }
    }
    tracing::debug!("leaving {} mode", mode.name());
    Ok(())
}
