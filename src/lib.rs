//! # Sercom Core Library
//!
//! A scriptable serial-port commander. One connection at a time, three
//! ways to drive it:
//! - play a command file, one line per poll cycle, with escape tokens for
//!   control bytes
//! - type commands interactively while inbound traffic keeps rendering
//! - just listen
//!
//! Everything on the wire can be mirrored into a rotating transcript with
//! millisecond timestamps, and control bytes render as bracketed
//! mnemonics (`[STX]`, `[CR]`, ...) on screen and in the log.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//! use sercom_core::{
//!     Console, ScriptPlayer, SerialChannel, SerialSettings, SessionIo,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = SerialSettings {
//!         port: "/dev/ttyUSB0".to_string(),
//!         ..SerialSettings::default()
//!     };
//!     settings.validate()?;
//!
//!     let mut channel = SerialChannel::open(&settings)?;
//!     let console = Console::new(true);
//!     let mut io = SessionIo::new(&mut channel, &console, None);
//!
//!     let mut player = ScriptPlayer::from_lines(
//!         ["AT\\r\\n", "AT+GMR\\r\\n"],
//!         Duration::from_millis(500),
//!         false,
//!     );
//!     let running = AtomicBool::new(true);
//!     sercom_core::run_mode(&mut player, &mut io, &running)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::cli::{Args, ExitCodes};
pub use crate::config::{
    ConfigError, FileConfig, Parity, Preset, SerialSettings, Settings, StopBits,
};
pub use crate::core::channel::{ChannelError, SerialChannel, SerialLink};
pub use crate::core::console::Console;
pub use crate::core::dispatch;
pub use crate::core::escape;
pub use crate::core::format;
pub use crate::core::interactive::InteractiveSession;
pub use crate::core::listen::ListenLoop;
pub use crate::core::script::ScriptPlayer;
pub use crate::core::session::{run_mode, ModeDriver, SessionError, SessionIo, Step};
pub use crate::core::transcript::{
    Direction, Transcript, TranscriptConfig, TranscriptError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
