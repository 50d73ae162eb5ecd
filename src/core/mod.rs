//! Core module containing the main functionality of Sercom
//!
//! This module provides:
//! - Serial channel behind a trait, with timeout-bounded reads
//! - Escape-sequence expansion for outbound commands
//! - Control-character annotation shared by console and transcript
//! - Rotating session transcript with millisecond timestamps
//! - One polling loop with three pluggable modes: script playback,
//!   interactive entry, and passive listen
//! - Mode dispatch with fallthrough to listen

pub mod channel;
pub mod console;
pub mod dispatch;
pub mod escape;
pub mod format;
pub mod interactive;
pub mod listen;
pub mod script;
pub mod session;
pub mod transcript;
