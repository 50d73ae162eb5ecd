//! Mode dispatch
//!
//! Decides which mode a session starts in and what follows it. A command
//! file wins over the interactive flag; both fall through to the listen
//! loop when they finish, and a recursive playback only leaves through an
//! interrupt or a channel failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Settings;
use crate::core::interactive::InteractiveSession;
use crate::core::listen::ListenLoop;
use crate::core::script::ScriptPlayer;
use crate::core::session::{run_mode, SessionError, SessionIo};

/// Run the session modes chosen by `settings` until exit.
pub fn run(
    settings: &Settings,
    io: &mut SessionIo<'_>,
    running: &Arc<AtomicBool>,
) -> Result<(), SessionError> {
    if let Some(path) = &settings.command_file {
        let mut player = ScriptPlayer::from_file(path, settings.delay, settings.recursive)
            .map_err(|source| SessionError::Script {
                path: path.clone(),
                source,
            })?;
        io.note(&format!(
            "playing {} ({} commands, {} ms between commands{})",
            path.display(),
            player.len(),
            settings.delay.as_millis(),
            if settings.recursive { ", recursive" } else { "" }
        ));
        run_mode(&mut player, io, running)?;
    } else if settings.interactive {
        io.note("interactive session started (Esc to leave, Ctrl+C to exit)");
        let mut session = InteractiveSession::start(running.clone())?;
        run_mode(&mut session, io, running)?;
    }

    if !running.load(Ordering::SeqCst) {
        return Ok(());
    }

    io.note("listening (Ctrl+C to exit)");
    run_mode(&mut ListenLoop::new(), io, running)
}
