//! Command-file playback
//!
//! A command file is plain text: one command per line, blank lines and
//! `#` comments skipped, escape tokens expanded at send time. The player
//! sends one line per poll cycle and sleeps the configured delay after
//! each send, which is exactly the window the next drain gives the device
//! to answer in.

use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::core::session::{ModeDriver, SessionError, SessionIo, Step};

/// Keep the lines a command script actually executes.
///
/// A line is dropped when it is empty or starts with `#` after trimming;
/// kept lines stay verbatim, indentation included.
pub fn filter_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter(|line| {
            let trimmed = line.as_ref().trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|line| line.as_ref().to_string())
        .collect()
}

/// Plays a command file through the poll loop, one line per cycle.
#[derive(Debug)]
pub struct ScriptPlayer {
    lines: Vec<String>,
    index: usize,
    delay: Duration,
    recursive: bool,
    cycle: u64,
}

impl ScriptPlayer {
    /// Load and filter a command file.
    pub fn from_file(path: &Path, delay: Duration, recursive: bool) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_lines(text.lines(), delay, recursive))
    }

    /// Build a player from pre-split lines.
    pub fn from_lines<I, S>(lines: I, delay: Duration, recursive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            lines: filter_lines(lines),
            index: 0,
            delay,
            recursive,
            cycle: 0,
        }
    }

    /// Number of effective commands.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when filtering left nothing to send.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl ModeDriver for ScriptPlayer {
    fn name(&self) -> &'static str {
        "playback"
    }

    fn step(&mut self, io: &mut SessionIo<'_>) -> Result<Step, SessionError> {
        if self.lines.is_empty() {
            // An all-comment file under recursive replay would spin forever.
            io.note("command file has no commands");
            return Ok(Step::Finished);
        }

        if self.index >= self.lines.len() {
            if !self.recursive {
                return Ok(Step::Finished);
            }
            self.index = 0;
            self.cycle += 1;
            io.note(&format!(
                "command file finished, replaying (cycle {})",
                self.cycle + 1
            ));
        }

        let line = self.lines[self.index].clone();
        self.index += 1;
        io.console().sent(&line);
        io.send_line(&line)?;
        thread::sleep(self.delay);
        Ok(Step::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channel::mocks::MockLink;
    use crate::core::channel::ChannelError;
    use crate::core::console::Console;
    use crate::core::session::run_mode;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn filter_drops_blanks_and_comments() {
        let lines = filter_lines([
            "# power-up sequence",
            "",
            "   ",
            "AT\\r\\n",
            "  # indented comment",
            "  indented command",
        ]);
        assert_eq!(lines, vec!["AT\\r\\n", "  indented command"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let input = ["# c", "", "CMD1", "  CMD2  "];
        let once = filter_lines(input);
        let twice = filter_lines(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn plays_every_command_once_then_finishes() {
        let mut player =
            ScriptPlayer::from_lines(["CMD1\\r\\n", "# skip", "CMD2\\r\\n"], Duration::ZERO, false);
        assert_eq!(player.len(), 2);

        let mut link = MockLink::new();
        let console = Console::new(false);
        let mut io = SessionIo::new(&mut link, &console, None);
        let running = AtomicBool::new(true);
        run_mode(&mut player, &mut io, &running).unwrap();

        assert_eq!(link.written, vec![b"CMD1\r\n".to_vec(), b"CMD2\r\n".to_vec()]);
    }

    #[test]
    fn empty_script_finishes_immediately() {
        let mut player = ScriptPlayer::from_lines(["# only", "", "# comments"], Duration::ZERO, true);
        assert!(player.is_empty());

        let mut link = MockLink::new();
        let console = Console::new(false);
        let mut io = SessionIo::new(&mut link, &console, None);
        let running = AtomicBool::new(true);
        run_mode(&mut player, &mut io, &running).unwrap();

        assert!(link.written.is_empty());
    }

    #[test]
    fn recursive_wraps_to_the_first_command() {
        let mut player = ScriptPlayer::from_lines(["A", "B"], Duration::ZERO, true);
        let mut link = MockLink::new();
        let console = Console::new(false);
        let mut io = SessionIo::new(&mut link, &console, None);

        for _ in 0..5 {
            assert_eq!(player.step(&mut io).unwrap(), Step::Continue);
        }

        assert_eq!(
            link.written,
            vec![
                b"A".to_vec(),
                b"B".to_vec(),
                b"A".to_vec(),
                b"B".to_vec(),
                b"A".to_vec()
            ]
        );
        assert_eq!(player.cycle, 2);
    }

    #[test]
    fn write_failure_stops_playback() {
        let mut player = ScriptPlayer::from_lines(["PING\\r\\n"], Duration::ZERO, false);
        let mut link = MockLink::new();
        link.set_write_error(ChannelError::Disconnected);
        let console = Console::new(false);
        let mut io = SessionIo::new(&mut link, &console, None);
        let running = AtomicBool::new(true);

        let err = run_mode(&mut player, &mut io, &running).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Channel(ChannelError::Disconnected)
        ));
        assert!(link.written.is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err =
            ScriptPlayer::from_file(Path::new("/no/such/script.txt"), Duration::ZERO, false)
                .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
