//! CLI Exit Codes
//!
//! Stable exit codes for automation: a wrapper script can tell a missing
//! port from a missing command file without parsing stderr.

use std::io;

use crate::core::channel::ChannelError;
use crate::core::session::SessionError;

/// Exit code constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes;

impl ExitCodes {
    /// Success, including a graceful interrupt
    pub const SUCCESS: u8 = 0;

    /// General error
    pub const ERROR: u8 = 1;

    /// Invalid arguments (clap's own code)
    pub const INVALID_ARGS: u8 = 2;

    /// Channel failed to open
    pub const CONNECTION_FAILED: u8 = 3;

    /// Command file not found
    pub const FILE_NOT_FOUND: u8 = 6;

    /// Permission denied, port or file
    pub const PERMISSION_DENIED: u8 = 7;

    /// Configuration error
    pub const CONFIG_ERROR: u8 = 8;

    /// Port not found
    pub const PORT_NOT_FOUND: u8 = 14;
}

/// Exit code for a channel failure.
pub fn channel_exit_code(err: &ChannelError) -> u8 {
    match err {
        ChannelError::PortNotFound(_) => ExitCodes::PORT_NOT_FOUND,
        ChannelError::PermissionDenied(_) => ExitCodes::PERMISSION_DENIED,
        ChannelError::OpenFailed { .. } => ExitCodes::CONNECTION_FAILED,
        ChannelError::Disconnected | ChannelError::Io(_) | ChannelError::Closed => ExitCodes::ERROR,
    }
}

/// Exit code for a session failure after the channel opened.
pub fn session_exit_code(err: &SessionError) -> u8 {
    match err {
        SessionError::Script { source, .. } => match source.kind() {
            io::ErrorKind::NotFound => ExitCodes::FILE_NOT_FOUND,
            io::ErrorKind::PermissionDenied => ExitCodes::PERMISSION_DENIED,
            _ => ExitCodes::ERROR,
        },
        SessionError::Terminal(_) => ExitCodes::ERROR,
        SessionError::Channel(err) => channel_exit_code(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn connection_failures_map_by_variant() {
        assert_eq!(
            channel_exit_code(&ChannelError::PortNotFound("COM9".to_string())),
            ExitCodes::PORT_NOT_FOUND
        );
        assert_eq!(
            channel_exit_code(&ChannelError::PermissionDenied("/dev/ttyS0".to_string())),
            ExitCodes::PERMISSION_DENIED
        );
        assert_eq!(
            channel_exit_code(&ChannelError::OpenFailed {
                port: "COM3".to_string(),
                reason: "busy".to_string(),
            }),
            ExitCodes::CONNECTION_FAILED
        );
        assert_eq!(
            channel_exit_code(&ChannelError::Disconnected),
            ExitCodes::ERROR
        );
    }

    #[test]
    fn missing_script_maps_to_file_not_found() {
        let err = SessionError::Script {
            path: PathBuf::from("commands.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(session_exit_code(&err), ExitCodes::FILE_NOT_FOUND);
    }

    #[test]
    fn runtime_channel_failure_maps_to_general_error() {
        let err = SessionError::Channel(ChannelError::Disconnected);
        assert_eq!(session_exit_code(&err), ExitCodes::ERROR);
    }
}
