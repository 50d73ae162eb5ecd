//! Serial channel
//!
//! One owned connection handle behind the [`SerialLink`] trait. Reads are
//! bounded by the configured timeout and a timeout is not an error: the
//! poll loop treats "nothing arrived" as a normal outcome.

use std::fmt;
use std::io::{self, Read, Write};

use bytes::Bytes;
use serialport::SerialPort;
use thiserror::Error;

use crate::config::{Parity, SerialSettings, StopBits};

/// Upper bound on a single drain.
const READ_BUFFER_SIZE: usize = 4096;

/// Errors raised by the serial channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The named port does not exist on this system.
    #[error("serial port not found: {0}")]
    PortNotFound(String),
    /// The port exists but this process may not open it.
    #[error("permission denied opening serial port: {0}")]
    PermissionDenied(String),
    /// Any other open failure, including a busy port.
    #[error("failed to open {port}: {reason}")]
    OpenFailed {
        /// Port name as requested.
        port: String,
        /// Driver-reported reason.
        reason: String,
    },
    /// The device went away mid-session.
    #[error("serial device disconnected")]
    Disconnected,
    /// Read or write failure on an open channel.
    #[error("serial I/O error: {0}")]
    Io(#[from] io::Error),
    /// Operation on a channel that was already closed.
    #[error("serial channel is closed")]
    Closed,
}

/// Byte-level operations every session mode needs from the port.
///
/// The production implementation is [`SerialChannel`]; tests substitute a
/// scripted mock.
pub trait SerialLink {
    /// Write the whole buffer to the channel.
    fn write(&mut self, bytes: &[u8]) -> Result<(), ChannelError>;

    /// Drain whatever is available within one read timeout.
    ///
    /// Returns an empty [`Bytes`] when the timeout elapsed with nothing to
    /// read.
    fn read_available(&mut self) -> Result<Bytes, ChannelError>;

    /// Close the channel. Safe to call more than once.
    fn close(&mut self);

    /// Human-readable connection summary, e.g. `COM3 @ 9600 baud (7E1)`.
    fn describe(&self) -> String;
}

/// Owned serial connection.
pub struct SerialChannel {
    port: Option<Box<dyn SerialPort>>,
    summary: String,
    read_buf: Vec<u8>,
}

impl SerialChannel {
    /// Open the port described by `settings`.
    ///
    /// Parameter combinations the driver cannot express are rejected here
    /// even though configuration validation normally catches them first.
    pub fn open(settings: &SerialSettings) -> Result<Self, ChannelError> {
        let data_bits = match settings.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => {
                return Err(ChannelError::OpenFailed {
                    port: settings.port.clone(),
                    reason: format!("unsupported data bits: {other}"),
                })
            }
        };
        let parity = match settings.parity {
            Parity::None => serialport::Parity::None,
            Parity::Even => serialport::Parity::Even,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Mark | Parity::Space => {
                return Err(ChannelError::OpenFailed {
                    port: settings.port.clone(),
                    reason: format!("{} parity is not supported by the serial driver", settings.parity),
                })
            }
        };
        let stop_bits = match settings.stop_bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
            StopBits::OnePointFive => {
                return Err(ChannelError::OpenFailed {
                    port: settings.port.clone(),
                    reason: "1.5 stop bits are not supported by the serial driver".to_string(),
                })
            }
        };

        match serialport::new(&settings.port, settings.baud)
            .data_bits(data_bits)
            .parity(parity)
            .stop_bits(stop_bits)
            .flow_control(serialport::FlowControl::None)
            .timeout(settings.read_timeout)
            .open()
        {
            Ok(port) => {
                tracing::debug!("opened {}", settings.summary());
                Ok(Self {
                    port: Some(port),
                    summary: settings.summary(),
                    read_buf: vec![0u8; READ_BUFFER_SIZE],
                })
            }
            Err(e) => Err(match e.kind() {
                serialport::ErrorKind::NoDevice => ChannelError::PortNotFound(settings.port.clone()),
                serialport::ErrorKind::Io(io::ErrorKind::NotFound) => {
                    ChannelError::PortNotFound(settings.port.clone())
                }
                serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => {
                    ChannelError::PermissionDenied(settings.port.clone())
                }
                _ => ChannelError::OpenFailed {
                    port: settings.port.clone(),
                    reason: e.to_string(),
                },
            }),
        }
    }
}

// The port handle is a trait object, so Debug is spelled out.
impl fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialChannel")
            .field("summary", &self.summary)
            .field("open", &self.port.is_some())
            .finish()
    }
}

impl SerialLink for SerialChannel {
    fn write(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        let port = self.port.as_mut().ok_or(ChannelError::Closed)?;
        port.write_all(bytes)?;
        port.flush()?;
        Ok(())
    }

    fn read_available(&mut self) -> Result<Bytes, ChannelError> {
        let port = self.port.as_mut().ok_or(ChannelError::Closed)?;
        match port.read(&mut self.read_buf) {
            Ok(0) => Err(ChannelError::Disconnected),
            Ok(n) => Ok(Bytes::copy_from_slice(&self.read_buf[..n])),
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => Ok(Bytes::new()),
            Err(e) => Err(ChannelError::Io(e)),
        }
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::debug!("closed {}", self.summary);
        }
    }

    fn describe(&self) -> String {
        self.summary.clone()
    }
}

impl Drop for SerialChannel {
    fn drop(&mut self) {
        self.close();
    }
}
