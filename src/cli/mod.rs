//! CLI Module
//!
//! Argument parsing and resolution into [`Settings`]. The core never
//! touches clap; everything downstream of here works from the resolved
//! configuration.

pub mod exit_codes;

pub use exit_codes::{channel_exit_code, session_exit_code, ExitCodes};

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use crate::config::{ConfigError, FileConfig, Parity, Preset, SerialSettings, Settings, StopBits};

/// Default pause after each scripted command, in milliseconds.
const DEFAULT_DELAY_MS: u64 = 1_000;
/// Default transcript rotation threshold, in megabytes.
const DEFAULT_MAX_LOG_MB: u64 = 10;
/// Default transcript entries buffered between flushes.
const DEFAULT_FLUSH_EVERY: usize = 50;

/// Serial port commander: play command files, type interactively, or just
/// listen, with an annotated transcript of everything on the wire.
#[derive(Parser, Debug)]
#[command(name = "sercom", version, about)]
pub struct Args {
    /// Serial port name (e.g. COM3 or /dev/ttyUSB0)
    #[arg(short, long, env = "SERCOM_PORT")]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Parity scheme
    #[arg(long, value_enum)]
    pub parity: Option<Parity>,

    /// Data bits per character (5-8)
    #[arg(long)]
    pub data_bits: Option<u8>,

    /// Stop bits
    #[arg(long, value_enum)]
    pub stop_bits: Option<StopBits>,

    /// Apply a named parameter bundle (overrides the other line flags)
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// Command file to play after connecting
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub command_file: Option<PathBuf>,

    /// Pause after each scripted command, in milliseconds
    #[arg(short, long, value_name = "MS")]
    pub delay: Option<u64>,

    /// Replay the command file until interrupted
    #[arg(short, long)]
    pub recursive: bool,

    /// Interactive manual entry (Esc to leave)
    #[arg(short, long)]
    pub interactive: bool,

    /// Write a session transcript to this file
    #[arg(short, long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Rotate the transcript when it exceeds this size, in megabytes
    #[arg(long, value_name = "MB")]
    pub max_log_size: Option<u64>,

    /// Set the terminal window title
    #[arg(long)]
    pub title: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// List available serial ports and exit
    #[arg(long)]
    pub list_ports: bool,
}

impl Args {
    /// Resolve flags over file defaults, then apply the preset on top.
    pub fn resolve(&self, file: &FileConfig) -> Result<Settings, ConfigError> {
        let mut serial = SerialSettings::default();

        if let Some(port) = &file.port {
            serial.port = port.clone();
        }
        if let Some(baud) = file.baud {
            serial.baud = baud;
        }
        if let Some(bits) = file.data_bits {
            serial.data_bits = bits;
        }
        if let Some(parity) = file.parity {
            serial.parity = parity;
        }
        if let Some(stop_bits) = file.stop_bits {
            serial.stop_bits = stop_bits;
        }
        if let Some(ms) = file.read_timeout_ms {
            serial.read_timeout = Duration::from_millis(ms);
        }

        if let Some(port) = &self.port {
            serial.port = port.clone();
        }
        if let Some(baud) = self.baud {
            serial.baud = baud;
        }
        if let Some(bits) = self.data_bits {
            serial.data_bits = bits;
        }
        if let Some(parity) = self.parity {
            serial.parity = parity;
        }
        if let Some(stop_bits) = self.stop_bits {
            serial.stop_bits = stop_bits;
        }

        if let Some(preset) = self.preset {
            preset.apply(&mut serial);
        }
        serial.validate()?;

        let max_log_size_mb = self
            .max_log_size
            .or(file.max_log_size_mb)
            .unwrap_or(DEFAULT_MAX_LOG_MB);
        if max_log_size_mb == 0 {
            return Err(ConfigError::LogSize);
        }

        Ok(Settings {
            serial,
            command_file: self.command_file.clone(),
            delay: Duration::from_millis(
                self.delay.or(file.delay_ms).unwrap_or(DEFAULT_DELAY_MS),
            ),
            interactive: self.interactive,
            recursive: self.recursive,
            log_path: self.log.clone(),
            max_log_size_mb,
            flush_every: file.flush_every.unwrap_or(DEFAULT_FLUSH_EVERY).max(1),
            title: self.title.clone(),
            color: !self.no_color,
        })
    }
}

/// Print the serial ports visible on this system.
pub fn print_ports() -> anyhow::Result<()> {
    let ports = serialport::available_ports().context("could not enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(());
    }
    for port in ports {
        match port.port_type {
            serialport::SerialPortType::UsbPort(info) => {
                let product = info.product.as_deref().unwrap_or("USB serial");
                println!("{}  ({})", port.port_name, product);
            }
            _ => println!("{}", port.port_name),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    #[test]
    fn defaults_fill_everything_but_the_port() {
        let args = parse(&["sercom", "--port", "COM3"]);
        let settings = args.resolve(&FileConfig::default()).unwrap();

        assert_eq!(settings.serial.summary(), "COM3 @ 9600 baud (8N1)");
        assert_eq!(settings.delay, Duration::from_millis(1_000));
        assert_eq!(settings.max_log_size_mb, 10);
        assert!(settings.command_file.is_none());
        assert!(!settings.interactive);
        assert!(!settings.recursive);
        assert!(settings.color);
    }

    #[test]
    fn missing_port_everywhere_is_a_config_error() {
        let args = parse(&["sercom"]);
        assert!(matches!(
            args.resolve(&FileConfig::default()),
            Err(ConfigError::MissingPort)
        ));
    }

    #[test]
    fn flags_override_file_defaults() {
        let file = FileConfig {
            port: Some("/dev/ttyS0".to_string()),
            baud: Some(19_200),
            delay_ms: Some(250),
            ..FileConfig::default()
        };
        let args = parse(&["sercom", "--port", "/dev/ttyUSB1", "--baud", "57600"]);
        let settings = args.resolve(&file).unwrap();

        assert_eq!(settings.serial.port, "/dev/ttyUSB1");
        assert_eq!(settings.serial.baud, 57_600);
        // Unflagged values still come from the file.
        assert_eq!(settings.delay, Duration::from_millis(250));
    }

    #[test]
    fn preset_overrides_explicit_line_flags() {
        let args = parse(&[
            "sercom",
            "--port",
            "COM7",
            "--baud",
            "115200",
            "--parity",
            "odd",
            "--preset",
            "energy-meter",
        ]);
        let settings = args.resolve(&FileConfig::default()).unwrap();

        assert_eq!(settings.serial.baud, 9_600);
        assert_eq!(settings.serial.data_bits, 7);
        assert_eq!(settings.serial.parity, Parity::Even);
        assert_eq!(settings.serial.stop_bits, StopBits::One);
    }

    #[test]
    fn mark_parity_is_accepted_by_the_grammar_but_rejected_at_resolution() {
        let args = parse(&["sercom", "--port", "COM3", "--parity", "mark"]);
        assert!(matches!(
            args.resolve(&FileConfig::default()),
            Err(ConfigError::Parity(Parity::Mark))
        ));
    }

    #[test]
    fn fractional_stop_bits_are_rejected_at_resolution() {
        let args = parse(&["sercom", "--port", "COM3", "--stop-bits", "1.5"]);
        assert!(matches!(
            args.resolve(&FileConfig::default()),
            Err(ConfigError::StopBits(StopBits::OnePointFive))
        ));
    }

    #[test]
    fn zero_rotation_limit_is_rejected() {
        let args = parse(&["sercom", "--port", "COM3", "--max-log-size", "0"]);
        assert!(matches!(
            args.resolve(&FileConfig::default()),
            Err(ConfigError::LogSize)
        ));
    }

    #[test]
    fn playback_flags_parse_together() {
        let args = parse(&[
            "sercom", "-p", "COM3", "-f", "cmds.txt", "-d", "500", "-r", "-l", "out.log",
        ]);
        let settings = args.resolve(&FileConfig::default()).unwrap();

        assert_eq!(settings.command_file, Some(PathBuf::from("cmds.txt")));
        assert_eq!(settings.delay, Duration::from_millis(500));
        assert!(settings.recursive);
        assert_eq!(settings.log_path, Some(PathBuf::from("out.log")));
    }

    #[test]
    fn unknown_preset_is_rejected_by_the_grammar() {
        assert!(Args::try_parse_from(["sercom", "--preset", "toaster"]).is_err());
    }
}
