//! Resolved runtime settings
//!
//! Everything the session needs, validated before any port is touched.
//! Parity, stop bits, and presets live here so the CLI, the config file,
//! and the channel all speak the same vocabulary.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;

/// Configuration mistakes caught before the port opens.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No port name from any layer.
    #[error("no serial port specified (use --port, SERCOM_PORT, or the config file)")]
    MissingPort,
    /// Baud rate of zero.
    #[error("baud rate must be greater than zero")]
    Baud,
    /// Data bits outside what the driver supports.
    #[error("unsupported data bits: {0} (supported: 5-8)")]
    DataBits(u8),
    /// Parity scheme the driver cannot express.
    #[error("{0} parity is not supported by the serial driver")]
    Parity(Parity),
    /// Stop-bit count the driver cannot express.
    #[error("{0} stop bits are not supported by the serial driver")]
    StopBits(StopBits),
    /// Log rotation limit of zero.
    #[error("max log size must be at least 1 MB")]
    LogSize,
    /// Config file exists but cannot be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid TOML.
    #[error("malformed config file {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: toml::de::Error,
    },
}

/// Parity bit scheme.
///
/// Mark and space are accepted by the grammar for completeness but
/// rejected at validation: the serial driver cannot express them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    /// No parity bit.
    #[default]
    None,
    /// Even parity.
    Even,
    /// Odd parity.
    Odd,
    /// Parity bit always one.
    Mark,
    /// Parity bit always zero.
    Space,
}

impl Parity {
    /// Single-letter form used in connection summaries, e.g. the `N` in
    /// `8N1`.
    pub fn letter(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
            Parity::Mark => 'M',
            Parity::Space => 'S',
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Parity::None => "none",
            Parity::Even => "even",
            Parity::Odd => "odd",
            Parity::Mark => "mark",
            Parity::Space => "space",
        };
        write!(f, "{name}")
    }
}

/// Stop bits per character.
///
/// 1.5 stop bits is accepted by the grammar but rejected at validation,
/// same as mark and space parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
pub enum StopBits {
    /// One stop bit.
    #[default]
    #[value(name = "1")]
    #[serde(rename = "1")]
    One,
    /// One and a half stop bits.
    #[value(name = "1.5")]
    #[serde(rename = "1.5")]
    OnePointFive,
    /// Two stop bits.
    #[value(name = "2")]
    #[serde(rename = "2")]
    Two,
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StopBits::One => "1",
            StopBits::OnePointFive => "1.5",
            StopBits::Two => "2",
        };
        write!(f, "{name}")
    }
}

/// Named parameter bundles for common targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Passive line tap at 115200 8N1.
    Sniffer,
    /// IEC-style metering head at 9600 7E1.
    EnergyMeter,
    /// RF gateway at 9600 8N1.
    RfEgypt,
    /// Plain 9600 8N1.
    Default,
}

impl Preset {
    /// Overwrite the port parameters with this preset's bundle. The port
    /// name and everything outside the line parameters stay untouched.
    pub fn apply(self, serial: &mut SerialSettings) {
        let (baud, data_bits, parity, stop_bits) = match self {
            Preset::Sniffer => (115_200, 8, Parity::None, StopBits::One),
            Preset::EnergyMeter => (9_600, 7, Parity::Even, StopBits::One),
            Preset::RfEgypt => (9_600, 8, Parity::None, StopBits::One),
            Preset::Default => (9_600, 8, Parity::None, StopBits::One),
        };
        serial.baud = baud;
        serial.data_bits = data_bits;
        serial.parity = parity;
        serial.stop_bits = stop_bits;
    }
}

/// Parameters for one serial connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    /// Port name, e.g. `COM3` or `/dev/ttyUSB0`.
    pub port: String,
    /// Baud rate.
    pub baud: u32,
    /// Data bits per character (5-8).
    pub data_bits: u8,
    /// Parity scheme.
    pub parity: Parity,
    /// Stop bits.
    pub stop_bits: StopBits,
    /// Read timeout bounding one drain.
    pub read_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud: 9_600,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: StopBits::One,
            read_timeout: Duration::from_millis(100),
        }
    }
}

impl SerialSettings {
    /// Reject combinations the serial driver cannot express, before
    /// anything is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port.is_empty() {
            return Err(ConfigError::MissingPort);
        }
        if self.baud == 0 {
            return Err(ConfigError::Baud);
        }
        if !(5..=8).contains(&self.data_bits) {
            return Err(ConfigError::DataBits(self.data_bits));
        }
        if matches!(self.parity, Parity::Mark | Parity::Space) {
            return Err(ConfigError::Parity(self.parity));
        }
        if self.stop_bits == StopBits::OnePointFive {
            return Err(ConfigError::StopBits(self.stop_bits));
        }
        Ok(())
    }

    /// `PORT @ BAUD baud (8N1)`-style connection summary.
    pub fn summary(&self) -> String {
        format!(
            "{} @ {} baud ({}{}{})",
            self.port,
            self.baud,
            self.data_bits,
            self.parity.letter(),
            self.stop_bits
        )
    }
}

/// Fully resolved runtime settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Connection parameters.
    pub serial: SerialSettings,
    /// Command file to play, if any.
    pub command_file: Option<PathBuf>,
    /// Pause after each scripted command.
    pub delay: Duration,
    /// Start in interactive entry instead of listen.
    pub interactive: bool,
    /// Replay the command file forever.
    pub recursive: bool,
    /// Transcript destination, if logging was requested.
    pub log_path: Option<PathBuf>,
    /// Transcript rotation threshold in megabytes.
    pub max_log_size_mb: u64,
    /// Transcript entries buffered between flushes.
    pub flush_every: usize,
    /// Terminal title override.
    pub title: Option<String>,
    /// Colored console output.
    pub color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_9600_8n1() {
        let serial = SerialSettings::default();
        assert_eq!(serial.baud, 9_600);
        assert_eq!(serial.data_bits, 8);
        assert_eq!(serial.parity, Parity::None);
        assert_eq!(serial.stop_bits, StopBits::One);
    }

    #[test]
    fn validate_requires_a_port() {
        let serial = SerialSettings::default();
        assert!(matches!(serial.validate(), Err(ConfigError::MissingPort)));
    }

    #[test]
    fn validate_rejects_driver_gaps() {
        let base = SerialSettings {
            port: "COM3".to_string(),
            ..SerialSettings::default()
        };

        let mark = SerialSettings {
            parity: Parity::Mark,
            ..base.clone()
        };
        assert!(matches!(mark.validate(), Err(ConfigError::Parity(_))));

        let space = SerialSettings {
            parity: Parity::Space,
            ..base.clone()
        };
        assert!(matches!(space.validate(), Err(ConfigError::Parity(_))));

        let halves = SerialSettings {
            stop_bits: StopBits::OnePointFive,
            ..base.clone()
        };
        assert!(matches!(halves.validate(), Err(ConfigError::StopBits(_))));

        let nine = SerialSettings {
            data_bits: 9,
            ..base.clone()
        };
        assert!(matches!(nine.validate(), Err(ConfigError::DataBits(9))));

        assert!(base.validate().is_ok());
    }

    #[test]
    fn energy_meter_preset_pins_7e1() {
        let mut serial = SerialSettings {
            port: "COM7".to_string(),
            baud: 115_200,
            ..SerialSettings::default()
        };
        Preset::EnergyMeter.apply(&mut serial);

        assert_eq!(serial.port, "COM7");
        assert_eq!(serial.baud, 9_600);
        assert_eq!(serial.data_bits, 7);
        assert_eq!(serial.parity, Parity::Even);
        assert_eq!(serial.stop_bits, StopBits::One);
        assert_eq!(serial.summary(), "COM7 @ 9600 baud (7E1)");
    }

    #[test]
    fn summary_spells_out_the_frame() {
        let serial = SerialSettings {
            port: "/dev/ttyUSB0".to_string(),
            baud: 115_200,
            parity: Parity::Odd,
            stop_bits: StopBits::Two,
            ..SerialSettings::default()
        };
        assert_eq!(serial.summary(), "/dev/ttyUSB0 @ 115200 baud (8O2)");
    }
}
