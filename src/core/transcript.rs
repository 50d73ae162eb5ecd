//! Rotating session transcript
//!
//! Plain-text record of everything sent and received, with millisecond
//! timestamps. Entries are buffered and written in batches; when the
//! active file outgrows the configured limit it is renamed to a `.bak`
//! and a fresh file continues the session. Once logging is up, failures
//! are reported through tracing and never interrupt the session.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::core::format;

/// Name stamped into the transcript banners.
const PRODUCT: &str = "Sercom";

/// Timestamp format for banners.
const BANNER_STAMP: &str = "%Y-%m-%d %H:%M:%S";
/// Timestamp format for entries, millisecond precision.
const ENTRY_STAMP: &str = "%Y-%m-%d %H:%M:%S%.3f";
/// Timestamp format embedded in rotated file names.
const ROTATE_STAMP: &str = "%Y%m%d_%H%M%S";

/// Direction tag for a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Outbound command.
    Sent,
    /// Inbound data.
    Recv,
    /// Session narrative.
    Info,
    /// Failure worth keeping in the record.
    Error,
}

impl Direction {
    fn tag(self) -> &'static str {
        match self {
            Direction::Sent => "SENT",
            Direction::Recv => "RECV",
            Direction::Info => "INFO",
            Direction::Error => "ERROR",
        }
    }
}

/// Transcript creation failure. These are fatal at startup; everything
/// after creation is swallowed.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// Could not create a parent directory for the log file.
    #[error("cannot create log directory {path}: {source}")]
    CreateDir {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// Could not create or write the log file itself.
    #[error("cannot create log file {path}: {source}")]
    Create {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
}

/// Tuning knobs for the transcript.
#[derive(Debug, Clone)]
pub struct TranscriptConfig {
    /// Rotation threshold in megabytes.
    pub max_size_mb: u64,
    /// Entries buffered before an automatic flush.
    pub flush_every: usize,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            max_size_mb: 10,
            flush_every: 50,
        }
    }
}

/// Owned transcript writer.
#[derive(Debug)]
pub struct Transcript {
    path: PathBuf,
    file: Option<File>,
    buffer: Vec<String>,
    written: u64,
    max_bytes: u64,
    flush_every: usize,
}

impl Transcript {
    /// Create (or truncate) the transcript at `path` and write the session
    /// header. `settings_summary` is recorded under the banner so a log
    /// file is self-describing.
    pub fn create(
        path: PathBuf,
        config: &TranscriptConfig,
        settings_summary: &str,
    ) -> Result<Self, TranscriptError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| TranscriptError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut file = File::create(&path).map_err(|source| TranscriptError::Create {
            path: path.clone(),
            source,
        })?;
        let header = format!(
            "===== {} Log - Started at {} =====\n{}\n",
            PRODUCT,
            Local::now().format(BANNER_STAMP),
            settings_summary
        );
        file.write_all(header.as_bytes())
            .map_err(|source| TranscriptError::Create {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            file: Some(file),
            buffer: Vec::new(),
            written: header.len() as u64,
            max_bytes: config.max_size_mb.saturating_mul(1024 * 1024),
            flush_every: config.flush_every.max(1),
        })
    }

    /// Path of the active log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queue one entry. Flushes automatically once the buffer holds
    /// `flush_every` entries.
    ///
    /// The entry is one line of `[timestamp] [TAG] message`; when `raw`
    /// payload bytes are given they follow on the next line in the plain
    /// control-annotated rendering.
    pub fn append(&mut self, direction: Direction, message: &str, raw: Option<&[u8]>) {
        let mut entry = format!(
            "[{}] [{}] {}",
            Local::now().format(ENTRY_STAMP),
            direction.tag(),
            message
        );
        if let Some(data) = raw {
            entry.push('\n');
            entry.push_str(&format::plain(data));
        }
        entry.push('\n');

        self.buffer.push(entry);
        if self.buffer.len() >= self.flush_every {
            self.flush();
        }
    }

    /// Write buffered entries to disk, rotating first if the active file
    /// is over the size limit. Failures are logged and the batch dropped,
    /// keeping memory bounded.
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        self.rotate_if_needed();

        let batch = self.buffer.concat();
        match self.write_batch(batch.as_bytes()) {
            Ok(()) => self.written += batch.len() as u64,
            Err(e) => {
                tracing::warn!(
                    "transcript flush failed, dropping {} entries: {}",
                    self.buffer.len(),
                    e
                );
            }
        }
        self.buffer.clear();
    }

    /// Flush and write the end-of-session banner.
    pub fn finish(&mut self) {
        self.flush();
        if let Some(file) = self.file.as_mut() {
            let footer = format!(
                "===== {} Log - Ended at {} =====\n",
                PRODUCT,
                Local::now().format(BANNER_STAMP)
            );
            if let Err(e) = file.write_all(footer.as_bytes()) {
                tracing::debug!("could not write end-of-session banner: {}", e);
            }
        }
    }

    fn write_batch(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| std::io::Error::other("log file unavailable"))?;
        file.write_all(bytes)
    }

    /// Soft size check: a batch in flight may push the file past the
    /// limit, and the rename happens on the next flush instead.
    fn rotate_if_needed(&mut self) {
        if self.written <= self.max_bytes {
            return;
        }

        let mut rotated = self.path.clone().into_os_string();
        rotated.push(format!(".{}.bak", Local::now().format(ROTATE_STAMP)));
        let rotated = PathBuf::from(rotated);
        if rotated.exists() {
            // Same-second rotation; wait for the next flush.
            tracing::warn!("rotation target {} already exists", rotated.display());
            return;
        }

        // Close the handle before the rename for Windows' sake.
        self.file = None;
        if let Err(e) = fs::rename(&self.path, &rotated) {
            tracing::warn!("log rotation failed: {}", e);
            self.file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(&self.path)
                .ok();
            return;
        }
        tracing::debug!("rotated transcript to {}", rotated.display());

        match File::create(&self.path) {
            Ok(mut file) => {
                let header = format!(
                    "===== {} Log - Continued at {} =====\n",
                    PRODUCT,
                    Local::now().format(BANNER_STAMP)
                );
                self.written = match file.write_all(header.as_bytes()) {
                    Ok(()) => header.len() as u64,
                    Err(_) => 0,
                };
                self.file = Some(file);
            }
            Err(e) => {
                tracing::warn!("could not start a fresh log after rotation: {}", e);
                self.file = None;
                self.written = 0;
            }
        }
    }
}

impl Drop for Transcript {
    fn drop(&mut self) {
        self.flush();
    }
}
