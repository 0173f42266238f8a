//! Podium logging.
//!
//! Two pieces live here: a minimal backend for the `log` facade controlled by
//! the `PODIUM_LOG_LEVEL` environment variable, and channelled file writers
//! for the access, SQL and admin logs. A [`LogWriter`] is opened at the start
//! of a request (or admin operation), collects lines, and persists them when
//! closed. In delayed mode lines are buffered in memory and written in one
//! append on `close`; otherwise each line is appended immediately.
//!
//! ```
//! use podium_log::{LogChannel, LogWriter};
//!
//! let dir = std::env::temp_dir().join("podium-log-doc");
//! let writer = LogWriter::open(&dir, LogChannel::Access, true).unwrap();
//! writer.write("GET /welcome").unwrap();
//! writer.close().unwrap();
//! ```

use chrono::Local;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Log channels, one file series per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogChannel {
    /// Request access log
    Access,
    /// SQL statement log
    Sql,
    /// Admin operation log
    Admin,
}

impl LogChannel {
    /// File name stem for this channel.
    pub fn file_stem(&self) -> &'static str {
        match self {
            LogChannel::Access => "access",
            LogChannel::Sql => "sql",
            LogChannel::Admin => "admin",
        }
    }
}

/// Appending file writer for one log channel.
///
/// Files are dated (`access-20250101.log`) and live under a shared log
/// directory. Writers are cheap to open; the file itself is only touched when
/// lines are persisted. Buffered lines are flushed on [`close`](Self::close)
/// and on drop, so a request that fails mid-lifecycle still keeps its log.
pub struct LogWriter {
    channel: LogChannel,
    path: PathBuf,
    delayed: bool,
    buffer: Mutex<Vec<String>>,
}

impl LogWriter {
    /// Open a writer for `channel` under `dir`, creating the directory if
    /// needed. With `delayed` set, lines accumulate in memory until `close`.
    pub fn open(
        dir: impl AsRef<Path>,
        channel: LogChannel,
        delayed: bool,
    ) -> std::io::Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        let name = format!(
            "{}-{}.log",
            channel.file_stem(),
            Local::now().format("%Y%m%d")
        );
        Ok(Self {
            channel,
            path: dir.as_ref().join(name),
            delayed,
            buffer: Mutex::new(Vec::new()),
        })
    }

    /// The channel this writer serves.
    pub fn channel(&self) -> LogChannel {
        self.channel
    }

    /// The file this writer appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a line, timestamped.
    pub fn write(&self, line: impl AsRef<str>) -> std::io::Result<()> {
        let stamped = format!(
            "[{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            line.as_ref()
        );
        if self.delayed {
            self.buffer.lock().push(stamped);
            Ok(())
        } else {
            self.append(&[stamped])
        }
    }

    fn append(&self, lines: &[String]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        for line in lines {
            writeln!(file, "{line}")?;
        }
        Ok(())
    }

    /// Persist any buffered lines.
    pub fn flush(&self) -> std::io::Result<()> {
        let drained: Vec<String> = {
            let mut buffer = self.buffer.lock();
            std::mem::take(&mut *buffer)
        };
        if drained.is_empty() {
            return Ok(());
        }
        self.append(&drained)
    }

    /// Flush and consume the writer.
    pub fn close(self) -> std::io::Result<()> {
        self.flush()
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

// ============================================================================
// `log` facade backend
// ============================================================================

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!(
            "[{}] {:5} {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: Lazy<StderrLogger> = Lazy::new(|| StderrLogger);

fn level_from_env() -> log::LevelFilter {
    match env::var("PODIUM_LOG_LEVEL")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "warn" | "warning" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "off" | "none" => log::LevelFilter::Off,
        _ => log::LevelFilter::Info,
    }
}

/// Install the stderr backend for the `log` facade.
///
/// Level comes from `PODIUM_LOG_LEVEL` (`trace`..`off`, default `info`).
/// Safe to call more than once; later calls only adjust the level.
pub fn init() {
    let level = level_from_env();
    if log::set_logger(&*LOGGER).is_ok() {
        log::set_max_level(level);
    } else {
        log::set_max_level(level);
    }
}
