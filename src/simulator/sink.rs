//! Append-only log sinks for attempt records.

use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

use crate::constants::{LOG_FILE_STAMP_FORMAT, LOG_LINE_TIME_FORMAT};
use crate::error::{Error, Result};

/// Destination for timestamped log lines.
pub trait LogSink {
    fn append(&mut self, line: &str) -> io::Result<()>;
}

/// Append-only log file for one run. Every line is flushed as written.
pub struct FileSink {
    path: PathBuf,
    writer: LineWriter<File>,
}

impl FileSink {
    /// Open the file for appending, creating it (and its parent directory)
    /// if absent. Lines already in the file are kept.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let io_err = |source| Error::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;

        Ok(Self {
            writer: LineWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn append(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", line)
    }
}

/// In-memory sink, mostly for tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogSink for MemorySink {
    fn append(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

/// `<dir>/<program>.<country>_<operator>.<YYYYMMDD_HHMMSS>.log`
pub fn log_file_path(
    dir: &Path,
    program: &str,
    country: &str,
    operator: &str,
    started: DateTime<Local>,
) -> PathBuf {
    dir.join(format!(
        "{}.{}_{}.{}.log",
        program,
        country,
        operator,
        started.format(LOG_FILE_STAMP_FORMAT)
    ))
}

/// Name of the running executable without extension.
pub fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// `<YYYY-MM-DD HH:MM:SS.mmm> - <message>`
pub fn format_log_line(timestamp: DateTime<Local>, message: &str) -> String {
    format!("{} - {}", timestamp.format(LOG_LINE_TIME_FORMAT), message)
}
