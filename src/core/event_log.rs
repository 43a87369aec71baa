// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::core::timer::{Started, StopReason, StoppedTimer};
use crate::serror;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const IN_PROGRESS: &str = "В процессе";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogAction {
    Start,
    Stop(StopReason),
}

impl LogAction {
    fn label(self) -> &'static str {
        match self {
            LogAction::Start => "Запуск",
            LogAction::Stop(StopReason::Manual) => "Остановлен",
            LogAction::Stop(StopReason::Expired) => "Истёк",
        }
    }
}

/// One start or stop event. Renders as a single pipe-delimited line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub action: LogAction,
    pub name: String,
    pub started_at: DateTime<Local>,
    pub stopped_at: Option<DateTime<Local>>,
}

impl LogRecord {
    pub fn start(started: &Started) -> Self {
        Self {
            action: LogAction::Start,
            name: started.name.clone(),
            started_at: started.started_at,
            stopped_at: None,
        }
    }

    pub fn stop(stopped: &StoppedTimer) -> Self {
        Self {
            action: LogAction::Stop(stopped.reason),
            name: stopped.name.clone(),
            started_at: stopped.started_at,
            stopped_at: Some(stopped.stopped_at),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | Название: {} | Начало: {} | Окончание: ",
            self.action.label(),
            single_line(&self.name),
            self.started_at.format(TIMESTAMP_FORMAT),
        )?;
        match self.stopped_at {
            Some(at) => write!(f, "{}", at.format(TIMESTAMP_FORMAT)),
            None => f.write_str(IN_PROGRESS),
        }
    }
}

/// Line breaks in a name would split one record across several lines.
fn single_line(name: &str) -> String {
    name.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Append-only sink for start/stop records.
///
/// `append` must not fail the caller: write errors are reported on the
/// diagnostic log and dropped.
pub trait EventLog: Send + Sync {
    fn append(&self, record: &LogRecord);

    /// Whole log for display, or `None` if there is nothing to show.
    fn read_all(&self) -> Option<String>;
}

pub struct FileEventLog {
    path: PathBuf,
}

impl FileEventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        file.flush()
    }
}

impl EventLog for FileEventLog {
    fn append(&self, record: &LogRecord) {
        if let Err(e) = self.write_line(&record.to_string()) {
            serror!(
                "EventLog",
                "failed to append to {}: {}",
                self.path.display(),
                e
            );
        }
    }

    fn read_all(&self) -> Option<String> {
        read_log(&self.path)
    }
}

/// Reads the whole file. Missing, unreadable and empty files are all `None`.
pub fn read_log(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) if !text.is_empty() => Some(text),
        _ => None,
    }
}
