//! JSONL session log.

use crate::verify::VerificationReport;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_SESSION_SUFFIX: u32 = 1_000;

/// Audit line category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditKind {
    Success,
    Warning,
    Error,
}

/// One terminal note outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Local>,
    #[serde(rename = "type")]
    pub kind: AuditKind,
    pub filename: String,
    /// Canonical target folder; `None` when the note failed before routing.
    pub target: Option<String>,
    /// Elapsed seconds, rounded to two decimals.
    pub time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<VerificationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditEvent {
    pub fn new(
        kind: AuditKind,
        filename: impl Into<String>,
        target: Option<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
            filename: filename.into(),
            target,
            time: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
            report: None,
            error: None,
        }
    }

    pub fn with_report(mut self, report: VerificationReport) -> Self {
        self.report = Some(report);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Audit log failures. These are the only fatal errors of a run.
#[derive(Debug)]
pub enum AuditError {
    Io(PathBuf, std::io::Error),
    Serialize(serde_json::Error),
}

impl Display for AuditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, err) => write!(f, "audit log `{}`: {err}", path.display()),
            Self::Serialize(err) => write!(f, "audit event serialization failed: {err}"),
        }
    }
}

impl Error for AuditError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(_, err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

/// Handle to one session's JSONL file.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Creates `dir` and a fresh `migration_YYYYMMDD_HHMMSS.jsonl` session file.
    ///
    /// Sessions started within the same second get `_1`, `_2`, ... suffixes.
    ///
    /// # Errors
    /// - `Io` when the directory or file cannot be created.
    pub fn create(dir: &Path) -> Result<Self, AuditError> {
        std::fs::create_dir_all(dir).map_err(|err| AuditError::Io(dir.to_path_buf(), err))?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

        for attempt in 0..=MAX_SESSION_SUFFIX {
            let file_name = match attempt {
                0 => format!("migration_{stamp}.jsonl"),
                n => format!("migration_{stamp}_{n}.jsonl"),
            };
            let path = dir.join(file_name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(AuditError::Io(path, err)),
            }
        }
        Err(AuditError::Io(
            dir.to_path_buf(),
            std::io::Error::new(ErrorKind::AlreadyExists, "no free session file name"),
        ))
    }

    /// Uses an explicit session file, creating it if needed.
    pub fn open(path: PathBuf) -> Result<Self, AuditError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| AuditError::Io(path.clone(), err))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one event as a single JSON line.
    pub fn append(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(event).map_err(AuditError::Serialize)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| AuditError::Io(self.path.clone(), err))?;
        file.write_all(line.as_bytes())
            .map_err(|err| AuditError::Io(self.path.clone(), err))
    }
}
