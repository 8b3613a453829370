//! Migration configuration.
//!
//! # Responsibility
//! - Load run settings from an optional JSON file with per-field defaults.
//! - Reject settings that would make every note fail.
//!
//! # Invariants
//! - Every field has a default, so `{}` is a valid config file.
//! - `trusted_tags` are lower-cased after load.

use crate::transform::DEFAULT_TRUSTED_TAGS;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
const DEFAULT_MODEL: &str = "gemma3:12b";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;
const DEFAULT_MIN_CONTENT_BYTES: u64 = 10;

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, err) => write!(f, "failed to read config `{}`: {err}", path.display()),
            Self::Parse(path, err) => {
                write!(f, "failed to parse config `{}`: {err}", path.display())
            }
            Self::Invalid(details) => write!(f, "invalid config: {details}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(_, err) => Some(err),
            Self::Parse(_, err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Classification backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Generate endpoint URL.
    pub endpoint: String,
    pub model: String,
    /// Hard bound on one classification request.
    pub timeout_secs: u64,
    /// Prompt template file holding `{{note_content}}`.
    pub prompt_path: Option<PathBuf>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            prompt_path: None,
        }
    }
}

/// Settings for one migration process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Root of the PARA vault notes are written into.
    pub vault_root: PathBuf,
    /// Backlog (batch) or watched (live) directory.
    pub inbox_dir: PathBuf,
    /// Directory holding per-session audit logs.
    pub audit_dir: PathBuf,
    pub classifier: ClassifierConfig,
    /// Inline tags left unescaped.
    pub trusted_tags: Vec<String>,
    /// Wait after a live trigger before reading the note.
    pub settle_delay_ms: u64,
    /// Artifacts at or below this size are flagged as truncated.
    pub min_content_bytes: u64,
    /// Pilot cap on the number of backlog notes processed.
    pub batch_limit: Option<usize>,
    /// Live mode only: delete the source after a verified migration.
    pub remove_source_on_success: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            vault_root: PathBuf::from("Obsidian_Vault"),
            inbox_dir: PathBuf::from("00_Inbox"),
            audit_dir: PathBuf::from("logs"),
            classifier: ClassifierConfig::default(),
            trusted_tags: DEFAULT_TRUSTED_TAGS.iter().map(|tag| tag.to_string()).collect(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            min_content_bytes: DEFAULT_MIN_CONTENT_BYTES,
            batch_limit: None,
            remove_source_on_success: false,
        }
    }
}

impl MigrationConfig {
    /// Reads and validates a JSON config file.
    ///
    /// # Errors
    /// - `Io` / `Parse` when the file cannot be read or decoded.
    /// - `Invalid` when validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config: Self = serde_json::from_str(&raw)
            .map_err(|err| ConfigError::Parse(path.to_path_buf(), err))?;
        config.trusted_tags = config
            .trusted_tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, path) in [
            ("vault_root", &self.vault_root),
            ("inbox_dir", &self.inbox_dir),
            ("audit_dir", &self.audit_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} cannot be empty")));
            }
        }
        if self.classifier.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "classifier.timeout_secs must be positive".to_string(),
            ));
        }
        let endpoint = self.classifier.endpoint.trim();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "classifier.endpoint must be an http(s) URL, got `{endpoint}`"
            )));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
