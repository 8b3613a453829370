//! Artifact integrity and placement checks.

use crate::model::canonical_path::ParaRoot;
use log::{debug, warn};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Outcome of verifying one written note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub exists: bool,
    pub valid_folder: bool,
    pub has_content: bool,
    /// Advisory findings, in check order.
    pub warnings: Vec<String>,
}

impl VerificationReport {
    /// True when every check passed.
    pub fn passed(&self) -> bool {
        self.exists && self.valid_folder && self.has_content
    }
}

/// Inspects artifacts relative to one vault root.
#[derive(Debug, Clone)]
pub struct Verifier {
    vault_root: PathBuf,
    min_content_bytes: u64,
}

impl Verifier {
    pub fn new(vault_root: impl Into<PathBuf>, min_content_bytes: u64) -> Self {
        Self {
            vault_root: vault_root.into(),
            min_content_bytes,
        }
    }

    /// Verifies the artifact at `target_path` written for `note_id`.
    pub fn verify(&self, target_path: &Path, note_id: &str) -> VerificationReport {
        let mut report = VerificationReport::default();

        match std::fs::metadata(target_path) {
            Ok(metadata) => {
                report.exists = true;
                if metadata.len() > self.min_content_bytes {
                    report.has_content = true;
                } else {
                    report.warnings.push(format!(
                        "File is suspiciously small ({} bytes, possible data loss).",
                        metadata.len()
                    ));
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                report.warnings.push("File is missing after write.".to_string());
            }
            Err(err) => {
                report
                    .warnings
                    .push(format!("Failed to inspect file metadata: {err}"));
            }
        }

        match self.root_folder(target_path) {
            Some(folder) if ParaRoot::from_folder_name(&folder).is_some() => {
                report.valid_folder = true;
            }
            Some(folder) => report
                .warnings
                .push(format!("Folder '{folder}' is not a standard PARA category.")),
            None => report.warnings.push(format!(
                "Target '{}' is outside the vault root.",
                target_path.display()
            )),
        }

        if report.exists {
            if let Err(err) = std::fs::read_to_string(target_path) {
                report
                    .warnings
                    .push(format!("Failed to read file for content check: {err}"));
            }
        }

        if report.passed() {
            debug!("event=verify module=verify status=ok note={note_id}");
        } else {
            warn!(
                "event=verify module=verify status=shortfall note={} exists={} valid_folder={} has_content={} warnings={}",
                note_id,
                report.exists,
                report.valid_folder,
                report.has_content,
                report.warnings.len()
            );
        }
        report
    }

    fn root_folder(&self, target_path: &Path) -> Option<String> {
        let relative = target_path.strip_prefix(&self.vault_root).ok()?;
        match relative.components().next()? {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}
