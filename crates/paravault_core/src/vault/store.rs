//! Destination claiming, atomic writes and backlog scanning.

use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::{DirEntry, WalkDir};

const NOTE_EXTENSION: &str = "md";
const SKIPPED_BACKLOG_DIRS: &[&str] = &["Files", "notebooks"];
const MAX_SUFFIX_ATTEMPTS: u32 = 10_000;

/// What to do when the destination name is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Leave the existing file alone and report the note as skipped.
    SkipExisting,
    /// Try `name_1.ext`, `name_2.ext`, ... until a free name is claimed.
    SuffixIncrement,
}

/// Result of a destination claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The full note now exists at this path.
    Written(PathBuf),
    /// The destination already existed under `SkipExisting`.
    Occupied(PathBuf),
}

/// Vault I/O errors.
#[derive(Debug)]
pub enum VaultError {
    InvalidFileName(String),
    SuffixesExhausted(PathBuf),
    Io { path: PathBuf, source: std::io::Error },
}

impl VaultError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for VaultError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFileName(name) => write!(f, "invalid note file name: `{name}`"),
            Self::SuffixesExhausted(path) => {
                write!(f, "no free destination name near `{}`", path.display())
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl Error for VaultError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Writes `content` to a free destination for `file_name` inside `dir`.
///
/// Creates `dir` when missing. Content is staged in a synced sibling temp
/// file and hard-linked to the destination, so a destination name never
/// exists without its full content and two callers can never both receive
/// `Written` for the same path.
pub fn claim_destination(
    dir: &Path,
    file_name: &str,
    content: &str,
    policy: CollisionPolicy,
) -> Result<Claim, VaultError> {
    if Path::new(file_name).file_name().and_then(|name| name.to_str()) != Some(file_name) {
        return Err(VaultError::InvalidFileName(file_name.to_string()));
    }
    std::fs::create_dir_all(dir).map_err(|err| VaultError::io(dir, err))?;

    let staged = stage(dir, file_name, content)?;
    let claim = link_free_name(&staged, dir, file_name, policy);
    if let Err(err) = std::fs::remove_file(&staged) {
        warn!(
            "event=stage_cleanup module=vault status=error path={} error={}",
            staged.display(),
            err
        );
    }
    claim
}

fn stage(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, VaultError> {
    let staged = dir.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));
    let written = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&staged)
        .and_then(|mut file| {
            file.write_all(content.as_bytes())?;
            file.sync_all()
        });
    if let Err(err) = written {
        let _ = std::fs::remove_file(&staged);
        return Err(VaultError::io(&staged, err));
    }
    Ok(staged)
}

fn link_free_name(
    staged: &Path,
    dir: &Path,
    file_name: &str,
    policy: CollisionPolicy,
) -> Result<Claim, VaultError> {
    let preferred = dir.join(file_name);
    if try_link(staged, &preferred)? {
        return Ok(Claim::Written(preferred));
    }

    match policy {
        CollisionPolicy::SkipExisting => {
            debug!(
                "event=claim module=vault status=skip path={}",
                preferred.display()
            );
            Ok(Claim::Occupied(preferred))
        }
        CollisionPolicy::SuffixIncrement => {
            let stem = Path::new(file_name)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or(file_name);
            let extension = Path::new(file_name)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| format!(".{ext}"))
                .unwrap_or_default();

            for counter in 1..=MAX_SUFFIX_ATTEMPTS {
                let candidate = dir.join(format!("{stem}_{counter}{extension}"));
                if try_link(staged, &candidate)? {
                    return Ok(Claim::Written(candidate));
                }
            }
            Err(VaultError::SuffixesExhausted(preferred))
        }
    }
}

fn try_link(staged: &Path, path: &Path) -> Result<bool, VaultError> {
    match std::fs::hard_link(staged, path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(VaultError::io(path, err)),
    }
}

/// Lists every markdown note under `inbox`, sorted by path.
///
/// Asset (`Files/`) and duplicate-export (`notebooks/`) folders are skipped.
pub fn scan_backlog(inbox: &Path) -> Result<Vec<PathBuf>, VaultError> {
    if !inbox.is_dir() {
        return Err(VaultError::io(
            inbox,
            std::io::Error::new(ErrorKind::NotFound, "backlog directory does not exist"),
        ));
    }

    let mut notes = Vec::new();
    for entry in WalkDir::new(inbox)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("event=backlog_scan module=vault status=error error={err}");
                continue;
            }
        };
        if entry.file_type().is_file() && is_note_path(entry.path()) {
            notes.push(entry.into_path());
        }
    }
    notes.sort();
    Ok(notes)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_BACKLOG_DIRS.contains(&name))
}

/// True for paths with the note file extension.
pub fn is_note_path(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(NOTE_EXTENSION)
}
