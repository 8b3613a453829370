//! Canonical PARA taxonomy and target paths.
//!
//! # Responsibility
//! - Name the five fixed top-level vault folders.
//! - Represent a normalized, vault-relative target folder.
//!
//! # Invariants
//! - `ParaRoot::ALL` order is the rule priority order used by normalization.
//! - Segments are non-empty, trimmed, and never `.`/`..`.

use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// One of the five top-level vault folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParaRoot {
    Inbox,
    Projects,
    Areas,
    Resources,
    Archives,
}

impl ParaRoot {
    /// All roots in normalization priority order.
    pub const ALL: [ParaRoot; 5] = [
        ParaRoot::Inbox,
        ParaRoot::Projects,
        ParaRoot::Areas,
        ParaRoot::Resources,
        ParaRoot::Archives,
    ];

    /// Folder name as it appears on disk.
    pub fn folder_name(self) -> &'static str {
        match self {
            Self::Inbox => "00_Inbox",
            Self::Projects => "01_Projects",
            Self::Areas => "02_Areas",
            Self::Resources => "03_Resources",
            Self::Archives => "04_Archives",
        }
    }

    /// Exact (case-sensitive) lookup by folder name.
    pub fn from_folder_name(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|root| root.folder_name() == value)
    }
}

impl Display for ParaRoot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Normalized vault-relative folder a note is written into.
///
/// Built by [`crate::normalize::normalize`]; the first segment is a
/// [`ParaRoot`] for every suggestion carrying a recognizable category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPath {
    segments: Vec<String>,
}

impl CanonicalPath {
    /// Path holding only the inbox root.
    pub fn inbox() -> Self {
        Self::from_root(ParaRoot::Inbox)
    }

    /// Path holding only `root`.
    pub fn from_root(root: ParaRoot) -> Self {
        Self {
            segments: vec![root.folder_name().to_string()],
        }
    }

    /// Wraps already-normalized segments. Falls back to the inbox when empty.
    pub(crate) fn from_segments(segments: Vec<String>) -> Self {
        if segments.is_empty() {
            return Self::inbox();
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Canonical root of the first segment, if it is one.
    pub fn root(&self) -> Option<ParaRoot> {
        self.segments
            .first()
            .and_then(|first| ParaRoot::from_folder_name(first))
    }

    /// Number of `/` separators in the joined path.
    pub fn depth(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    /// Segments joined with `/`.
    pub fn as_path_string(&self) -> String {
        self.segments.join("/")
    }

    /// Platform path relative to the vault root.
    pub fn to_relative_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

impl Display for CanonicalPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_path_string())
    }
}

impl Serialize for CanonicalPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_path_string())
    }
}
