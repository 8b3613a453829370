//! Source note and classifier result models.

use std::io;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Frontmatter used when the classifier omits one.
pub const DEFAULT_FRONTMATTER: &str = "---\n---\n";

/// A free-form markdown note awaiting migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// File name, used as the note identifier and target file name.
    pub id: String,
    /// Raw markdown body as read from disk.
    pub content: String,
    /// Location the note was read from.
    pub origin: PathBuf,
}

impl Note {
    /// Reads a note from `path`.
    ///
    /// # Errors
    /// - `InvalidInput` when `path` has no UTF-8 file name.
    /// - Any read or UTF-8 decoding error from the file system.
    pub fn load(path: &Path) -> io::Result<Self> {
        let id = note_id_for(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("note path has no file name: {}", path.display()),
            )
        })?;
        let content = std::fs::read_to_string(path)?;
        Ok(Self {
            id,
            content,
            origin: path.to_path_buf(),
        })
    }

    /// True when the body holds only whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Note identifier derived from a path's file name, in NFC form.
///
/// Exports from macOS tools carry decomposed Hangul; composing here keeps
/// vault file names and audit lines stable.
pub fn note_id_for(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.nfc().collect())
}

/// Structured classifier output.
///
/// Both fields may be missing from the service payload; accessors apply the
/// documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub suggested_folder: Option<String>,
    pub frontmatter: Option<String>,
}

impl Classification {
    /// Raw folder suggestion, `None` when absent or blank.
    pub fn suggested_folder(&self) -> Option<&str> {
        self.suggested_folder
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    /// Frontmatter block to prepend.
    pub fn frontmatter(&self) -> &str {
        self.frontmatter.as_deref().unwrap_or(DEFAULT_FRONTMATTER)
    }
}

#[cfg(test)]
mod tests {
    use super::{note_id_for, Classification, Note, DEFAULT_FRONTMATTER};
    use std::path::Path;

    #[test]
    fn classification_defaults_apply_for_missing_fields() {
        let classification = Classification::default();
        assert_eq!(classification.suggested_folder(), None);
        assert_eq!(classification.frontmatter(), DEFAULT_FRONTMATTER);

        let blank = Classification {
            suggested_folder: Some("   ".to_string()),
            frontmatter: Some("---\ntitle: x\n---".to_string()),
        };
        assert_eq!(blank.suggested_folder(), None);
        assert_eq!(blank.frontmatter(), "---\ntitle: x\n---");
    }

    #[test]
    fn load_reads_id_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meeting.md");
        std::fs::write(&path, " \n\t").unwrap();

        let note = Note::load(&path).unwrap();
        assert_eq!(note.id, "meeting.md");
        assert_eq!(note.origin, path);
        assert!(note.is_blank());
    }

    #[test]
    fn note_id_composes_decomposed_hangul() {
        let id = note_id_for(Path::new("inbox/\u{1100}\u{1161}\u{11A8}.md")).unwrap();
        assert_eq!(id, "\u{AC01}.md");
        assert_eq!(note_id_for(Path::new("plain.md")).unwrap(), "plain.md");
    }
}
