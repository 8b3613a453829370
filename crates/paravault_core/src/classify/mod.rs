//! Classification boundary.
//!
//! # Responsibility
//! - Define the contract every classification backend satisfies.
//! - Map transport and payload failures onto one error type.
//!
//! # Invariants
//! - A backend returns either a complete `Classification` or an error, never
//!   a partially parsed result.
//! - Backends do not retry; retry policy belongs to the caller.

pub mod ollama;

use crate::model::note::Classification;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use ollama::{parse_generate_response, OllamaClassifier, NOTE_CONTENT_PLACEHOLDER};

/// Why a classification is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    /// Connection, DNS, TLS or body read failure.
    Transport(String),
    /// The bounded request timeout elapsed.
    Timeout,
    /// Service answered with a non-success HTTP status.
    Status(u16),
    /// Payload present but not the expected JSON shape.
    Malformed(String),
}

impl Display for ClassifierError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(details) => write!(f, "classifier transport error: {details}"),
            Self::Timeout => write!(f, "classifier request timed out"),
            Self::Status(code) => write!(f, "classifier returned status {code}"),
            Self::Malformed(details) => write!(f, "malformed classification: {details}"),
        }
    }
}

impl Error for ClassifierError {}

/// Classifies note text into a folder suggestion plus frontmatter.
pub trait Classifier {
    /// Classifies one note body.
    fn classify(&self, note_text: &str) -> Result<Classification, ClassifierError>;
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn classify(&self, note_text: &str) -> Result<Classification, ClassifierError> {
        (**self).classify(note_text)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&self, note_text: &str) -> Result<Classification, ClassifierError> {
        (**self).classify(note_text)
    }
}
