//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate classifier, transformer, vault store and verifier into the
//!   per-note migration pipeline.
//! - Keep CLI/watcher entry points decoupled from pipeline details.

pub mod migration_service;
pub mod note_state;

pub use migration_service::{
    BatchSummary, FailureReason, MigrationError, MigrationService, NoteOutcome, NotePlanner,
    PlannedNote,
};
pub use note_state::NoteState;
