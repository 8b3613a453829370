//! Core logic for migrating free-form notes into a PARA vault.
//! This crate is the single source of truth for routing and rewrite rules.

pub mod audit;
pub mod classify;
pub mod config;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod service;
pub mod transform;
pub mod vault;
pub mod verify;
pub mod watch;

pub use audit::{AuditEvent, AuditKind, AuditLog};
pub use classify::{Classifier, ClassifierError, OllamaClassifier};
pub use config::{ClassifierConfig, ConfigError, MigrationConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::canonical_path::{CanonicalPath, ParaRoot};
pub use model::note::{Classification, Note};
pub use normalize::normalize;
pub use service::{
    BatchSummary, FailureReason, MigrationError, MigrationService, NoteOutcome, NotePlanner,
    NoteState, PlannedNote,
};
pub use transform::{rebase_asset_links, ContentTransformer};
pub use vault::{Claim, CollisionPolicy};
pub use verify::{VerificationReport, Verifier};
pub use watch::{InboxWatcher, LiveRunner, TriggerEvent, TriggerKind};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
