//! Append-only migration audit trail.
//!
//! # Responsibility
//! - Record one structured JSON line per terminal note outcome.
//!
//! # Invariants
//! - One log file per processing session; lines are never rewritten.
//! - The file is opened and closed around every append so external readers
//!   never observe a partial line.

pub mod session_log;

pub use session_log::{AuditError, AuditEvent, AuditKind, AuditLog};
