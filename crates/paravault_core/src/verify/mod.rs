//! Post-write verification of migrated notes.
//!
//! # Responsibility
//! - Check that a written artifact exists, is not truncated, and sits under a
//!   canonical PARA root.
//!
//! # Invariants
//! - Verification never fails; problems become report warnings.

pub mod verifier;

pub use verifier::{VerificationReport, Verifier};
