//! Domain model for note migration.
//!
//! # Responsibility
//! - Define the data shapes exchanged between pipeline stages.
//! - Own the fixed PARA taxonomy used by normalization and verification.
//!
//! # Invariants
//! - Source notes are never mutated in place; stages work on owned copies.
//! - A `CanonicalPath` never holds two consecutive case-insensitively equal
//!   segments.

pub mod canonical_path;
pub mod note;
