//! Vault file-system access.
//!
//! # Responsibility
//! - Claim free destination names under one collision policy shared by batch
//!   and live entry points.
//! - Persist note content without exposing partially written files.
//! - Enumerate the migration backlog.
//!
//! # Invariants
//! - Content is staged and synced before the destination name is linked;
//!   the link is the only synchronization point between writers.

pub mod store;

pub use store::{claim_destination, scan_backlog, Claim, CollisionPolicy, VaultError};
