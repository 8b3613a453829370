//! Live-trigger mode.
//!
//! # Responsibility
//! - Turn file-system notifications into note triggers.
//! - Process triggered notes one at a time after a settling delay.
//!
//! # Invariants
//! - Only `.md` paths become triggers.
//! - Triggers are consumed sequentially from one channel; there is a single
//!   writer per vault.

pub mod inbox_watcher;
pub mod live_runner;

pub use inbox_watcher::{triggers_from_event, InboxWatcher, TriggerEvent, TriggerKind, WatchError};
pub use live_runner::LiveRunner;
