//! `notify`-backed inbox watcher.

use crate::vault::store::is_note_path;
use log::{error, info};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

/// How a note arrived in the watched directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Created,
    MovedIn,
}

/// "Note became available" notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    pub path: PathBuf,
    pub kind: TriggerKind,
}

impl TriggerEvent {
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: TriggerKind::Created,
        }
    }
}

#[derive(Debug)]
pub struct WatchError(notify::Error);

impl Display for WatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "inbox watcher failed: {}", self.0)
    }
}

impl Error for WatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl From<notify::Error> for WatchError {
    fn from(value: notify::Error) -> Self {
        Self(value)
    }
}

/// Keeps a non-recursive watch alive while held.
pub struct InboxWatcher {
    _watcher: RecommendedWatcher,
}

impl InboxWatcher {
    /// Watches `dir` and forwards note triggers into `sender`.
    pub fn start(dir: &Path, sender: Sender<TriggerEvent>) -> Result<Self, WatchError> {
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) => {
                    for trigger in triggers_from_event(&event) {
                        if sender.send(trigger).is_err() {
                            return;
                        }
                    }
                }
                Err(err) => error!("event=watch module=watch status=error error={err}"),
            }
        })?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        info!(
            "event=watch_start module=watch status=ok dir={}",
            dir.display()
        );
        Ok(Self { _watcher: watcher })
    }
}

/// Extracts note triggers from a raw notification.
///
/// Creations trigger on every path; renames trigger on the destination only.
pub fn triggers_from_event(event: &Event) -> Vec<TriggerEvent> {
    let candidates: Vec<(PathBuf, TriggerKind)> = match event.kind {
        EventKind::Create(_) => event
            .paths
            .iter()
            .map(|path| (path.clone(), TriggerKind::Created))
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event
            .paths
            .first()
            .map(|path| vec![(path.clone(), TriggerKind::MovedIn)])
            .unwrap_or_default(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event
            .paths
            .get(1)
            .map(|path| vec![(path.clone(), TriggerKind::MovedIn)])
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    candidates
        .into_iter()
        .filter(|(path, _)| is_note_path(path))
        .map(|(path, kind)| TriggerEvent { path, kind })
        .collect()
}
