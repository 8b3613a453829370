//! Sequential processing of live triggers.

use super::inbox_watcher::TriggerEvent;
use crate::classify::Classifier;
use crate::service::{MigrationError, MigrationService, NoteOutcome};
use crate::vault::store::is_note_path;
use crate::vault::CollisionPolicy;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Consumes triggers one at a time and migrates each note.
pub struct LiveRunner<'a, C: Classifier> {
    service: &'a MigrationService<C>,
    settle_delay: Duration,
    remove_source_on_success: bool,
    /// Artifacts written into a watched folder whose own notification has
    /// not arrived yet. Each entry is dropped when that notification is seen.
    written: HashSet<PathBuf>,
}

impl<'a, C: Classifier> LiveRunner<'a, C> {
    pub fn new(service: &'a MigrationService<C>, settle_delay: Duration) -> Self {
        Self {
            service,
            settle_delay,
            remove_source_on_success: false,
            written: HashSet::new(),
        }
    }

    /// Deletes the source note after a verified migration.
    pub fn remove_source_on_success(mut self, enabled: bool) -> Self {
        self.remove_source_on_success = enabled;
        self
    }

    /// Processes triggers until every sender is dropped.
    ///
    /// Returns the number of notes that reached a terminal state.
    pub fn run(&mut self, triggers: Receiver<TriggerEvent>) -> Result<usize, MigrationError> {
        let mut processed = 0;
        for trigger in triggers.iter() {
            if self.handle_trigger(&trigger)?.is_some() {
                processed += 1;
            }
        }
        info!("event=live_stop module=watch status=ok processed={processed}");
        Ok(processed)
    }

    /// Handles one trigger. `None` means the trigger was ignored.
    pub fn handle_trigger(
        &mut self,
        trigger: &TriggerEvent,
    ) -> Result<Option<NoteOutcome>, MigrationError> {
        if !is_note_path(&trigger.path) || self.written.remove(&identity(&trigger.path)) {
            debug!(
                "event=trigger module=watch status=skip path={}",
                trigger.path.display()
            );
            return Ok(None);
        }

        info!(
            "event=trigger module=watch status=start kind={:?} path={}",
            trigger.kind,
            trigger.path.display()
        );
        if !self.settle_delay.is_zero() {
            std::thread::sleep(self.settle_delay);
        }
        if !trigger.path.is_file() {
            debug!(
                "event=trigger module=watch status=skip reason=vanished path={}",
                trigger.path.display()
            );
            return Ok(None);
        }

        let watched_dir = trigger.path.parent().map(identity);
        let outcome = self
            .service
            .process_note(&trigger.path, CollisionPolicy::SuffixIncrement)?;
        if let Some(written_path) = &outcome.written_path {
            let written_id = identity(written_path);
            if written_id.parent() == watched_dir.as_deref() {
                self.written.insert(written_id);
            }
            if outcome.succeeded()
                && self.remove_source_on_success
                && identity(written_path) != identity(&trigger.path)
            {
                if let Err(err) = std::fs::remove_file(&trigger.path) {
                    warn!(
                        "event=source_remove module=watch status=error path={} error={}",
                        trigger.path.display(),
                        err
                    );
                }
            }
        }
        Ok(Some(outcome))
    }
}

fn identity(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
