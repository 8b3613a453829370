//! Note migration orchestration.
//!
//! # Responsibility
//! - Drive one note through classify → normalize → transform → write →
//!   verify.
//! - Fan the pipeline out over a sorted backlog snapshot.
//! - Append exactly one audit event per terminal note outcome.
//!
//! # Invariants
//! - Notes are processed strictly sequentially.
//! - Per-note failures never abort a batch; only audit log failures and an
//!   unreadable backlog do.
//! - A written artifact that fails verification is left in place.

use crate::audit::{AuditError, AuditEvent, AuditKind, AuditLog};
use crate::classify::{Classifier, ClassifierError};
use crate::config::MigrationConfig;
use crate::model::canonical_path::CanonicalPath;
use crate::model::note::{note_id_for, Classification, Note};
use crate::normalize::normalize;
use crate::service::note_state::NoteState;
use crate::transform::ContentTransformer;
use crate::vault::{claim_destination, scan_backlog, Claim, CollisionPolicy, VaultError};
use crate::verify::{VerificationReport, Verifier};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Terminal reason a note did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Note body is empty or whitespace only; the classifier is not called.
    EmptyNote,
    /// Classifier produced no usable classification.
    ClassificationFailed(ClassifierError),
    /// Destination already exists under `SkipExisting`.
    TargetExists(PathBuf),
    /// Artifact was written but failed at least one verification check.
    VerificationShortfall,
    /// Unexpected file-system failure.
    Io(String),
}

impl FailureReason {
    /// Audit category recorded for this reason.
    pub fn audit_kind(&self) -> AuditKind {
        match self {
            Self::TargetExists(_) | Self::VerificationShortfall => AuditKind::Warning,
            Self::EmptyNote | Self::ClassificationFailed(_) | Self::Io(_) => AuditKind::Error,
        }
    }

    /// Skipped notes are reported but not counted as failures.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::EmptyNote | Self::TargetExists(_))
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNote => write!(f, "empty file"),
            Self::ClassificationFailed(_) => write!(f, "AI analysis failed"),
            Self::TargetExists(path) => write!(f, "target already exists: {}", path.display()),
            Self::VerificationShortfall => write!(f, "verification failed"),
            Self::Io(details) => write!(f, "{details}"),
        }
    }
}

/// Run-level errors that stop processing.
#[derive(Debug)]
pub enum MigrationError {
    IllegalTransition { from: NoteState, to: NoteState },
    Audit(AuditError),
    Backlog(VaultError),
}

impl Display for MigrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalTransition { from, to } => {
                write!(f, "illegal note state transition: {from} -> {to}")
            }
            Self::Audit(err) => write!(f, "{err}"),
            Self::Backlog(err) => write!(f, "backlog scan failed: {err}"),
        }
    }
}

impl Error for MigrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IllegalTransition { .. } => None,
            Self::Audit(err) => Some(err),
            Self::Backlog(err) => Some(err),
        }
    }
}

impl From<AuditError> for MigrationError {
    fn from(value: AuditError) -> Self {
        Self::Audit(value)
    }
}

/// Terminal result of processing one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteOutcome {
    pub note_id: String,
    /// Always `Succeeded` or `Failed`.
    pub state: NoteState,
    /// Canonical folder, once classification succeeded.
    pub target: Option<CanonicalPath>,
    /// Artifact path, once content was persisted.
    pub written_path: Option<PathBuf>,
    pub report: Option<VerificationReport>,
    pub failure: Option<FailureReason>,
    pub elapsed: Duration,
}

impl NoteOutcome {
    pub fn succeeded(&self) -> bool {
        self.state == NoteState::Succeeded
    }

    pub fn is_skipped(&self) -> bool {
        self.failure.as_ref().is_some_and(FailureReason::is_skip)
    }
}

/// Dry-run result: where a note would go and what would be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedNote {
    pub note_id: String,
    pub target: CanonicalPath,
    pub content: String,
}

/// Counters for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub elapsed: Duration,
    pub audit_path: PathBuf,
}

struct Progress {
    note_id: String,
    state: NoteState,
    started_at: Instant,
    target: Option<CanonicalPath>,
    written_path: Option<PathBuf>,
}

impl Progress {
    fn new(note_id: String) -> Self {
        Self {
            note_id,
            state: NoteState::Pending,
            started_at: Instant::now(),
            target: None,
            written_path: None,
        }
    }

    fn advance(&mut self, next: NoteState) -> Result<(), MigrationError> {
        if !self.state.can_transition_to(next) {
            return Err(MigrationError::IllegalTransition {
                from: self.state,
                to: next,
            });
        }
        debug!(
            "event=note_state module=service note={} from={} to={}",
            self.note_id, self.state, next
        );
        self.state = next;
        Ok(())
    }

    fn fail(
        mut self,
        reason: FailureReason,
        report: Option<VerificationReport>,
    ) -> Result<NoteOutcome, MigrationError> {
        self.advance(NoteState::Failed)?;
        Ok(self.finish(Some(reason), report))
    }

    fn finish(
        self,
        failure: Option<FailureReason>,
        report: Option<VerificationReport>,
    ) -> NoteOutcome {
        NoteOutcome {
            note_id: self.note_id,
            state: self.state,
            target: self.target,
            written_path: self.written_path,
            report,
            failure,
            elapsed: self.started_at.elapsed(),
        }
    }
}

/// Classification and rewrite half of the pipeline, free of any vault or
/// audit side effects.
pub struct NotePlanner<C: Classifier> {
    classifier: C,
    transformer: ContentTransformer,
}

impl<C: Classifier> NotePlanner<C> {
    pub fn new(classifier: C, config: &MigrationConfig) -> Self {
        Self {
            classifier,
            transformer: ContentTransformer::new(&config.trusted_tags),
        }
    }

    /// Computes target and content for a note without writing or auditing.
    pub fn plan_note(&self, source: &Path) -> Result<PlannedNote, FailureReason> {
        let note = Note::load(source)
            .map_err(|err| FailureReason::Io(format!("read failed: {err}")))?;
        if note.is_blank() {
            return Err(FailureReason::EmptyNote);
        }
        let classification = self
            .classifier
            .classify(&note.content)
            .map_err(FailureReason::ClassificationFailed)?;
        let (target, content) = self.render(&note, &classification);
        Ok(PlannedNote {
            note_id: note.id,
            target,
            content,
        })
    }

    fn render(&self, note: &Note, classification: &Classification) -> (CanonicalPath, String) {
        let target = normalize(classification.suggested_folder());
        let content = self.transformer.transform(
            &note.content,
            classification.frontmatter(),
            target.depth(),
        );
        (target, content)
    }
}

/// Sequential migration pipeline bound to one vault and one audit session.
pub struct MigrationService<C: Classifier> {
    planner: NotePlanner<C>,
    verifier: Verifier,
    vault_root: PathBuf,
    audit: AuditLog,
}

impl<C: Classifier> MigrationService<C> {
    /// Creates a service from run config and an opened audit session.
    pub fn new(classifier: C, config: &MigrationConfig, audit: AuditLog) -> Self {
        Self {
            planner: NotePlanner::new(classifier, config),
            verifier: Verifier::new(&config.vault_root, config.min_content_bytes),
            vault_root: config.vault_root.clone(),
            audit,
        }
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Processes one note to a terminal state and records it.
    ///
    /// # Errors
    /// - `Audit` when the outcome cannot be appended to the audit log.
    pub fn process_note(
        &self,
        source: &Path,
        policy: CollisionPolicy,
    ) -> Result<NoteOutcome, MigrationError> {
        let note_id = note_id_for(source).unwrap_or_else(|| source.display().to_string());
        info!("event=note_process module=service status=start note={note_id}");

        let outcome = self.run_pipeline(Progress::new(note_id), source, policy)?;
        self.record(&outcome)?;
        Ok(outcome)
    }

    fn run_pipeline(
        &self,
        mut progress: Progress,
        source: &Path,
        policy: CollisionPolicy,
    ) -> Result<NoteOutcome, MigrationError> {
        let note = match Note::load(source) {
            Ok(note) => note,
            Err(err) => {
                return progress.fail(FailureReason::Io(format!("read failed: {err}")), None)
            }
        };
        if note.is_blank() {
            return progress.fail(FailureReason::EmptyNote, None);
        }

        progress.advance(NoteState::Classifying)?;
        let classification = match self.planner.classifier.classify(&note.content) {
            Ok(classification) => classification,
            Err(err) => return progress.fail(FailureReason::ClassificationFailed(err), None),
        };

        progress.advance(NoteState::Transforming)?;
        let (target, content) = self.planner.render(&note, &classification);
        let target_dir = self.vault_root.join(target.to_relative_path());
        progress.target = Some(target);

        progress.advance(NoteState::Writing)?;
        let written_path = match claim_destination(&target_dir, &note.id, &content, policy) {
            Ok(Claim::Written(path)) => path,
            Ok(Claim::Occupied(path)) => {
                return progress.fail(FailureReason::TargetExists(path), None)
            }
            Err(err) => return progress.fail(FailureReason::Io(err.to_string()), None),
        };
        progress.written_path = Some(written_path.clone());

        progress.advance(NoteState::Verifying)?;
        let report = self.verifier.verify(&written_path, &note.id);
        if report.passed() {
            progress.advance(NoteState::Succeeded)?;
            Ok(progress.finish(None, Some(report)))
        } else {
            progress.fail(FailureReason::VerificationShortfall, Some(report))
        }
    }

    fn record(&self, outcome: &NoteOutcome) -> Result<(), AuditError> {
        let kind = outcome
            .failure
            .as_ref()
            .map_or(AuditKind::Success, FailureReason::audit_kind);
        let target = outcome.target.as_ref().map(CanonicalPath::as_path_string);
        let mut event = AuditEvent::new(kind, &outcome.note_id, target.clone(), outcome.elapsed);
        if let Some(report) = &outcome.report {
            event = event.with_report(report.clone());
        }

        match &outcome.failure {
            None => info!(
                "event=note_process module=service status=ok note={} target={} duration_ms={}",
                outcome.note_id,
                target.as_deref().unwrap_or("-"),
                outcome.elapsed.as_millis()
            ),
            Some(reason) => {
                if reason.is_skip() {
                    info!(
                        "event=note_process module=service status=skip note={} reason={}",
                        outcome.note_id, reason
                    );
                } else {
                    warn!(
                        "event=note_process module=service status=error note={} target={} reason={}",
                        outcome.note_id,
                        target.as_deref().unwrap_or("-"),
                        reason
                    );
                }
                event = event.with_error(reason.to_string());
            }
        }

        self.audit.append(&event)
    }

    /// Dry run through the same planner the pipeline uses.
    pub fn plan_note(&self, source: &Path) -> Result<PlannedNote, FailureReason> {
        self.planner.plan_note(source)
    }

    /// Migrates a sorted snapshot of `inbox`, optionally capped at `limit`.
    ///
    /// Existing destinations are skipped, never overwritten.
    pub fn run_batch(
        &self,
        inbox: &Path,
        limit: Option<usize>,
    ) -> Result<BatchSummary, MigrationError> {
        let started_at = Instant::now();
        let mut backlog = scan_backlog(inbox).map_err(|err| {
            error!(
                "event=batch module=service status=error inbox={} error={}",
                inbox.display(),
                err
            );
            MigrationError::Backlog(err)
        })?;
        if let Some(limit) = limit {
            backlog.truncate(limit);
        }

        let total = backlog.len();
        info!(
            "event=batch module=service status=start inbox={} total={} limit={}",
            inbox.display(),
            total,
            limit.map_or_else(|| "none".to_string(), |value| value.to_string())
        );

        let mut summary = BatchSummary {
            total,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            elapsed: Duration::ZERO,
            audit_path: self.audit.path().to_path_buf(),
        };
        for (index, source) in backlog.iter().enumerate() {
            debug!(
                "event=batch_item module=service index={} total={} path={}",
                index + 1,
                total,
                source.display()
            );
            let outcome = self.process_note(source, CollisionPolicy::SkipExisting)?;
            if outcome.succeeded() {
                summary.succeeded += 1;
            } else if outcome.is_skipped() {
                summary.skipped += 1;
            } else {
                summary.failed += 1;
            }
        }

        summary.elapsed = started_at.elapsed();
        info!(
            "event=batch module=service status=ok total={} succeeded={} failed={} skipped={} duration_ms={}",
            summary.total,
            summary.succeeded,
            summary.failed,
            summary.skipped,
            summary.elapsed.as_millis()
        );
        Ok(summary)
    }
}
