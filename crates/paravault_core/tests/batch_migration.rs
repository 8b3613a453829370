use paravault_core::{
    AuditLog, Classification, Classifier, ClassifierError, CollisionPolicy, FailureReason,
    MigrationConfig, MigrationService, NotePlanner, NoteState,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

struct StubClassifier {
    folder: Option<&'static str>,
    frontmatter: Option<&'static str>,
    fail: bool,
    calls: AtomicUsize,
}

impl StubClassifier {
    fn suggesting(folder: &'static str) -> Self {
        Self {
            folder: Some(folder),
            frontmatter: Some("---\ntags: [raw]\n---"),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            folder: None,
            frontmatter: None,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for StubClassifier {
    fn classify(&self, _note_text: &str) -> Result<Classification, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClassifierError::Timeout);
        }
        Ok(Classification {
            suggested_folder: self.folder.map(str::to_string),
            frontmatter: self.frontmatter.map(str::to_string),
        })
    }
}

fn test_config(root: &Path) -> MigrationConfig {
    MigrationConfig {
        vault_root: root.join("vault"),
        inbox_dir: root.join("inbox"),
        audit_dir: root.join("logs"),
        ..MigrationConfig::default()
    }
}

fn write_note(dir: &Path, name: &str, body: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn audit_lines(log: &AuditLog) -> Vec<serde_json::Value> {
    std::fs::read_to_string(log.path())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn empty_note_fails_without_classifier_call() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::suggesting("Resource");
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);
    let source = write_note(&config.inbox_dir, "blank.md", "  \n\t\n");

    let outcome = service
        .process_note(&source, CollisionPolicy::SkipExisting)
        .unwrap();

    assert_eq!(outcome.state, NoteState::Failed);
    assert_eq!(outcome.failure, Some(FailureReason::EmptyNote));
    assert_eq!(outcome.failure.as_ref().unwrap().to_string(), "empty file");
    assert_eq!(classifier.calls(), 0);

    let lines = audit_lines(service.audit_log());
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["type"], "ERROR");
    assert_eq!(lines[0]["filename"], "blank.md");
    assert_eq!(lines[0]["error"], "empty file");
}

#[test]
fn bare_resource_keyword_lands_under_resources_root() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::suggesting("Resource");
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);
    let source = write_note(
        &config.inbox_dir,
        "rust.md",
        "# Rust\nBody with #idea and #raw\n![shot](Files/s.png)",
    );

    let outcome = service
        .process_note(&source, CollisionPolicy::SkipExisting)
        .unwrap();

    assert!(outcome.succeeded());
    assert_eq!(
        outcome.target.as_ref().unwrap().segments(),
        ["03_Resources"]
    );
    let expected_path = config.vault_root.join("03_Resources").join("rust.md");
    assert_eq!(outcome.written_path.as_deref(), Some(expected_path.as_path()));
    let report = outcome.report.as_ref().unwrap();
    assert!(report.exists && report.valid_folder && report.has_content);
    assert!(report.warnings.is_empty());

    let written = std::fs::read_to_string(&expected_path).unwrap();
    assert_eq!(
        written,
        "---\ntags: [raw]\n---\n\n# Rust\nBody with \\#idea and #raw\n![shot](Files/s.png)"
    );
    assert_eq!(
        std::fs::read_to_string(&source).unwrap(),
        "# Rust\nBody with #idea and #raw\n![shot](Files/s.png)"
    );

    let lines = audit_lines(service.audit_log());
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["type"], "SUCCESS");
    assert_eq!(lines[0]["target"], "03_Resources");
    assert_eq!(lines[0]["report"]["valid_folder"], true);
    assert!(lines[0]["time"].is_number());
}

#[test]
fn nested_target_rebases_asset_links() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::suggesting("Project/Apollo/Design");
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);
    let source = write_note(&config.inbox_dir, "spec.md", "see ![d](Files/d.png)");

    let outcome = service
        .process_note(&source, CollisionPolicy::SkipExisting)
        .unwrap();

    assert!(outcome.succeeded());
    let target = outcome.target.unwrap();
    assert_eq!(target.as_path_string(), "01_Projects/Apollo/Design");
    let written = std::fs::read_to_string(outcome.written_path.unwrap()).unwrap();
    assert!(written.ends_with("see ![d](../../Files/d.png)"));
}

#[test]
fn classifier_failure_is_terminal_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::failing();
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);
    let source = write_note(&config.inbox_dir, "n.md", "some content");

    let outcome = service
        .process_note(&source, CollisionPolicy::SkipExisting)
        .unwrap();

    assert_eq!(outcome.state, NoteState::Failed);
    assert_eq!(
        outcome.failure,
        Some(FailureReason::ClassificationFailed(ClassifierError::Timeout))
    );
    assert!(outcome.target.is_none());
    assert!(!config.vault_root.exists());

    let lines = audit_lines(service.audit_log());
    assert_eq!(lines[0]["type"], "ERROR");
    assert_eq!(lines[0]["error"], "AI analysis failed");
}

#[test]
fn verification_shortfall_keeps_artifact_and_logs_warning() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::suggesting("Misc/Stuff");
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);
    let source = write_note(&config.inbox_dir, "odd.md", "content without category");

    let outcome = service
        .process_note(&source, CollisionPolicy::SkipExisting)
        .unwrap();

    assert_eq!(outcome.state, NoteState::Failed);
    assert_eq!(outcome.failure, Some(FailureReason::VerificationShortfall));
    let report = outcome.report.as_ref().unwrap();
    assert!(report.exists);
    assert!(!report.valid_folder);
    let artifact = config.vault_root.join("Misc").join("Stuff").join("odd.md");
    assert!(artifact.is_file());

    let lines = audit_lines(service.audit_log());
    assert_eq!(lines[0]["type"], "WARNING");
    assert_eq!(lines[0]["report"]["valid_folder"], false);
}

#[test]
fn batch_processes_sorted_backlog_and_skips_existing_targets() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::suggesting("02_Areas/Areas/Health");
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);

    write_note(&config.inbox_dir, "b.md", "second note body");
    write_note(&config.inbox_dir, "a.md", "first note body");
    write_note(&config.inbox_dir, "empty.md", "");
    write_note(&config.inbox_dir.join("Files"), "asset.md", "ignored");
    let existing_dir = config.vault_root.join("02_Areas").join("Health");
    write_note(&existing_dir, "b.md", "already migrated");

    let summary = service.run_batch(&config.inbox_dir, None).unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.audit_path, service.audit_log().path());
    assert_eq!(classifier.calls(), 2);
    assert_eq!(
        std::fs::read_to_string(existing_dir.join("b.md")).unwrap(),
        "already migrated"
    );
    assert!(existing_dir.join("a.md").is_file());

    let lines = audit_lines(service.audit_log());
    let order: Vec<&str> = lines
        .iter()
        .map(|line| line["filename"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["a.md", "b.md", "empty.md"]);
    assert_eq!(lines[1]["type"], "WARNING");
}

#[test]
fn batch_limit_caps_processed_notes() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::suggesting("Archive");
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);
    for name in ["1.md", "2.md", "3.md"] {
        write_note(&config.inbox_dir, name, "archived material");
    }

    let summary = service.run_batch(&config.inbox_dir, Some(2)).unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 2);
    assert!(config.vault_root.join("04_Archives").join("2.md").is_file());
    assert!(!config.vault_root.join("04_Archives").join("3.md").exists());
}

#[test]
fn missing_backlog_aborts_batch() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::suggesting("Archive");
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);

    assert!(service.run_batch(&config.inbox_dir, None).is_err());
}

#[test]
fn plan_note_previews_without_writing_or_auditing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::suggesting("2_영역/건강");
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);
    let source = write_note(&config.inbox_dir, "walk.md", "#걷기 log ![m](Files/map.png)");

    let planned = service.plan_note(&source).unwrap();

    assert_eq!(planned.note_id, "walk.md");
    assert_eq!(planned.target.as_path_string(), "02_Areas/건강");
    assert!(planned.content.ends_with("\\#걷기 log ![m](../Files/map.png)"));
    assert!(!config.vault_root.exists());
    assert!(audit_lines(service.audit_log()).is_empty());
}

#[test]
fn unreadable_note_is_an_error_and_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::suggesting("Resource");
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);
    std::fs::create_dir_all(&config.inbox_dir).unwrap();
    std::fs::write(config.inbox_dir.join("a.md"), [0xff, 0xfe, 0x00, 0x41]).unwrap();
    write_note(&config.inbox_dir, "b.md", "readable note body");

    let summary = service.run_batch(&config.inbox_dir, None).unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(classifier.calls(), 1);

    let lines = audit_lines(service.audit_log());
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["type"], "ERROR");
    assert_eq!(lines[0]["filename"], "a.md");
    assert!(lines[0]["error"]
        .as_str()
        .unwrap()
        .starts_with("read failed:"));
    assert_eq!(lines[1]["type"], "SUCCESS");
    assert_eq!(lines[1]["filename"], "b.md");
    assert!(config.vault_root.join("03_Resources").join("b.md").is_file());
}

#[test]
fn blocked_target_folder_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::suggesting("Project/Apollo");
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);
    write_note(&config.inbox_dir, "a.md", "apollo design notes");
    std::fs::create_dir_all(config.vault_root.join("01_Projects")).unwrap();
    std::fs::write(config.vault_root.join("01_Projects").join("Apollo"), "a file").unwrap();

    let outcome = service
        .process_note(&config.inbox_dir.join("a.md"), CollisionPolicy::SkipExisting)
        .unwrap();

    assert_eq!(outcome.state, NoteState::Failed);
    assert!(matches!(outcome.failure, Some(FailureReason::Io(_))));
    assert!(outcome.written_path.is_none());
    assert_eq!(audit_lines(service.audit_log())[0]["type"], "ERROR");
}

#[test]
fn classifier_outage_counts_every_note_as_failed() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::failing();
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);
    write_note(&config.inbox_dir, "a.md", "first note body");
    write_note(&config.inbox_dir, "b.md", "second note body");

    let summary = service.run_batch(&config.inbox_dir, None).unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.skipped, 0);
    assert!(!config.vault_root.exists());
    let lines = audit_lines(service.audit_log());
    assert!(lines.iter().all(|line| line["type"] == "ERROR"));
}

#[test]
fn decomposed_hangul_file_names_are_written_composed() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let classifier = StubClassifier::suggesting("Resource");
    let audit = AuditLog::create(&config.audit_dir).unwrap();
    let service = MigrationService::new(&classifier, &config, audit);
    write_note(&config.inbox_dir, "\u{1100}\u{1161}.md", "한글 메모 본문");

    let summary = service.run_batch(&config.inbox_dir, None).unwrap();
    assert_eq!(summary.succeeded, 1);

    let names: Vec<String> = std::fs::read_dir(config.vault_root.join("03_Resources"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["\u{AC00}.md".to_string()]);
    assert_eq!(audit_lines(service.audit_log())[0]["filename"], "\u{AC00}.md");
}

#[test]
fn planner_previews_without_an_audit_session() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let planner = NotePlanner::new(StubClassifier::suggesting("Project/Apollo"), &config);
    let source = write_note(&config.inbox_dir, "plan.md", "see ![d](Files/d.png)");

    let planned = planner.plan_note(&source).unwrap();

    assert_eq!(planned.target.as_path_string(), "01_Projects/Apollo");
    assert!(planned.content.ends_with("see ![d](../Files/d.png)"));
    assert!(!config.audit_dir.exists());
    assert!(!config.vault_root.exists());
}
