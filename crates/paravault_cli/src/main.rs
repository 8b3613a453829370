//! `paravault` command-line entry point.
//!
//! # Responsibility
//! - Load config and start logging; open an audit session only for commands
//!   that write.
//! - Dispatch to batch migration, live watching, or a normalization preview.

use clap::{Parser, Subcommand};
use log::info;
use paravault_core::vault::scan_backlog;
use paravault_core::{
    core_version, default_log_level, init_logging, normalize, AuditLog, InboxWatcher,
    LiveRunner, MigrationConfig, MigrationService, NotePlanner, OllamaClassifier,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc;

#[derive(Parser)]
#[command(
    name = "paravault",
    version = core_version(),
    about = "Migrate free-form notes into a PARA vault"
)]
struct Cli {
    /// JSON config file; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Diagnostic log directory (defaults to the audit directory).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Migrate every note in the backlog once.
    Batch {
        #[arg(long)]
        inbox: Option<PathBuf>,
        /// Process at most this many notes.
        #[arg(long)]
        limit: Option<usize>,
        /// Print planned targets without writing.
        #[arg(long)]
        dry_run: bool,
    },
    /// Watch the inbox and migrate notes as they arrive.
    Watch {
        #[arg(long)]
        inbox: Option<PathBuf>,
    },
    /// Print the canonical path for a folder suggestion.
    Normalize { raw: Option<String> },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("paravault: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Command::Normalize { raw } = &cli.command {
        println!("{}", normalize(raw.as_deref()));
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => MigrationConfig::load(path)?,
        None => MigrationConfig::default(),
    };
    let log_dir = absolute(cli.log_dir.as_deref().unwrap_or(config.audit_dir.as_path()))?;
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, &log_dir)?;

    let classifier = OllamaClassifier::new(&config.classifier)?;

    match cli.command {
        Command::Batch {
            inbox,
            limit,
            dry_run,
        } => {
            let inbox = inbox.unwrap_or_else(|| config.inbox_dir.clone());
            let limit = limit.or(config.batch_limit);
            if dry_run {
                let planner = NotePlanner::new(classifier, &config);
                return preview_batch(&planner, &inbox, limit);
            }
            let audit = AuditLog::create(&config.audit_dir)?;
            let service = MigrationService::new(classifier, &config, audit);
            let summary = service.run_batch(&inbox, limit)?;
            println!(
                "total={} succeeded={} failed={} skipped={} elapsed={:.2}s audit={}",
                summary.total,
                summary.succeeded,
                summary.failed,
                summary.skipped,
                summary.elapsed.as_secs_f64(),
                summary.audit_path.display()
            );
        }
        Command::Watch { inbox } => {
            let inbox = inbox.unwrap_or_else(|| config.inbox_dir.clone());
            std::fs::create_dir_all(&inbox)?;
            let audit = AuditLog::create(&config.audit_dir)?;
            let service = MigrationService::new(classifier, &config, audit);
            let (sender, receiver) = mpsc::channel();
            let _watcher = InboxWatcher::start(&inbox, sender)?;
            println!("watching {}", inbox.display());
            LiveRunner::new(&service, config.settle_delay())
                .remove_source_on_success(config.remove_source_on_success)
                .run(receiver)?;
        }
        Command::Normalize { .. } => {}
    }
    Ok(())
}

fn preview_batch(
    planner: &NotePlanner<OllamaClassifier>,
    inbox: &Path,
    limit: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let mut backlog = scan_backlog(inbox)?;
    if let Some(limit) = limit {
        backlog.truncate(limit);
    }
    info!("event=dry_run module=cli status=start total={}", backlog.len());
    for source in &backlog {
        match planner.plan_note(source) {
            Ok(planned) => println!("{} -> {}", planned.note_id, planned.target),
            Err(reason) => println!("{} !! {}", source.display(), reason),
        }
    }
    Ok(())
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
