use std::fmt::Write as _;

use anyhow::Context;
use colored::Colorize;
use gridhook_delivery::HttpDelivery;
use gridhook_diff::diff_grids;
use gridhook_source::{GridSource, SheetSelector, WorkbookFileSource};
use gridhook_store::FileKeyValueStore;
use gridhook_sync::{
    BootstrapOutcome, CycleOutcome, CycleReport, DocumentLock, PushOutcome, Reconciler, StatusReport,
};
use gridhook_types::{ChangeKind, ChangeSet};
use serde::Serialize;

use crate::cli::*;
use crate::config::AppConfig;

type FileReconciler = Reconciler<WorkbookFileSource, FileKeyValueStore, HttpDelivery>;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Open => cmd_open(&config, cli.format).await,
        Command::Change => cmd_change(&config, cli.format).await,
        Command::Diff(args) => cmd_diff(&config, args, cli.format),
        Command::Status => cmd_status(&config, cli.format),
        Command::Reset => cmd_reset(&config).await,
    }
}

fn build_reconciler(config: &AppConfig) -> anyhow::Result<FileReconciler> {
    let source = WorkbookFileSource::with_selector(&config.source.path, config.sheet_selector());
    let kv = FileKeyValueStore::open(&config.store.path)
        .with_context(|| format!("opening state file {}", config.store.path.display()))?;
    let delivery = HttpDelivery::new(config.delivery_config())?;
    let lock = DocumentLock::with_lock_file(config.document.clone(), config.cycle_lock_path());
    Ok(Reconciler::with_lock(source, kv, delivery, config.reconciler_config(), lock))
}

async fn cmd_open(config: &AppConfig, format: OutputFormat) -> anyhow::Result<()> {
    let reconciler = build_reconciler(config)?;
    let outcome = reconciler.on_open().await?;
    emit(format, &outcome, render_bootstrap)
}

async fn cmd_change(config: &AppConfig, format: OutputFormat) -> anyhow::Result<()> {
    let reconciler = build_reconciler(config)?;
    let report = reconciler.on_change().await?;
    emit(format, &report, render_report)
}

fn cmd_diff(config: &AppConfig, args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let changes = diff_files(config, &args)?;
    emit(format, &changes, render_changes)
}

fn diff_files(config: &AppConfig, args: &DiffArgs) -> anyhow::Result<ChangeSet> {
    let selector = args
        .sheet
        .clone()
        .map(SheetSelector::new)
        .unwrap_or_else(|| config.sheet_selector());
    let previous = WorkbookFileSource::with_selector(&args.previous, selector.clone()).read_grid()?;
    let current = WorkbookFileSource::with_selector(&args.current, selector).read_grid()?;
    Ok(diff_grids(&previous, &current))
}

fn cmd_status(config: &AppConfig, format: OutputFormat) -> anyhow::Result<()> {
    let status = build_reconciler(config)?.status()?;
    emit(format, &status, render_status)
}

async fn cmd_reset(config: &AppConfig) -> anyhow::Result<()> {
    build_reconciler(config)?.reset().await?;
    println!("{} Baseline for {} reset.", "✓".green().bold(), config.document.bold());
    Ok(())
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, render: fn(&T) -> String) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", render(value)),
    }
    Ok(())
}

fn render_bootstrap(outcome: &BootstrapOutcome) -> String {
    match outcome {
        BootstrapOutcome::Loaded { rows, delivered: true } => {
            format!("{} Initial load pushed: {} rows\n", "✓".green().bold(), rows.to_string().bold())
        }
        BootstrapOutcome::Loaded { rows, delivered: false } => format!(
            "{} Initial load recorded ({} rows) but delivery failed\n",
            "!".yellow().bold(),
            rows.to_string().bold()
        ),
        BootstrapOutcome::AlreadyInitialized => "Already initialized.\n".to_string(),
    }
}

fn render_report(report: &CycleReport) -> String {
    if report.outcome == CycleOutcome::NoChanges {
        return "No changes.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} Cycle {} committed: {} added, {} deleted, {} updated",
        "✓".green().bold(),
        report.cycle_id.to_string().dimmed(),
        report.count(ChangeKind::Add),
        report.count(ChangeKind::Delete),
        report.count(ChangeKind::Update),
    );
    for push in &report.pushes {
        let line = match push {
            PushOutcome::Delivered { event, rows, status } => {
                format!("  {:<8} {rows} rows  {} ({status})", event.as_str(), "delivered".green())
            }
            PushOutcome::Failed { event, rows, error } => {
                format!("  {:<8} {rows} rows  {}: {error}", event.as_str(), "failed".red())
            }
        };
        let _ = writeln!(out, "{line}");
    }
    out
}

fn render_changes(changes: &ChangeSet) -> String {
    if changes.is_empty() {
        return "No changes.\n".to_string();
    }
    let mut out = String::new();
    for (kind, rows) in changes.non_empty() {
        let marker = match kind {
            ChangeKind::Add => "+".green(),
            ChangeKind::Delete => "-".red(),
            ChangeKind::Update => "~".yellow(),
        };
        for row in rows {
            let cells: Vec<String> = row.iter().map(gridhook_types::cell_to_string).collect();
            let _ = writeln!(out, "{marker} {}", cells.join(", "));
        }
    }
    out
}

fn render_status(status: &StatusReport) -> String {
    let count = |n: Option<usize>| n.map_or_else(|| "none".dimmed().to_string(), |n| format!("{n} rows"));
    let initialized = if status.initialized {
        "yes".green()
    } else {
        "no".yellow()
    };
    format!(
        "Document: {}\nInitialized: {}\nBaseline: {}\nLast read: {}\n",
        status.document.bold(),
        initialized,
        count(status.baseline_rows),
        count(status.current_rows),
    )
}
