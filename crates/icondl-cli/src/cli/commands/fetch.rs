//! `icondl fetch` – crawl pages, download their icons and write the archive.

use anyhow::{bail, Context, Result};
use icondl_core::config::IcondlConfig;
use icondl_core::input::parse_source_urls;
use icondl_core::{Orchestrator, RunEvent, RunOutcome};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Reads the source list: literal arguments, plus stdin wherever `-` appears.
async fn collect_sources(args: &[String]) -> Result<Vec<String>> {
    let mut text = String::new();
    for arg in args {
        if arg == "-" {
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("reading URLs from stdin")?;
        } else {
            text.push_str(arg);
        }
        text.push('\n');
    }
    Ok(parse_source_urls(&text))
}

/// One status line per lifecycle event.
pub fn render_event(event: &RunEvent) -> String {
    match event {
        RunEvent::JobStarted { source_url, folder } => {
            format!("[start] {}  {}", folder, source_url)
        }
        RunEvent::JobCompleted {
            folder,
            downloaded,
            failed,
            bytes,
            ..
        } => {
            if *failed == 0 {
                format!("[done]  {}  {} icon(s), {} bytes", folder, downloaded, bytes)
            } else {
                format!(
                    "[done]  {}  {} icon(s), {} bytes, {} failed",
                    folder, downloaded, bytes, failed
                )
            }
        }
        RunEvent::JobFailed { source_url, reason } => {
            format!("[fail]  {}  {}", source_url, reason)
        }
        RunEvent::AllJobsComplete { succeeded, failed } => {
            format!("{} job(s) finished, {} failed", succeeded, failed)
        }
        RunEvent::ArchiveReady { file_name, files } => {
            format!("archive {} ready ({} file(s))", file_name, files)
        }
    }
}

/// Where the archive lands: `output` itself, `output/<file_name>` for a
/// directory, or `<cwd>/<file_name>` when no output was given.
pub fn resolve_destination(output: Option<&Path>, cwd: &Path, file_name: &str) -> PathBuf {
    match output {
        Some(p) if p.is_dir() => p.join(file_name),
        Some(p) => p.to_path_buf(),
        None => cwd.join(file_name),
    }
}

pub async fn run_fetch(cfg: &IcondlConfig, args: &[String], output: Option<&Path>) -> Result<()> {
    let sources = collect_sources(args).await?;
    if sources.is_empty() {
        bail!("no valid http(s) URLs given");
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<RunEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            println!("{}", render_event(&event));
        }
    });

    let orchestrator = Orchestrator::from_config(cfg).with_events(tx);
    let result = orchestrator.run(&sources).await;
    // closes the event channel so the printer drains and exits
    drop(orchestrator);
    let _ = printer.await;
    let report = result?;

    match report.outcome() {
        RunOutcome::Failed => bail!(
            "no icons downloaded ({} of {} job(s) failed)",
            report.failed_jobs(),
            report.jobs.len()
        ),
        RunOutcome::Partial => {
            println!("warning: some jobs or icons failed; the archive is incomplete");
        }
        RunOutcome::Complete => {}
    }

    let cwd = std::env::current_dir()?;
    let dest = resolve_destination(output, &cwd, report.archive.file_name());
    let bytes = report
        .archive
        .persist_to(&dest)
        .with_context(|| format!("writing archive to {}", dest.display()))?;
    tracing::info!(dest = %dest.display(), bytes, "archive delivered");
    let stats = report.archive_stats();
    println!(
        "saved {} ({} file(s), {} bytes)",
        dest.display(),
        stats.files,
        bytes
    );
    Ok(())
}
