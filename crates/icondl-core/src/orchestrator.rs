//! Multi-job orchestration for one run.
//!
//! Coordinates the pipeline per source URL:
//! crawl → extract → rewrite → download pool → job folder,
//! with up to `max_concurrent_jobs` jobs in flight. Every job reaches a
//! terminal state before the run's output root is archived. Each run writes
//! into its own temporary output root, removed when the run returns.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::archive::{ArchiveArtifact, ArchiveStats};
use crate::config::IcondlConfig;
use crate::crawl::{self, BrowserConnector, CrawlOptions};
use crate::download_pool::{DownloadPool, DownloadSummary};
use crate::downloader::{AssetFetcher, CurlFetcher};
use crate::error::{JobError, RunError};
use crate::extract::{self, Selectors};
use crate::job::{JobReport, JobStatus, ScrapeJob};
use crate::naming::FolderAllocator;
use crate::pool::WorkerPool;
use crate::rewrite::RewrittenAsset;
use crate::webdriver::WebDriverConnector;

/// Archive name when a run covers more than one job.
const MULTI_JOB_ARCHIVE: &str = "icons.zip";

/// Lifecycle notifications for the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    JobStarted {
        source_url: String,
        folder: String,
    },
    JobFailed {
        source_url: String,
        reason: String,
    },
    JobCompleted {
        source_url: String,
        folder: String,
        downloaded: usize,
        failed: usize,
        bytes: u64,
    },
    AllJobsComplete {
        succeeded: usize,
        failed: usize,
    },
    ArchiveReady {
        file_name: String,
        files: usize,
    },
}

/// Aggregate result as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every job finished and every asset was fetched.
    Complete,
    /// Something failed, but at least one asset was archived.
    Partial,
    /// Nothing was archived.
    Failed,
}

#[derive(Debug)]
pub struct RunReport {
    pub jobs: Vec<JobReport>,
    pub archive: ArchiveArtifact,
}

impl RunReport {
    pub fn outcome(&self) -> RunOutcome {
        if self.archive.stats().files == 0 {
            return RunOutcome::Failed;
        }
        let clean = self
            .jobs
            .iter()
            .all(|j| j.is_done() && j.failed_downloads == 0);
        if clean {
            RunOutcome::Complete
        } else {
            RunOutcome::Partial
        }
    }

    pub fn succeeded_jobs(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_done()).count()
    }

    pub fn failed_jobs(&self) -> usize {
        self.jobs.len() - self.succeeded_jobs()
    }

    pub fn archive_stats(&self) -> ArchiveStats {
        self.archive.stats()
    }
}

/// Everything a job task needs; shared read-only across the run.
struct JobContext {
    connector: Arc<dyn BrowserConnector>,
    downloads: DownloadPool,
    crawl: CrawlOptions,
    selectors: Selectors,
    events: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl JobContext {
    /// Never waits on the listener.
    fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.events {
            // a closed receiver only means nobody is listening
            let _ = tx.send(event);
        }
    }
}

pub struct Orchestrator {
    connector: Arc<dyn BrowserConnector>,
    fetcher: Arc<dyn AssetFetcher>,
    job_pool: WorkerPool,
    download_pool: WorkerPool,
    crawl: CrawlOptions,
    selectors: Selectors,
    events: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl Orchestrator {
    pub fn new(
        connector: Arc<dyn BrowserConnector>,
        fetcher: Arc<dyn AssetFetcher>,
        cfg: &IcondlConfig,
    ) -> Self {
        Self {
            connector,
            fetcher,
            job_pool: WorkerPool::new(cfg.max_concurrent_jobs),
            download_pool: WorkerPool::new(cfg.max_concurrent_downloads),
            crawl: cfg.crawl_options(),
            selectors: cfg.selectors(),
            events: None,
        }
    }

    /// WebDriver browser and libcurl fetcher as configured.
    pub fn from_config(cfg: &IcondlConfig) -> Self {
        let http = cfg.http();
        Self::new(
            Arc::new(WebDriverConnector::new(&cfg.webdriver_url, &http)),
            Arc::new(CurlFetcher::new(&http)),
            cfg,
        )
    }

    /// Send lifecycle events to `tx` during runs.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Runs one job per URL, waits for all of them, then archives the output.
    ///
    /// Job failures are reported in the returned [`RunReport`]; only failures
    /// that leave nothing to deliver (output root, archive) are errors.
    pub async fn run(&self, source_urls: &[String]) -> Result<RunReport, RunError> {
        if source_urls.is_empty() {
            return Err(RunError::NoSources);
        }
        let output_root = tempfile::Builder::new()
            .prefix("icondl-run-")
            .tempdir()
            .map_err(RunError::OutputRoot)?;
        tracing::info!(jobs = source_urls.len(), root = %output_root.path().display(), "run started");

        let mut folders = FolderAllocator::new();
        let jobs: Vec<ScrapeJob> = source_urls
            .iter()
            .map(|url| ScrapeJob::new(url.clone(), folders.allocate(url)))
            .collect();
        let single_folder = (jobs.len() == 1).then(|| jobs[0].output_folder.clone());

        let ctx = Arc::new(JobContext {
            connector: Arc::clone(&self.connector),
            downloads: DownloadPool::new(self.download_pool, Arc::clone(&self.fetcher)),
            crawl: self.crawl.clone(),
            selectors: self.selectors.clone(),
            events: self.events.clone(),
        });

        let root = output_root.path().to_path_buf();
        let results = self
            .job_pool
            .run(jobs, |job| {
                let ctx = Arc::clone(&ctx);
                let root = root.clone();
                async move {
                    let (url, folder) = (job.source_url.clone(), job.output_folder.clone());
                    match tokio::spawn(run_job(Arc::clone(&ctx), job, root)).await {
                        Ok(report) => report,
                        Err(e) => {
                            let reason = format!("job task failed: {}", e);
                            tracing::error!(url = %url, "{}", reason);
                            ctx.emit(RunEvent::JobFailed {
                                source_url: url.clone(),
                                reason: reason.clone(),
                            });
                            JobReport {
                                source_url: url,
                                folder,
                                status: JobStatus::Failed(reason),
                                icons: 0,
                                downloaded: 0,
                                failed_downloads: 0,
                                bytes: 0,
                            }
                        }
                    }
                }
            })
            .await;

        let reports: Vec<JobReport> = results
            .into_iter()
            .filter_map(|r| match r {
                Ok(report) => Some(report),
                Err(e) => {
                    tracing::error!("job pool join: {}", e);
                    None
                }
            })
            .collect();

        let succeeded = reports.iter().filter(|r| r.is_done()).count();
        let failed = reports.len() - succeeded;
        tracing::info!(succeeded, failed, "all jobs complete");
        ctx.emit(RunEvent::AllJobsComplete { succeeded, failed });

        let file_name = single_folder
            .map(|f| format!("{f}.zip"))
            .unwrap_or_else(|| MULTI_JOB_ARCHIVE.to_string());
        let archive = tokio::task::spawn_blocking({
            let root = root.clone();
            move || ArchiveArtifact::build(&root, &file_name)
        })
        .await
        .map_err(|e| RunError::Task(e.to_string()))??;

        ctx.emit(RunEvent::ArchiveReady {
            file_name: archive.file_name().to_string(),
            files: archive.stats().files,
        });

        drop(output_root);
        Ok(RunReport {
            jobs: reports,
            archive,
        })
    }
}

/// Drives one job to a terminal state; never fails, failures land in the report.
async fn run_job(ctx: Arc<JobContext>, mut job: ScrapeJob, root: PathBuf) -> JobReport {
    ctx.emit(RunEvent::JobStarted {
        source_url: job.source_url.clone(),
        folder: job.output_folder.clone(),
    });
    tracing::info!(url = %job.source_url, job = %job.output_folder, "job started");

    let mut icons = 0;
    let result = drive_job(&ctx, &mut job, &root, &mut icons).await;
    let summary = match result {
        Ok(summary) => {
            advance(&mut job, JobStatus::Done);
            ctx.emit(RunEvent::JobCompleted {
                source_url: job.source_url.clone(),
                folder: job.output_folder.clone(),
                downloaded: summary.succeeded,
                failed: summary.failures.len(),
                bytes: summary.bytes,
            });
            tracing::info!(
                url = %job.source_url,
                job = %job.output_folder,
                downloaded = summary.succeeded,
                failed = summary.failures.len(),
                bytes = summary.bytes,
                "job done"
            );
            summary
        }
        Err(e) => {
            let reason = e.to_string();
            tracing::error!(url = %job.source_url, job = %job.output_folder, "job failed: {}", reason);
            advance(&mut job, JobStatus::Failed(reason.clone()));
            ctx.emit(RunEvent::JobFailed {
                source_url: job.source_url.clone(),
                reason,
            });
            DownloadSummary::default()
        }
    };

    JobReport {
        source_url: job.source_url.clone(),
        folder: job.output_folder.clone(),
        status: job.status().clone(),
        icons,
        downloaded: summary.succeeded,
        failed_downloads: summary.failures.len(),
        bytes: summary.bytes,
    }
}

async fn drive_job(
    ctx: &Arc<JobContext>,
    job: &mut ScrapeJob,
    root: &Path,
    icons: &mut usize,
) -> Result<DownloadSummary, JobError> {
    advance(job, JobStatus::Crawling);
    let page = tokio::task::spawn_blocking({
        let ctx = Arc::clone(ctx);
        let url = job.source_url.clone();
        move || crawl::crawl_page(ctx.connector.as_ref(), &url, &ctx.crawl)
    })
    .await
    .map_err(|e| JobError::Task(e.to_string()))??;

    advance(job, JobStatus::Extracting);
    let selectors = ctx.selectors.clone();
    let records = tokio::task::spawn_blocking(move || extract::extract_icons(&page.markup, &selectors))
        .await
        .map_err(|e| JobError::Task(e.to_string()))??;
    *icons = records.len();

    let folder = root.join(&job.output_folder);
    tokio::fs::create_dir_all(&folder)
        .await
        .map_err(|source| JobError::Folder {
            path: folder.clone(),
            source,
        })?;

    advance(job, JobStatus::Downloading);
    let assets: Vec<RewrittenAsset> = records.iter().map(RewrittenAsset::from_record).collect();
    Ok(ctx.downloads.download_all(assets, &folder).await)
}

fn advance(job: &mut ScrapeJob, next: JobStatus) {
    if let Err(e) = job.advance(next) {
        tracing::error!(job = %job.output_folder, "{}", e);
    }
}
