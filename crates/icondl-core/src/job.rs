//! Scrape job state.
//!
//! `Pending → Crawling → Extracting → Downloading → Done`, with `Failed`
//! reachable from `Crawling` and `Extracting` only. Downloading always ends in
//! `Done`: asset failures are counted, not fatal.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Crawling,
    Extracting,
    Downloading,
    Done,
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed(_))
    }

    fn can_become(&self, next: &JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Crawling)
                | (Crawling, Extracting)
                | (Extracting, Downloading)
                | (Downloading, Done)
                | (Crawling, Failed(_))
                | (Extracting, Failed(_))
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Crawling => write!(f, "crawling"),
            JobStatus::Extracting => write!(f, "extracting"),
            JobStatus::Downloading => write!(f, "downloading"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid job transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// One crawl-extract-download cycle for a single source URL.
#[derive(Debug, Clone)]
pub struct ScrapeJob {
    pub source_url: String,
    /// Folder name under the run's output root.
    pub output_folder: String,
    status: JobStatus,
}

impl ScrapeJob {
    pub fn new(source_url: impl Into<String>, output_folder: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            output_folder: output_folder.into(),
            status: JobStatus::Pending,
        }
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    /// Moves to `next` if the transition is allowed.
    pub fn advance(&mut self, next: JobStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_become(&next) {
            return Err(InvalidTransition {
                from: self.status.clone(),
                to: next,
            });
        }
        tracing::debug!(job = %self.output_folder, from = %self.status, to = %next, "job transition");
        self.status = next;
        Ok(())
    }
}

/// Terminal snapshot of a job, returned to the caller of a run.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub source_url: String,
    pub folder: String,
    pub status: JobStatus,
    /// Icon tiles extracted from the page.
    pub icons: usize,
    pub downloaded: usize,
    pub failed_downloads: usize,
    /// Bytes written to the job folder.
    pub bytes: u64,
}

impl JobReport {
    pub fn is_done(&self) -> bool {
        self.status == JobStatus::Done
    }
}
