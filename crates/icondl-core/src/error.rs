//! Error taxonomy for the pipeline.
//!
//! Job-level errors (crawl, extract) end a single job in `Failed`; download
//! errors are isolated per asset; archive errors fail the whole run.

use std::path::PathBuf;

/// Browser-side failure while crawling a source page.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Session could not be established, or a browser command failed mid-crawl.
    #[error("crawler unavailable: {0}")]
    CrawlerUnavailable(String),
    /// The tile count kept growing past the configured scroll bound.
    #[error("page did not stabilize after {rounds} scroll rounds")]
    CrawlTimeout { rounds: u32 },
}

/// Failure turning rendered markup into icon records.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// No container matched the tile selector.
    #[error("no icon tiles found on page")]
    NoIconsFound,
    #[error("invalid CSS selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Per-asset fetch failure (AssetFetchFailed). Never escapes the download pool.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("transport error: {0}")]
    Transport(#[from] curl::Error),
    #[error("HTTP {0}")]
    Http(u32),
    #[error("write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("download task failed: {0}")]
    Task(String),
}

/// Job-fatal error, converted into `JobStatus::Failed` at the job boundary.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Crawl(#[from] CrawlError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("job task failed: {0}")]
    Task(String),
    #[error("job folder {}: {source}", path.display())]
    Folder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure writing the run archive (ArchiveWriteFailed).
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive write failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Run-fatal error: nothing can be delivered.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("no source URLs submitted")]
    NoSources,
    #[error("could not create run output root: {0}")]
    OutputRoot(#[source] std::io::Error),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("archive task failed: {0}")]
    Task(String),
}
