//! Bounded fan-out of asset downloads for one job.
//!
//! Every asset gets exactly one outcome; failures are logged and counted but
//! never fail the job.

use std::path::Path;
use std::sync::Arc;

use crate::downloader::AssetFetcher;
use crate::error::DownloadError;
use crate::pool::WorkerPool;
use crate::rewrite::RewrittenAsset;

/// An asset that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFailure {
    pub name: String,
    pub download_url: String,
    pub reason: String,
}

/// Outcome of one job's downloads.
#[derive(Debug, Clone, Default)]
pub struct DownloadSummary {
    pub succeeded: usize,
    pub bytes: u64,
    pub failures: Vec<AssetFailure>,
}

impl DownloadSummary {
    /// Total terminal outcomes (successes plus failures).
    pub fn outcomes(&self) -> usize {
        self.succeeded + self.failures.len()
    }
}

#[derive(Clone)]
pub struct DownloadPool {
    pool: WorkerPool,
    fetcher: Arc<dyn AssetFetcher>,
}

impl DownloadPool {
    pub fn new(pool: WorkerPool, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self { pool, fetcher }
    }

    /// Downloads every asset into `folder` (which must exist) and waits for all of them.
    pub async fn download_all(&self, assets: Vec<RewrittenAsset>, folder: &Path) -> DownloadSummary {
        let total = assets.len();
        let folder = folder.to_path_buf();
        let results = self
            .pool
            .run(assets, |asset| {
                let fetcher = Arc::clone(&self.fetcher);
                let folder = folder.clone();
                async move {
                    let (name, url) = (asset.name.clone(), asset.download_url.clone());
                    let res = tokio::task::spawn_blocking(move || fetcher.fetch(&asset, &folder))
                        .await
                        .unwrap_or_else(|e| Err(DownloadError::Task(e.to_string())));
                    (name, url, res)
                }
            })
            .await;

        let mut summary = DownloadSummary::default();
        for res in results {
            match res {
                Ok((_, _, Ok(bytes))) => {
                    summary.succeeded += 1;
                    summary.bytes += bytes;
                }
                Ok((name, download_url, Err(e))) => {
                    tracing::warn!(asset = %name, url = %download_url, "asset download failed: {}", e);
                    summary.failures.push(AssetFailure {
                        name,
                        download_url,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("download task join: {}", e);
                    summary.failures.push(AssetFailure {
                        name: String::new(),
                        download_url: String::new(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            folder = %folder.display(),
            total,
            succeeded = summary.succeeded,
            failed = summary.failures.len(),
            "downloads finished"
        );
        summary
    }
}
