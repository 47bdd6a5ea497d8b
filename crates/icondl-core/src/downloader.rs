//! Single-asset downloader.
//!
//! One HTTP GET per icon (no retry), body written to `<folder>/<name>.png`,
//! replacing any previous file of that name.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::DownloadError;
use crate::naming::icon_file_name;
use crate::rewrite::RewrittenAsset;

/// Fetches one asset into a folder that already exists. Blocking.
pub trait AssetFetcher: Send + Sync {
    /// Returns the number of bytes written.
    fn fetch(&self, asset: &RewrittenAsset, folder: &Path) -> Result<u64, DownloadError>;
}

/// Where an asset lands inside its job folder.
pub fn asset_path(folder: &Path, asset: &RewrittenAsset) -> PathBuf {
    folder.join(icon_file_name(&asset.name))
}

/// libcurl-backed fetcher.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    connect_timeout: Duration,
    timeout: Duration,
    user_agent: String,
}

impl CurlFetcher {
    pub fn new(http: &HttpConfig) -> Self {
        Self {
            connect_timeout: http.connect_timeout(),
            timeout: http.timeout(),
            user_agent: http.user_agent.clone(),
        }
    }
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::new(&HttpConfig::default())
    }
}

impl AssetFetcher for CurlFetcher {
    fn fetch(&self, asset: &RewrittenAsset, folder: &Path) -> Result<u64, DownloadError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&asset.download_url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(DownloadError::Http(code));
        }

        // file is only touched after a 2xx
        let path = asset_path(folder, asset);
        std::fs::write(&path, &body).map_err(|source| DownloadError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(asset = %asset.name, bytes = body.len(), path = %path.display(), "asset saved");
        Ok(body.len() as u64)
    }
}
