use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::crawl::CrawlOptions;
use crate::extract::Selectors;

/// HTTP client parameters shared by asset downloads and the WebDriver client
/// (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent sent with asset requests.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 120,
            user_agent: concat!("icondl/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/icondl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcondlConfig {
    /// WebDriver endpoint of the remote browser.
    pub webdriver_url: String,
    /// Maximum jobs (source URLs) processed at once.
    pub max_concurrent_jobs: usize,
    /// Maximum asset fetches in flight per job.
    pub max_concurrent_downloads: usize,
    /// Wait after each scroll before recounting tiles, in milliseconds.
    pub scroll_settle_ms: u64,
    /// Scroll cycles allowed before a crawl is abandoned.
    pub max_scroll_rounds: u32,
    /// Optional HTTP section; if missing, built-in defaults are used.
    #[serde(default)]
    pub http: Option<HttpConfig>,
    /// Optional selector overrides for the catalog markup.
    #[serde(default)]
    pub selectors: Option<Selectors>,
}

impl Default for IcondlConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://selenium:4444/wd/hub".to_string(),
            max_concurrent_jobs: 10,
            max_concurrent_downloads: 10,
            scroll_settle_ms: 5000,
            max_scroll_rounds: 200,
            http: None,
            selectors: None,
        }
    }
}

impl IcondlConfig {
    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }

    pub fn selectors(&self) -> Selectors {
        self.selectors.clone().unwrap_or_default()
    }

    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            tile_selector: self.selectors().tile,
            settle: Duration::from_millis(self.scroll_settle_ms),
            max_scroll_rounds: self.max_scroll_rounds.max(1),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("icondl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<IcondlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = IcondlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: IcondlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
