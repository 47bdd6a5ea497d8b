//! CLI for the icondl icon downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use icondl_core::config::{self, IcondlConfig};
use std::path::PathBuf;

use commands::{run_completions, run_fetch, run_scan};

/// Top-level CLI for the icondl icon downloader.
#[derive(Debug, Parser)]
#[command(name = "icondl")]
#[command(about = "icondl: bulk icon downloader for infinite-scroll catalog pages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Crawl catalog pages, download every icon at 1024px and zip the result.
    Fetch {
        /// Catalog page URLs. `-` reads whitespace-separated URLs from stdin.
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,

        /// Archive destination: a file path or an existing directory (default: current directory).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Process up to N pages at once (overrides config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,

        /// Fetch up to N icons at once per page (overrides config).
        #[arg(long, value_name = "N")]
        downloads: Option<usize>,

        /// WebDriver endpoint of the remote browser (overrides config).
        #[arg(long, value_name = "URL")]
        webdriver: Option<String>,
    },

    /// Crawl one catalog page and print its icon table (Name, Srcset, Href) as CSV.
    Scan {
        /// Catalog page URL.
        url: String,

        /// WebDriver endpoint of the remote browser (overrides config).
        #[arg(long, value_name = "URL")]
        webdriver: Option<String>,
    },

    /// Print a shell completion script to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Applies command-line overrides on top of the loaded config.
fn apply_overrides(
    mut cfg: IcondlConfig,
    jobs: Option<usize>,
    downloads: Option<usize>,
    webdriver: Option<String>,
) -> IcondlConfig {
    if let Some(n) = jobs {
        cfg.max_concurrent_jobs = n.max(1);
    }
    if let Some(n) = downloads {
        cfg.max_concurrent_downloads = n.max(1);
    }
    if let Some(url) = webdriver {
        cfg.webdriver_url = url;
    }
    cfg
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Fetch {
                urls,
                output,
                jobs,
                downloads,
                webdriver,
            } => {
                let cfg = apply_overrides(config::load_or_init()?, jobs, downloads, webdriver);
                tracing::debug!("loaded config: {:?}", cfg);
                run_fetch(&cfg, &urls, output.as_deref()).await?;
            }
            CliCommand::Scan { url, webdriver } => {
                let cfg = apply_overrides(config::load_or_init()?, None, None, webdriver);
                tracing::debug!("loaded config: {:?}", cfg);
                run_scan(&cfg, &url).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
