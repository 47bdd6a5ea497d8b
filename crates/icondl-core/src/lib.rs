pub mod config;
pub mod error;
pub mod logging;

// Pipeline
pub mod archive;
pub mod crawl;
pub mod download_pool;
pub mod downloader;
pub mod extract;
pub mod input;
pub mod job;
pub mod naming;
pub mod orchestrator;
pub mod pool;
pub mod rewrite;
pub mod webdriver;

pub use orchestrator::{Orchestrator, RunEvent, RunOutcome, RunReport};
