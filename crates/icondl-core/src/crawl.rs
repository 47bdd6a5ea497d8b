//! Infinite-scroll crawling of a catalog page through a remote browser.
//!
//! The crawler keeps scrolling the last tile into view until a recount after
//! the settle interval shows no new tiles, then returns the rendered markup.
//! Browser access goes through [`BrowserConnector`] / [`BrowserSession`] so the
//! loop can be driven by a WebDriver endpoint or by a test double.

use std::time::Duration;

use crate::error::CrawlError;

/// One exclusive browser session. All calls block the current thread.
pub trait BrowserSession: Send {
    fn navigate(&mut self, url: &str) -> Result<(), CrawlError>;
    /// Number of elements currently matching `selector`.
    fn count_tiles(&mut self, selector: &str) -> Result<usize, CrawlError>;
    /// Scrolls the last element matching `selector` into view (no-op when none match).
    fn scroll_to_last_tile(&mut self, selector: &str) -> Result<(), CrawlError>;
    fn page_source(&mut self) -> Result<String, CrawlError>;
    fn quit(&mut self) -> Result<(), CrawlError>;
}

/// Opens browser sessions; shared by all jobs of a run.
pub trait BrowserConnector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn BrowserSession>, CrawlError>;
}

/// Parameters of the scroll-stabilization loop.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub tile_selector: String,
    /// Wait after each scroll before recounting.
    pub settle: Duration,
    /// Upper bound on scroll cycles; exceeding it fails with `CrawlTimeout`.
    pub max_scroll_rounds: u32,
}

/// Rendered page after the tile count stabilized.
#[derive(Debug, Clone)]
pub struct CrawlOutput {
    pub markup: String,
    /// Tile count at the final recount.
    pub tiles: usize,
    /// Scroll-wait-recount cycles performed.
    pub rounds: u32,
}

/// Quits the session when dropped, so every exit path (including panics) releases it.
struct SessionGuard {
    session: Box<dyn BrowserSession>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.session.quit() {
            tracing::warn!("browser session teardown failed: {}", e);
        }
    }
}

/// Loads `url` and scrolls until no new tiles appear, returning the final markup.
///
/// Blocking; call from `spawn_blocking` when used from async code.
pub fn crawl_page(
    connector: &dyn BrowserConnector,
    url: &str,
    opts: &CrawlOptions,
) -> Result<CrawlOutput, CrawlError> {
    let mut guard = SessionGuard {
        session: connector.connect()?,
    };
    let session = guard.session.as_mut();
    let selector = opts.tile_selector.as_str();

    session.navigate(url)?;
    let mut known = session.count_tiles(selector)?;
    let mut rounds = 0u32;

    loop {
        if rounds >= opts.max_scroll_rounds {
            return Err(CrawlError::CrawlTimeout { rounds });
        }
        if known > 0 {
            session.scroll_to_last_tile(selector)?;
        }
        if !opts.settle.is_zero() {
            std::thread::sleep(opts.settle);
        }
        let recount = session.count_tiles(selector)?;
        rounds += 1;
        tracing::debug!(url, round = rounds, before = known, after = recount, "scroll round");
        if recount <= known {
            known = recount;
            break;
        }
        known = recount;
    }

    let markup = session.page_source()?;
    drop(guard);
    tracing::info!(url, tiles = known, rounds, "page stabilized");
    Ok(CrawlOutput {
        markup,
        tiles: known,
        rounds,
    })
}
