//! `icondl scan` – crawl one page and print its icon table.

use anyhow::{bail, Result};
use icondl_core::config::IcondlConfig;
use icondl_core::crawl::crawl_page;
use icondl_core::extract::{extract_icons, IconTable};
use icondl_core::input::parse_source_urls;
use icondl_core::webdriver::WebDriverConnector;

pub async fn run_scan(cfg: &IcondlConfig, url: &str) -> Result<()> {
    let Some(url) = parse_source_urls(url).into_iter().next() else {
        bail!("not an http(s) URL: {}", url);
    };

    let connector = WebDriverConnector::new(&cfg.webdriver_url, &cfg.http());
    let opts = cfg.crawl_options();
    let selectors = cfg.selectors();
    let table = tokio::task::spawn_blocking(move || -> Result<IconTable> {
        let page = crawl_page(&connector, &url, &opts)?;
        let records = extract_icons(&page.markup, &selectors)?;
        tracing::info!(url = %url, tiles = page.tiles, icons = records.len(), "scan complete");
        Ok(IconTable::new(records))
    })
    .await??;

    if table.is_empty() {
        tracing::warn!("page had tiles but none with a usable image and name");
    }
    print!("{}", table.to_csv()?);
    Ok(())
}
