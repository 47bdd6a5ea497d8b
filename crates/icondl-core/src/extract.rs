//! Icon extraction from rendered catalog markup.
//!
//! Each catalog tile is a container element holding an `<img>` (alt text and
//! srcset) and a link to the icon's detail page.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::naming::sanitize_stem;

/// Literal token the site appends to every alt text.
const ALT_SUFFIX: &str = " icon";

/// One icon tile as found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRecord {
    /// Filesystem-safe stem derived from the alt text.
    pub name: String,
    /// Raw srcset, not yet rewritten.
    pub source_reference: String,
    /// Detail-page href; empty if the tile had no link.
    pub link: String,
}

/// CSS selectors describing the site's tile markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    pub tile: String,
    pub image: String,
    pub link: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            tile: "div.grid-icons__item.app-grid-icon".to_string(),
            image: "img".to_string(),
            link: "a.app-grid-icon__link".to_string(),
        }
    }
}

struct Compiled {
    tile: Selector,
    image: Selector,
    link: Selector,
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

impl Selectors {
    fn compile(&self) -> Result<Compiled, ExtractError> {
        Ok(Compiled {
            tile: compile(&self.tile)?,
            image: compile(&self.image)?,
            link: compile(&self.link)?,
        })
    }
}

/// Parses rendered markup into icon records, in document order.
///
/// Tiles without an image, a srcset or a usable name are skipped. A page with
/// no tile at all is `NoIconsFound`: it usually means the markup changed or
/// the page failed to render.
pub fn extract_icons(markup: &str, selectors: &Selectors) -> Result<Vec<IconRecord>, ExtractError> {
    let compiled = selectors.compile()?;
    let document = Html::parse_document(markup);

    let mut tiles = 0usize;
    let mut records = Vec::new();
    for tile in document.select(&compiled.tile) {
        tiles += 1;
        match record_from_tile(tile, &compiled) {
            Some(record) => records.push(record),
            None => tracing::debug!(tile = tiles, "skipping incomplete icon tile"),
        }
    }

    if tiles == 0 {
        return Err(ExtractError::NoIconsFound);
    }
    tracing::debug!(tiles, records = records.len(), "extracted icon records");
    Ok(records)
}

fn record_from_tile(tile: ElementRef<'_>, selectors: &Compiled) -> Option<IconRecord> {
    let img = tile.select(&selectors.image).next()?;
    let srcset = img.value().attr("srcset")?.trim();
    if srcset.is_empty() {
        return None;
    }
    let alt = img.value().attr("alt").unwrap_or("").trim();
    let name = sanitize_stem(alt.strip_suffix(ALT_SUFFIX).unwrap_or(alt));
    if name.is_empty() {
        return None;
    }
    let link = tile
        .select(&selectors.link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .unwrap_or("")
        .to_string();
    Some(IconRecord {
        name,
        source_reference: srcset.to_string(),
        link,
    })
}

/// Extraction results in the `Name, Srcset, Href` tabular form.
#[derive(Debug, Clone, Default)]
pub struct IconTable {
    rows: Vec<IconRecord>,
}

impl IconTable {
    pub const HEADER: [&'static str; 3] = ["Name", "Srcset", "Href"];

    pub fn new(rows: Vec<IconRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the table as CSV (CRLF records, quoting where needed) with a header row.
    pub fn to_csv(&self) -> csv::Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(Vec::new());
        writer.write_record(Self::HEADER)?;
        for r in &self.rows {
            writer.write_record([&r.name, &r.source_reference, &r.link])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        // every field came from a &str
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(alt: &str, srcset: Option<&str>, href: Option<&str>) -> String {
        let srcset = srcset
            .map(|s| format!(" srcset=\"{s}\""))
            .unwrap_or_default();
        let link = href
            .map(|h| format!("<a class=\"app-grid-icon__link\" href=\"{h}\"></a>"))
            .unwrap_or_default();
        format!(
            "<div class=\"grid-icons__item app-grid-icon\">{link}<img alt=\"{alt}\"{srcset}></div>"
        )
    }

    fn page(tiles: &[String]) -> String {
        format!("<html><body><div class=\"grid-icons\">{}</div></body></html>", tiles.concat())
    }

    #[test]
    fn extracts_well_formed_tiles_in_order() {
        let html = page(&[
            tile("Leaf icon", Some("https://img.example/leaf?size=48 1x"), Some("/icon/leaf")),
            tile("Rain icon", Some("https://img.example/rain?size=48 1x"), Some("/icon/rain")),
            tile("Sun icon", Some("https://img.example/sun?size=48 1x"), Some("/icon/sun")),
        ]);
        let records = extract_icons(&html, &Selectors::default()).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Leaf", "Rain", "Sun"]);
        assert_eq!(records[0].source_reference, "https://img.example/leaf?size=48 1x");
        assert_eq!(records[2].link, "/icon/sun");
    }

    #[test]
    fn no_tiles_is_an_error() {
        let html = "<html><body><p>Nothing here</p></body></html>";
        assert!(matches!(
            extract_icons(html, &Selectors::default()),
            Err(ExtractError::NoIconsFound)
        ));
    }

    #[test]
    fn incomplete_tiles_are_skipped() {
        let html = page(&[
            tile("Leaf icon", None, Some("/icon/leaf")),
            "<div class=\"grid-icons__item app-grid-icon\"><span>no image</span></div>".to_string(),
            tile("", Some("https://img.example/blank?size=48"), None),
            tile("Moon icon", Some("https://img.example/moon?size=96 2x"), None),
        ]);
        let records = extract_icons(&html, &Selectors::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Moon");
        assert_eq!(records[0].link, "");
    }

    #[test]
    fn only_trailing_suffix_stripped() {
        let html = page(&[tile(
            "Iconic icon Star icon",
            Some("https://img.example/star?size=48"),
            None,
        )]);
        let records = extract_icons(&html, &Selectors::default()).unwrap();
        assert_eq!(records[0].name, "Iconic icon Star");
    }

    #[test]
    fn names_are_filesystem_safe() {
        let html = page(&[tile(
            "Up/Down icon",
            Some("https://img.example/arrows?size=48"),
            None,
        )]);
        let records = extract_icons(&html, &Selectors::default()).unwrap();
        assert_eq!(records[0].name, "Up_Down");
    }

    #[test]
    fn invalid_selector_reported() {
        let selectors = Selectors {
            tile: "div[".to_string(),
            ..Selectors::default()
        };
        assert!(matches!(
            extract_icons("<html></html>", &selectors),
            Err(ExtractError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn table_renders_header_and_quotes() {
        let table = IconTable::new(vec![IconRecord {
            name: "Leaf".into(),
            source_reference: "https://img.example/leaf?size=48 1x, https://img.example/leaf?size=96 2x".into(),
            link: "/icon/leaf".into(),
        }]);
        let csv = table.to_csv().unwrap();
        assert!(csv.ends_with("/icon/leaf\r\n"));
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Name,Srcset,Href"));
        assert_eq!(
            lines.next(),
            Some("Leaf,\"https://img.example/leaf?size=48 1x, https://img.example/leaf?size=96 2x\",/icon/leaf")
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_escapes_quotes_and_keeps_empty_links() {
        let table = IconTable::new(vec![IconRecord {
            name: "Say \"hi\"".into(),
            source_reference: "https://img.example/hi?size=48".into(),
            link: String::new(),
        }]);
        let csv = table.to_csv().unwrap();
        assert_eq!(
            csv,
            "Name,Srcset,Href\r\n\"Say \"\"hi\"\"\",https://img.example/hi?size=48,\r\n"
        );
        assert!(IconTable::default().is_empty());
    }
}
