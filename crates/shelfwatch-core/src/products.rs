use serde::{Deserialize, Serialize};

/// Number of catalog pages scraped when a run does not specify `max_pages`.
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// A product extracted from one catalog-page card.
///
/// Field names match the persisted output document exactly, so the same
/// struct serializes both the API response and the JSON file on disk.
///
/// Invariants (enforced at extraction time, not re-checked here):
/// - `product_title` is non-empty,
/// - `product_price` is ≥ 0,
/// - `image_ref` starts with an `http://` or `https://` scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_title: String,
    pub product_price: f64,
    pub image_ref: String,
}

/// Input to one scrape run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeSettings {
    /// Number of catalog pages to crawl, starting from page 1.
    /// `None` falls back to [`DEFAULT_MAX_PAGES`].
    #[serde(default)]
    pub max_pages: Option<u32>,
}

impl ScrapeSettings {
    /// The effective page budget for a run.
    #[must_use]
    pub fn effective_max_pages(&self) -> u32 {
        self.max_pages.unwrap_or(DEFAULT_MAX_PAGES)
    }
}
