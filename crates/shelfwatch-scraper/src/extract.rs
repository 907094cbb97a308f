//! Product-card extraction from catalog page markup.
//!
//! Each card is parsed independently: a fault in one card drops that card
//! only and never aborts the page. The skip decision is a tagged result
//! ([`CardFault`]) so it stays visible to tests instead of being swallowed.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use shelfwatch_core::ProductRecord;

use crate::error::CardFault;

const CARD_SELECTOR: &str = ".product-inner";
const TITLE_SELECTOR: &str = ".mf-product-content";
const PRICE_SELECTOR: &str = ".price";
const THUMB_IMG_SELECTOR: &str = ".mf-product-thumbnail img";
const LAZY_SRC_ATTR: &str = "data-lazy-src";

static CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(CARD_SELECTOR).expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(TITLE_SELECTOR).expect("valid selector"));
static PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(PRICE_SELECTOR).expect("valid selector"));
static THUMB_IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(THUMB_IMG_SELECTOR).expect("valid selector"));

/// Parses one catalog page into zero or more product records, in document
/// order. Cards that fail to parse are logged and skipped.
#[must_use]
pub fn extract_products(html: &str) -> Vec<ProductRecord> {
    let doc = Html::parse_document(html);
    let mut records = Vec::new();

    for card in doc.select(&CARD) {
        match parse_card(&card) {
            Ok(record) => records.push(record),
            Err(fault) => {
                tracing::warn!(fault = %fault, "skipping product card");
            }
        }
    }

    records
}

/// Parses a single product card.
fn parse_card(card: &ElementRef<'_>) -> Result<ProductRecord, CardFault> {
    let title = card
        .select(&TITLE)
        .next()
        .ok_or(CardFault::MissingElement(TITLE_SELECTOR))?
        .text()
        .collect::<String>()
        .trim()
        .to_owned();
    if title.is_empty() {
        return Err(CardFault::EmptyTitle);
    }

    let price_text = card
        .select(&PRICE)
        .next()
        .ok_or(CardFault::MissingElement(PRICE_SELECTOR))?
        .text()
        .collect::<String>();
    let price = parse_price(&price_text)
        .ok_or_else(|| CardFault::PriceUnparseable(price_text.trim().to_owned()))?;

    let image_ref = card
        .select(&THUMB_IMG)
        .next()
        .and_then(|img| img.value().attr(LAZY_SRC_ATTR))
        .map(str::to_owned);
    let image_ref = match image_ref {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => url,
        other => return Err(CardFault::InvalidImageRef(other)),
    };

    Ok(ProductRecord {
        product_title: title,
        product_price: price,
        image_ref,
    })
}

/// Parses a displayed price string into a non-negative decimal.
///
/// The string is truncated at the first decimal point (keeping only the
/// integer-currency portion), then stripped of everything that is not a
/// digit or a dot: `"$1,234.50"` parses to `1234`.
fn parse_price(raw: &str) -> Option<f64> {
    let integer_part = raw.split('.').next().unwrap_or(raw);
    let cleaned: String = integer_part
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|price| *price >= 0.0)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
