//! Fingerprint-based change detection for accepted product records.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use shelfwatch_core::ProductRecord;

/// Content-addressed identity of a product record: the SHA-256 digest of the
/// concatenated title and price, as lowercase hex.
///
/// Two records with identical title and price always produce the same
/// fingerprint. Not stored on the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    #[must_use]
    pub fn of(record: &ProductRecord) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(record.product_title.as_bytes());
        hasher.update(record.product_price.to_string().as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    price: f64,
    recorded_at: DateTime<Utc>,
}

/// In-memory record of previously accepted products.
///
/// Owned by the orchestrator (behind a single-writer lock) rather than living
/// in process-global state. Entries never expire: once recorded, a product is
/// skipped for the cache's whole lifetime unless its price changes.
#[derive(Debug, Default)]
pub struct ChangeCache {
    entries: HashMap<Fingerprint, CacheEntry>,
}

impl ChangeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` iff an entry exists for the record's fingerprint and
    /// its stored price exactly equals the record's price. Any other state
    /// (no entry, or a differing price) means the record must be processed.
    #[must_use]
    pub fn should_process(&self, record: &ProductRecord) -> bool {
        match self.entries.get(&Fingerprint::of(record)) {
            Some(entry) => entry.price != record.product_price,
            None => true,
        }
    }

    /// Unconditionally inserts or overwrites the entry for the record's
    /// fingerprint with its current price and the current timestamp.
    pub fn record(&mut self, record: &ProductRecord) {
        self.entries.insert(
            Fingerprint::of(record),
            CacheEntry {
                price: record.product_price,
                recorded_at: Utc::now(),
            },
        );
    }

    /// When the entry for `record` was last written, if present.
    #[must_use]
    pub fn recorded_at(&self, record: &ProductRecord) -> Option<DateTime<Utc>> {
        self.entries
            .get(&Fingerprint::of(record))
            .map(|entry| entry.recorded_at)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, price: f64) -> ProductRecord {
        ProductRecord {
            product_title: title.to_owned(),
            product_price: price,
            image_ref: "https://cdn.example.com/img.jpg".to_owned(),
        }
    }

    #[test]
    fn fingerprint_is_deterministic_for_same_title_and_price() {
        let a = record("Dental Mirror", 120.0);
        let b = record("Dental Mirror", 120.0);
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn fingerprint_differs_when_price_differs() {
        let a = record("Dental Mirror", 120.0);
        let b = record("Dental Mirror", 130.0);
        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn fingerprint_ignores_image_ref() {
        let a = record("Dental Mirror", 120.0);
        let mut b = record("Dental Mirror", 120.0);
        b.image_ref = "https://cdn.example.com/other.jpg".to_owned();
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn unknown_record_must_be_processed() {
        let cache = ChangeCache::new();
        assert!(cache.should_process(&record("New Product", 50.0)));
    }

    #[test]
    fn recorded_record_is_skipped_on_second_sight() {
        let mut cache = ChangeCache::new();
        let r = record("Dental Mirror", 120.0);
        cache.record(&r);
        assert!(!cache.should_process(&r));
    }

    #[test]
    fn price_change_forces_reprocessing() {
        let mut cache = ChangeCache::new();
        cache.record(&record("Dental Mirror", 120.0));
        assert!(cache.should_process(&record("Dental Mirror", 99.0)));
    }

    #[test]
    fn record_overwrites_existing_entry() {
        let mut cache = ChangeCache::new();
        let r = record("Dental Mirror", 120.0);
        cache.record(&r);
        cache.record(&r);
        assert_eq!(cache.len(), 1);
        assert!(cache.recorded_at(&r).is_some());
    }
}
