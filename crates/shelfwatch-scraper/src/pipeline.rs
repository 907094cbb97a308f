//! The scrape pipeline: pagination, extraction, change detection, and image
//! acquisition composed into one sequential run.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;

use shelfwatch_core::{AppConfig, ProductRecord, ScrapeSettings};

use crate::cache::ChangeCache;
use crate::error::ScraperError;
use crate::extract::extract_products;
use crate::fetch::PageFetcher;
use crate::image::{image_path, ImageAcquirer};

/// Drives one scrape run: iterates page numbers in order, fetches and
/// extracts each page, filters records through the change cache, downloads
/// images for new or changed records, and accumulates the accepted records.
///
/// The cache is owned here behind a single-writer lock, so concurrent runs
/// triggered by the service layer serialize their lookups and updates
/// instead of racing on shared process state. A page-fetch exhaustion is
/// fatal to the run: the error propagates and no partial result is returned.
pub struct ScrapeOrchestrator {
    fetcher: PageFetcher,
    acquirer: ImageAcquirer,
    cache: Mutex<ChangeCache>,
    page_url_template: String,
    image_dir: PathBuf,
}

impl ScrapeOrchestrator {
    /// Composes an orchestrator from already-built parts.
    ///
    /// `page_url_template` must contain a `{page}` placeholder.
    #[must_use]
    pub fn new(
        fetcher: PageFetcher,
        acquirer: ImageAcquirer,
        page_url_template: String,
        image_dir: PathBuf,
    ) -> Self {
        Self {
            fetcher,
            acquirer,
            cache: Mutex::new(ChangeCache::new()),
            page_url_template,
            image_dir,
        }
    }

    /// Builds an orchestrator from application config, sharing one HTTP
    /// client between page fetches and image downloads.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;

        let fetcher = PageFetcher::with_client(
            client.clone(),
            config.fetch_max_attempts,
            Duration::from_secs(config.fetch_retry_delay_secs),
        );
        let acquirer = ImageAcquirer::new(client);

        Ok(Self::new(
            fetcher,
            acquirer,
            config.catalog_page_url.clone(),
            config.image_dir.clone(),
        ))
    }

    /// Runs the pipeline over pages `1..=max_pages`, strictly sequentially.
    ///
    /// Accepted records preserve page order and in-page document order.
    /// Item-level faults (extraction, image download) are logged and reduce
    /// the output count without surfacing to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::FetchExhausted`] if any page fetch runs out
    /// of attempts; remaining pages are not attempted.
    pub async fn run(&self, settings: &ScrapeSettings) -> Result<Vec<ProductRecord>, ScraperError> {
        let max_pages = settings.effective_max_pages();
        let mut accepted: Vec<ProductRecord> = Vec::new();

        for page in 1..=max_pages {
            let url = self.page_url(page);
            tracing::info!(page, url = %url, "fetching catalog page");
            let html = self.fetcher.fetch(&url).await?;

            let records = extract_products(&html);
            tracing::debug!(page, extracted = records.len(), "extracted product cards");

            for record in records {
                if !self.cache.lock().await.should_process(&record) {
                    tracing::debug!(
                        title = %record.product_title,
                        "record unchanged since last run, skipping"
                    );
                    continue;
                }

                let dest = image_path(&self.image_dir, &record.product_title);
                if let Err(err) = self.acquirer.acquire(&record.image_ref, &dest).await {
                    tracing::warn!(
                        title = %record.product_title,
                        error = %err,
                        "image download failed, excluding record"
                    );
                    continue;
                }

                self.cache.lock().await.record(&record);
                accepted.push(record);
            }
        }

        tracing::info!(accepted = accepted.len(), "scrape run complete");
        Ok(accepted)
    }

    /// Number of fingerprints currently tracked by the change cache.
    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }

    fn page_url(&self, page: u32) -> String {
        self.page_url_template.replace("{page}", &page.to_string())
    }
}
