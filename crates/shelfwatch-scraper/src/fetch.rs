//! Retrying page fetcher for catalog listing pages.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::retry::retry_fixed;

/// Fetches raw markup for one catalog page URL, with bounded retry.
///
/// Sends a plain GET with a browser-like `User-Agent`. Transport failures
/// and non-success statuses are both retried up to `max_attempts` total
/// attempts with a fixed delay in between. Exhaustion is fatal for the whole
/// scrape run — the caller propagates [`ScraperError::FetchExhausted`]
/// instead of skipping the page.
pub struct PageFetcher {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with a configured timeout, `User-Agent`, and
    /// retry policy.
    ///
    /// `max_attempts` counts the first try; `retry_delay` is the fixed sleep
    /// between attempts (use [`Duration::ZERO`] in tests).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_attempts,
            retry_delay,
        })
    }

    /// Wraps an existing client, sharing its connection pool.
    #[must_use]
    pub fn with_client(client: Client, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_attempts,
            retry_delay,
        }
    }

    /// Fetches the markup of `url`, retrying per the configured policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::FetchExhausted`] carrying the last underlying
    /// cause once all attempts fail.
    pub async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        retry_fixed(self.max_attempts, self.retry_delay, || {
            let url = url.to_owned();
            async move {
                let response = self.client.get(&url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }
                Ok(response.text().await?)
            }
        })
        .await
        .map_err(|source| ScraperError::FetchExhausted {
            url: url.to_owned(),
            attempts: self.max_attempts,
            source: Box::new(source),
        })
    }
}
