//! Integration tests for `ScrapeOrchestrator::run`.
//!
//! Uses `wiremock` to stand up a local HTTP server per test, serving both
//! catalog pages and image bytes, so no real network traffic is made.
//! Filesystem side effects land in a `tempfile` directory.

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfwatch_core::ScrapeSettings;
use shelfwatch_scraper::{ImageAcquirer, PageFetcher, ScrapeOrchestrator, ScraperError};

const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

fn card(title: &str, price: &str, image_url: &str) -> String {
    format!(
        r#"<li class="product">
          <div class="product-inner">
            <div class="mf-product-thumbnail"><img src="placeholder.svg" data-lazy-src="{image_url}"></div>
            <div class="mf-product-content"><h2>{title}</h2></div>
            <span class="price"><bdi>{price}</bdi></span>
          </div>
        </li>"#
    )
}

fn page_html(cards: &[String]) -> String {
    format!(
        "<html><body><ul class=\"products\">{}</ul></body></html>",
        cards.join("\n")
    )
}

/// Builds an orchestrator pointed at the mock server, with `max_attempts`
/// fetch attempts and zero retry delay.
fn orchestrator(server_uri: &str, max_attempts: u32, image_dir: PathBuf) -> ScrapeOrchestrator {
    let fetcher = PageFetcher::new(5, "shelfwatch-test/0.1", max_attempts, Duration::ZERO)
        .expect("failed to build test PageFetcher");
    let acquirer = ImageAcquirer::new(reqwest::Client::new());
    ScrapeOrchestrator::new(
        fetcher,
        acquirer,
        format!("{server_uri}/shop/page/{{page}}/"),
        image_dir,
    )
}

async fn mount_page(server: &MockServer, page: u32, html: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/shop/page/{page}/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, image_path: &str) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG_BYTES))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// End-to-end: 2 pages × 3 cards, empty cache
// ---------------------------------------------------------------------------

#[tokio::test]
async fn two_pages_of_three_cards_yield_six_records_in_order() {
    let server = MockServer::start().await;
    let images = TempDir::new().expect("tempdir");

    let uri = server.uri();
    let titles = [
        ["Mirror", "Probe", "Scaler"],
        ["Forceps", "Elevator", "Curette"],
    ];
    for (page_idx, page_titles) in titles.iter().enumerate() {
        let cards: Vec<String> = page_titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                card(
                    title,
                    &format!("₹{}.00", 100 + page_idx * 10 + i),
                    &format!("{uri}/img/{title}.jpg"),
                )
            })
            .collect();
        mount_page(&server, u32::try_from(page_idx).unwrap() + 1, &page_html(&cards)).await;
        for title in page_titles {
            mount_image(&server, &format!("/img/{title}.jpg")).await;
        }
    }

    let orchestrator = orchestrator(&uri, 1, images.path().to_path_buf());
    let settings = ScrapeSettings { max_pages: Some(2) };
    let records = orchestrator.run(&settings).await.expect("run failed");

    let got: Vec<&str> = records.iter().map(|r| r.product_title.as_str()).collect();
    assert_eq!(
        got,
        vec!["Mirror", "Probe", "Scaler", "Forceps", "Elevator", "Curette"],
        "records must preserve page-then-document order"
    );
    assert_eq!(orchestrator.cached_entries().await, 6);

    // Images were streamed to disk under title-derived names.
    for title in titles.iter().flatten() {
        let path = images.path().join(format!("{title}.jpg"));
        let bytes = std::fs::read(&path)
            .unwrap_or_else(|e| panic!("missing image file {}: {e}", path.display()));
        assert_eq!(bytes, JPEG_BYTES);
    }
}

// ---------------------------------------------------------------------------
// Idempotence: second run over unchanged pages yields nothing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_run_over_unchanged_pages_is_empty() {
    let server = MockServer::start().await;
    let images = TempDir::new().expect("tempdir");
    let uri = server.uri();

    let html = page_html(&[
        card("Mirror", "₹120.00", &format!("{uri}/img/mirror.jpg")),
        card("Probe", "₹340.00", &format!("{uri}/img/probe.jpg")),
    ]);
    mount_page(&server, 1, &html).await;
    mount_image(&server, "/img/mirror.jpg").await;
    mount_image(&server, "/img/probe.jpg").await;

    let orchestrator = orchestrator(&uri, 1, images.path().to_path_buf());
    let settings = ScrapeSettings { max_pages: Some(1) };

    let first = orchestrator.run(&settings).await.expect("first run");
    assert_eq!(first.len(), 2);

    let second = orchestrator.run(&settings).await.expect("second run");
    assert!(
        second.is_empty(),
        "warm cache must suppress all unchanged records, got: {second:?}"
    );
    assert_eq!(orchestrator.cached_entries().await, 2);
}

// ---------------------------------------------------------------------------
// Change detection: a price change re-includes the product
// ---------------------------------------------------------------------------

#[tokio::test]
async fn price_change_between_runs_reincludes_the_product() {
    let server = MockServer::start().await;
    let images = TempDir::new().expect("tempdir");
    let uri = server.uri();

    let image_url = format!("{uri}/img/mirror.jpg");
    mount_image(&server, "/img/mirror.jpg").await;

    // First fetch of page 1 sees ₹120, every later fetch sees ₹99.
    Mock::given(method("GET"))
        .and(path("/shop/page/1/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page_html(&[card("Mirror", "₹120.00", &image_url)])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        1,
        &page_html(&[card("Mirror", "₹99.00", &image_url)]),
    )
    .await;

    let orchestrator = orchestrator(&uri, 1, images.path().to_path_buf());
    let settings = ScrapeSettings { max_pages: Some(1) };

    let first = orchestrator.run(&settings).await.expect("first run");
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].product_price, 120.0);

    let second = orchestrator.run(&settings).await.expect("second run");
    assert_eq!(
        second.len(),
        1,
        "changed price must be reprocessed even though the title matches"
    );
    assert_eq!(second[0].product_price, 99.0);
}

// ---------------------------------------------------------------------------
// Fetch retry: fail twice then succeed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn page_fetch_recovers_after_two_transient_failures() {
    let server = MockServer::start().await;
    let images = TempDir::new().expect("tempdir");
    let uri = server.uri();

    let image_url = format!("{uri}/img/mirror.jpg");
    mount_image(&server, "/img/mirror.jpg").await;

    Mock::given(method("GET"))
        .and(path("/shop/page/1/"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_page(
        &server,
        1,
        &page_html(&[card("Mirror", "₹120.00", &image_url)]),
    )
    .await;

    let orchestrator = orchestrator(&uri, 3, images.path().to_path_buf());
    let settings = ScrapeSettings { max_pages: Some(1) };

    let records = orchestrator.run(&settings).await.expect("run failed");
    assert_eq!(records.len(), 1, "page must be returned after retries");
}

// ---------------------------------------------------------------------------
// Fetch exhaustion: fatal, later pages never attempted
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_exhaustion_is_fatal_and_stops_the_run() {
    let server = MockServer::start().await;
    let images = TempDir::new().expect("tempdir");
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/shop/page/1/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    // Page 2 must never be requested once page 1 exhausts its attempts.
    Mock::given(method("GET"))
        .and(path("/shop/page/2/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_html(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&uri, 3, images.path().to_path_buf());
    let settings = ScrapeSettings { max_pages: Some(2) };

    let result = orchestrator.run(&settings).await;
    match result {
        Err(ScraperError::FetchExhausted { attempts, source, .. }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(
                *source,
                ScraperError::UnexpectedStatus { status: 500, .. }
            ));
        }
        other => panic!("expected FetchExhausted, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Image failure: per-record recoverable
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_image_download_excludes_only_that_record() {
    let server = MockServer::start().await;
    let images = TempDir::new().expect("tempdir");
    let uri = server.uri();

    let html = page_html(&[
        card("Mirror", "₹120.00", &format!("{uri}/img/mirror.jpg")),
        card("Probe", "₹340.00", &format!("{uri}/img/missing.jpg")),
        card("Scaler", "₹85.00", &format!("{uri}/img/scaler.jpg")),
    ]);
    mount_page(&server, 1, &html).await;
    mount_image(&server, "/img/mirror.jpg").await;
    mount_image(&server, "/img/scaler.jpg").await;
    // "/img/missing.jpg" is unmatched and returns wiremock's 404.

    let orchestrator = orchestrator(&uri, 1, images.path().to_path_buf());
    let settings = ScrapeSettings { max_pages: Some(1) };

    let records = orchestrator.run(&settings).await.expect("run failed");
    let titles: Vec<&str> = records.iter().map(|r| r.product_title.as_str()).collect();
    assert_eq!(titles, vec!["Mirror", "Scaler"]);
    assert_eq!(
        orchestrator.cached_entries().await,
        2,
        "excluded record must not be cached"
    );
}

// ---------------------------------------------------------------------------
// Extraction faults: isolated per card within a live run
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_cards_are_dropped_without_aborting_the_page() {
    let server = MockServer::start().await;
    let images = TempDir::new().expect("tempdir");
    let uri = server.uri();

    let html = page_html(&[
        card("Mirror", "₹120.00", &format!("{uri}/img/mirror.jpg")),
        // Non-http image reference: skipped before any network attempt.
        card("Bad Image", "₹50.00", "data:image/gif;base64,R0lGOD"),
        // Unparseable price: skipped.
        card("No Price", "Call for price", &format!("{uri}/img/x.jpg")),
    ]);
    mount_page(&server, 1, &html).await;
    mount_image(&server, "/img/mirror.jpg").await;

    let orchestrator = orchestrator(&uri, 1, images.path().to_path_buf());
    let settings = ScrapeSettings { max_pages: Some(1) };

    let records = orchestrator.run(&settings).await.expect("run failed");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].product_title, "Mirror");
}
