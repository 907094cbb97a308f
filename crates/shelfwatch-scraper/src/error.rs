use thiserror::Error;

/// Run-level scraper failures.
///
/// `Http` and `UnexpectedStatus` occur per attempt inside the fetch retry
/// loop; once the retry budget is exhausted the last of them is wrapped in
/// [`ScraperError::FetchExhausted`], which is fatal for the whole run.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("failed to fetch {url} after {attempts} attempts: {source}")]
    FetchExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<ScraperError>,
    },
}

/// Per-card extraction faults.
///
/// Always recovered: the offending card is logged and dropped, the rest of
/// the page is unaffected. Modeled as a tagged result rather than swallowed
/// so the skip decision stays visible and testable.
#[derive(Debug, Error)]
pub enum CardFault {
    #[error("missing element for selector {0:?}")]
    MissingElement(&'static str),

    #[error("card has an empty title")]
    EmptyTitle,

    #[error("unparseable price text {0:?}")]
    PriceUnparseable(String),

    #[error("missing or non-http image reference: {0:?}")]
    InvalidImageRef(Option<String>),
}

/// Image download failures.
///
/// Always recovered per record: the record is excluded from the result set
/// and the run continues.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("I/O error writing image: {0}")]
    Io(#[from] std::io::Error),
}
