pub mod cache;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod image;
pub mod pipeline;
mod retry;

pub use cache::{ChangeCache, Fingerprint};
pub use error::{CardFault, ImageError, ScraperError};
pub use extract::extract_products;
pub use fetch::PageFetcher;
pub use image::ImageAcquirer;
pub use pipeline::ScrapeOrchestrator;
