//! Image download side effects for accepted product records.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::error::ImageError;

/// Maximum length of the filename stem derived from a product title.
const MAX_STEM_CHARS: usize = 50;
const IMAGE_EXTENSION: &str = "jpg";

/// Derives the destination path for a product's image from its title.
///
/// Spaces become underscores, the stem is truncated to 50 characters, and a
/// fixed `.jpg` extension is appended. Case is preserved. Two products whose
/// titles coincide within the first 50 characters map to the same path and
/// silently overwrite each other — a known limitation of title-derived
/// naming, kept for output compatibility.
#[must_use]
pub fn image_path(image_dir: &Path, title: &str) -> PathBuf {
    let stem: String = title.replace(' ', "_").chars().take(MAX_STEM_CHARS).collect();
    image_dir.join(format!("{stem}.{IMAGE_EXTENSION}"))
}

/// Downloads a product image to durable storage.
pub struct ImageAcquirer {
    client: Client,
}

impl ImageAcquirer {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Streams the resource at `image_ref` to `dest`, creating any missing
    /// parent directories first.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] on any transport, status, or filesystem
    /// failure. Callers treat every variant as per-record recoverable.
    pub async fn acquire(&self, image_ref: &str, dest: &Path) -> Result<(), ImageError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut response = self.client.get(image_ref).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::UnexpectedStatus {
                status: status.as_u16(),
                url: image_ref.to_owned(),
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }
}
