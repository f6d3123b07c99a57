//! Image embedding for offline reports
//!
//! Referenced screenshots are fetched once per distinct URL with bounded
//! concurrency and inlined as `data:` URIs. A URL that cannot be resolved
//! keeps pointing at the original location.

use super::ExportError;
use crate::api::client::BaseClient;
use crate::common::traits::{ImageEmbedder, DEFAULT_IMAGE_CONCURRENCY};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Embedder that downloads images through the authenticated client
pub struct HttpImageEmbedder {
    client: BaseClient,
    concurrency: usize,
}

impl HttpImageEmbedder {
    pub fn new(client: BaseClient, concurrency: usize) -> Self {
        Self { client, concurrency }
    }
}

#[async_trait]
impl ImageEmbedder for HttpImageEmbedder {
    async fn embed(&self, url: &str) -> Result<String, ExportError> {
        let failed = |reason: String| ExportError::Image {
            url: url.to_string(),
            reason,
        };

        let fetched = self
            .client
            .fetch_bytes(url)
            .await
            .map_err(|e| failed(e.to_string()))?;
        if fetched.bytes.is_empty() {
            return Err(failed("empty response".to_string()));
        }
        let mime = image_mime(fetched.content_type.as_deref(), url)
            .ok_or_else(|| failed("response is not an image".to_string()))?;

        Ok(data_uri(&mime, &fetched.bytes))
    }

    fn concurrency(&self) -> usize {
        if self.concurrency == 0 {
            DEFAULT_IMAGE_CONCURRENCY
        } else {
            self.concurrency
        }
    }
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// MIME type from the `Content-Type` header, else from the URL extension
pub fn image_mime(content_type: Option<&str>, url: &str) -> Option<String> {
    if let Some(declared) = content_type {
        let essence = declared.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        if essence.starts_with("image/") {
            return Some(essence);
        }
    }

    let path = url.split(['?', '#']).next().unwrap_or_default();
    let extension = path.rsplit_once('.')?.1.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime.to_string())
}

/// Resolve every URL once; the result only holds the successes
pub async fn resolve_images(urls: Vec<String>, embedder: &dyn ImageEmbedder) -> HashMap<String, String> {
    let limit = embedder.concurrency().max(1);
    let total = urls.len();

    let resolved: HashMap<String, String> = stream::iter(urls)
        .map(|url| async move {
            let result = embedder.embed(&url).await;
            (url, result)
        })
        .buffer_unordered(limit)
        .filter_map(|(url, result)| async move {
            match result {
                Ok(data) => Some((url, data)),
                Err(e) => {
                    warn!("Keeping remote image reference: {}", e);
                    None
                }
            }
        })
        .collect()
        .await;

    debug!("Embedded {}/{} images", resolved.len(), total);
    resolved
}
