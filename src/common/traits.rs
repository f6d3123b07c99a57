//! Shared traits and interfaces
//!
//! Seams the export pipeline is written against, so tests can substitute
//! the network.

use crate::export::ExportError;
use async_trait::async_trait;

/// Parallel image resolutions when the embedder does not say otherwise
pub const DEFAULT_IMAGE_CONCURRENCY: usize = 4;

/// Resolves a remote image into embeddable data
#[async_trait]
pub trait ImageEmbedder: Send + Sync {
    /// Fetch `url` and return a self-contained `data:` URI
    async fn embed(&self, url: &str) -> Result<String, ExportError>;

    /// Upper bound on concurrent [`embed`](Self::embed) calls
    fn concurrency(&self) -> usize {
        DEFAULT_IMAGE_CONCURRENCY
    }
}
