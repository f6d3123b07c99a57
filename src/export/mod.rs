//! Interactive HTML export
//!
//! Serializes one casino snapshot into a standalone HTML document that can
//! be opened offline: inline CSS and script, optionally inlined images, with
//! GEO/direction/recipient filters, collapsible emails and a detail modal.

pub mod assets;
pub mod escape;
pub mod format;
pub mod images;
pub mod loader;
pub mod render;
pub mod snapshot;

pub use escape::{escape_html, export_file_name};
pub use format::{fmt, fmt_amount, fmt_text};
pub use images::HttpImageEmbedder;
pub use loader::{load_snapshot, SnapshotOptions};
pub use snapshot::ExportSnapshot;

use crate::common::traits::ImageEmbedder;
use chrono::Utc;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Byte-order mark prefixed to the document
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("failed to render report: {0}")]
    Render(String),
    #[error("failed to embed image {url}: {reason}")]
    Image { url: String, reason: String },
    #[error("failed to write report: {0}")]
    Io(String),
}

impl From<std::fmt::Error> for ExportError {
    fn from(e: std::fmt::Error) -> Self {
        ExportError::Render(e.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e.to_string())
    }
}

/// Finished report, ready to be saved
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    /// UTF-8 with leading BOM
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    /// Document text without the BOM
    pub fn html(&self) -> &str {
        let body = self.bytes.strip_prefix(&UTF8_BOM).unwrap_or(&self.bytes);
        std::str::from_utf8(body).unwrap_or_default()
    }

    /// Write the document to `dir/file_name`.
    ///
    /// The bytes go to a temporary file in `dir` first, which is then renamed
    /// into place, so a failed save never leaves a partial report.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir)?;
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(&self.bytes)?;
        temp.as_file().sync_all()?;

        let target = dir.join(&self.file_name);
        temp.persist(&target).map_err(|e| ExportError::Io(e.error.to_string()))?;

        info!("Saved {} ({} bytes)", target.display(), self.bytes.len());
        Ok(target)
    }
}

/// Build the interactive report for `snapshot`.
///
/// With an embedder every distinct image URL is resolved once and inlined;
/// images that fail to resolve keep their remote URL.
pub async fn export_profile_to_interactive_html(
    snapshot: &ExportSnapshot,
    embedder: Option<&dyn ImageEmbedder>,
) -> Result<ExportedDocument, ExportError> {
    let images = match embedder {
        Some(embedder) => images::resolve_images(snapshot.image_urls(), embedder).await,
        None => HashMap::new(),
    };

    let html = render::render_document(snapshot, &images, Utc::now())?;

    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + html.len());
    bytes.extend_from_slice(&UTF8_BOM);
    bytes.extend_from_slice(html.as_bytes());

    Ok(ExportedDocument {
        file_name: export_file_name(&snapshot.casino.name),
        bytes,
    })
}
