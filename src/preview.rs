// src/preview.rs - Document page rasterization for the preview screen
use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
}

/// Rasterizes a document into an ordered sequence of page images.
///
/// A fresh call re-decodes the document; nothing is cached between calls.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, path: &Path) -> Result<Vec<DynamicImage>, PreviewError>;
}

/// PDF renderer backed by pdfium.
pub struct PdfiumRenderer {
    dpi: u32,
}

impl PdfiumRenderer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }
}

#[async_trait]
impl PageRenderer for PdfiumRenderer {
    async fn render(&self, path: &Path) -> Result<Vec<DynamicImage>, PreviewError> {
        if !path.exists() {
            return Err(PreviewError::FileNotFound(path.to_path_buf()));
        }

        // pdfium is not async-safe; rasterize on the blocking pool.
        let path = path.to_path_buf();
        let scale = self.dpi as f32 / 72.0;
        tokio::task::spawn_blocking(move || render_pdf_pages(&path, scale))
            .await
            .map_err(|e| PreviewError::UnsupportedFormat(format!("render task aborted: {e}")))?
    }
}

fn render_pdf_pages(path: &Path, scale: f32) -> Result<Vec<DynamicImage>, PreviewError> {
    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| PreviewError::UnsupportedFormat(format!("pdfium unavailable: {e}")))?;
    let pdfium = Pdfium::new(bindings);

    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| PreviewError::UnsupportedFormat(e.to_string()))?;

    let config = PdfRenderConfig::new().scale_page_by_factor(scale);
    let mut pages = Vec::new();
    for page in document.pages().iter() {
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PreviewError::UnsupportedFormat(e.to_string()))?;
        pages.push(bitmap.as_image());
    }

    tracing::debug!("Rendered {} preview pages from {}", pages.len(), path.display());
    Ok(pages)
}
