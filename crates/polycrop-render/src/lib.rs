//! PDF page rendering via `pdftoppm`, plus `lopdf`-based page counting.

mod pdftoppm;

pub use pdftoppm::{
    check_pdftoppm, find_rendered_page, render_document, render_page, RenderedDocument,
};

use std::path::Path;

use lopdf::Document;

use polycrop_core::error::{CropError, Result};

/// Number of pages in the document.
///
/// The handle is opened and closed inside this call; nothing is cached
/// between the selection and extraction phases.
pub fn page_count(pdf_path: &Path) -> Result<u32> {
    let doc = Document::load(pdf_path)
        .map_err(|e| CropError::Pdf(format!("Failed to load PDF: {}", e)))?;
    Ok(doc.get_pages().len() as u32)
}
