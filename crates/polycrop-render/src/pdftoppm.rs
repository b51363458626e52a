//! `pdftoppm` (poppler-utils) invocation.
//!
//! Pages are rendered as PNG rather than JPEG: the crops carry the page's
//! pixels through an alpha mask, so the intermediate must be lossless.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::RgbImage;

use polycrop_core::error::{CropError, Result};

/// Check that pdftoppm is available on the system.
pub fn check_pdftoppm() -> Result<()> {
    let which = Command::new("which")
        .arg("pdftoppm")
        .output()
        .map_err(|e| CropError::Render(format!("Failed to check for pdftoppm: {}", e)))?;

    if !which.status.success() {
        return Err(CropError::Render(
            "pdftoppm (poppler-utils) is required for page rendering. \
             Install with: brew install poppler (macOS) or apt install poppler-utils (Linux)"
                .to_string(),
        ));
    }
    Ok(())
}

/// Render a single page at the given DPI.
///
/// Used by the selection phase, which only ever needs the preview page.
pub fn render_page(pdf_path: &Path, page_num: u32, total_pages: u32, dpi: u16) -> Result<RgbImage> {
    check_pdftoppm()?;

    let tmp_dir = tempfile::TempDir::new()
        .map_err(|e| CropError::Render(format!("Failed to create temp dir: {}", e)))?;
    let prefix = tmp_dir.path().join("page");
    let prefix_str = prefix
        .to_str()
        .ok_or_else(|| CropError::Render("Invalid temp path".to_string()))?;

    log::debug!("Rendering page {} with pdftoppm at {} DPI...", page_num, dpi);

    let output = Command::new("pdftoppm")
        .arg("-png")
        .arg("-r")
        .arg(dpi.to_string())
        .arg("-f")
        .arg(page_num.to_string())
        .arg("-l")
        .arg(page_num.to_string())
        .arg(pdf_path.as_os_str())
        .arg(prefix_str)
        .output()
        .map_err(|e| CropError::Render(format!("Failed to run pdftoppm: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CropError::Render(format!(
            "pdftoppm failed for page {}: {}",
            page_num, stderr
        )));
    }

    let path = find_rendered_page(tmp_dir.path(), page_num, total_pages).ok_or_else(|| {
        CropError::Render(format!("No rendered image found for page {}", page_num))
    })?;

    decode_page(&path, page_num)
}

/// All pages of a document rendered into one owned temp directory.
///
/// Pages are decoded lazily so the batch loop holds one full-resolution
/// image at a time. The directory and its files are removed on drop.
pub struct RenderedDocument {
    tmp_dir: tempfile::TempDir,
    num_pages: u32,
}

impl RenderedDocument {
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Decode the rendered image for a 1-based page number.
    pub fn load_page(&self, page_num: u32) -> Result<RgbImage> {
        let path = find_rendered_page(self.tmp_dir.path(), page_num, self.num_pages)
            .ok_or_else(|| {
                CropError::Render(format!("No rendered image found for page {}", page_num))
            })?;
        decode_page(&path, page_num)
    }
}

/// Render every page at the given DPI in a single pdftoppm invocation.
pub fn render_document(pdf_path: &Path, num_pages: u32, dpi: u16) -> Result<RenderedDocument> {
    check_pdftoppm()?;

    let tmp_dir = tempfile::TempDir::new()
        .map_err(|e| CropError::Render(format!("Failed to create temp dir: {}", e)))?;
    let prefix = tmp_dir.path().join("page");
    let prefix_str = prefix
        .to_str()
        .ok_or_else(|| CropError::Render("Invalid temp path".to_string()))?;

    log::info!("Rendering {} pages with pdftoppm at {} DPI...", num_pages, dpi);

    let output = Command::new("pdftoppm")
        .arg("-png")
        .arg("-r")
        .arg(dpi.to_string())
        .arg(pdf_path.as_os_str())
        .arg(prefix_str)
        .output()
        .map_err(|e| CropError::Render(format!("Failed to run pdftoppm: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CropError::Render(format!("pdftoppm failed: {}", stderr)));
    }

    Ok(RenderedDocument { tmp_dir, num_pages })
}

fn decode_page(path: &Path, page_num: u32) -> Result<RgbImage> {
    let img = image::open(path).map_err(|e| {
        CropError::Image(format!("Failed to decode rendered page {}: {}", page_num, e))
    })?;
    Ok(img.to_rgb8())
}

/// Find the rendered PNG file for a given page number.
/// pdftoppm zero-pads based on total page count.
pub fn find_rendered_page(dir: &Path, page_num: u32, total_pages: u32) -> Option<PathBuf> {
    let width = if total_pages >= 1000 {
        4
    } else if total_pages >= 100 {
        3
    } else {
        2
    };

    let padded = format!("{:0>width$}", page_num, width = width);
    let name = format!("page-{}.png", padded);
    let path = dir.join(&name);

    if path.exists() {
        return Some(path);
    }

    // Try other common patterns
    for w in 1..=6 {
        let padded = format!("{:0>width$}", page_num, width = w);
        let name = format!("page-{}.png", padded);
        let path = dir.join(&name);
        if path.exists() {
            return Some(path);
        }
    }

    None
}
