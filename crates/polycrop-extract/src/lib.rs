//! Batch extraction: crop the selected polygon out of every page.

pub mod mask;

use std::path::Path;

use image::{imageops, RgbImage, RgbaImage};

use polycrop_core::error::Result;
use polycrop_core::geometry::Point;
use polycrop_core::options::CropOptions;

use crate::mask::{apply_mask, mask_bounding_box, polygon_mask};

/// Outcome of a batch run, by 1-based page number.
///
/// Exists for logging and tests; the user-facing completion message
/// carries no summary.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub saved: Vec<u32>,
    pub skipped: Vec<u32>,
}

/// Mask, composite, and crop one rendered page.
///
/// Returns None when the polygon misses the page entirely (empty mask),
/// in which case the page is skipped rather than written empty.
pub fn crop_page_image(page: &RgbImage, polygon: &[Point]) -> Option<RgbaImage> {
    let (width, height) = page.dimensions();
    let mask = polygon_mask(width, height, polygon);
    let bbox = mask_bounding_box(&mask)?;
    let rgba = apply_mask(page, &mask);
    Some(imageops::crop_imm(&rgba, bbox.x, bbox.y, bbox.width, bbox.height).to_image())
}

/// Crop the polygon region out of every page of the PDF, writing
/// `page_<n>_polygon_crop.png` per page into `options.output_dir`.
///
/// Fewer than 3 points skips the whole run without touching the
/// filesystem. Per-page failures are logged and skipped; page numbering
/// in the output names is never compacted. Rendering happens at
/// `options.dpi`, the same resolution the selection preview used, so the
/// collected coordinates land on the same pixels.
pub fn extract_all_pages(
    pdf_path: &Path,
    polygon: &[Point],
    options: &CropOptions,
) -> Result<BatchReport> {
    if polygon.len() < 3 {
        println!("No valid polygon selected. Exiting.");
        return Ok(BatchReport::default());
    }

    println!("\nProcessing all pages with {}-sided polygon...", polygon.len());
    std::fs::create_dir_all(&options.output_dir)?;
    println!("Images will be saved in '{}'.", options.output_dir.display());

    // Fresh document pass; nothing is shared with the selection phase.
    let num_pages = polycrop_render::page_count(pdf_path)?;
    let rendered = polycrop_render::render_document(pdf_path, num_pages, options.dpi)?;

    let pages = (1..=num_pages).map(|n| (n, rendered.load_page(n)));
    let report = run_batch(pages, polygon, options);

    println!("\nProcessing complete.");
    Ok(report)
}

/// The per-page loop, fed by any page source so it can be exercised on
/// in-memory images.
fn run_batch<I>(pages: I, polygon: &[Point], options: &CropOptions) -> BatchReport
where
    I: Iterator<Item = (u32, Result<RgbImage>)>,
{
    let mut report = BatchReport::default();

    for (page_num, page) in pages {
        let page = match page {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Skipping page {}: {}", page_num, e);
                report.skipped.push(page_num);
                continue;
            }
        };

        match crop_page_image(&page, polygon) {
            Some(cropped) => {
                let out_path = options
                    .output_dir
                    .join(format!("page_{}_polygon_crop.png", page_num));
                match cropped.save(&out_path) {
                    Ok(()) => {
                        log::info!("Saved: {}", out_path.display());
                        report.saved.push(page_num);
                    }
                    Err(e) => {
                        log::warn!("Failed to save {}: {}", out_path.display(), e);
                        report.skipped.push(page_num);
                    }
                }
            }
            None => {
                log::warn!("Could not define a crop area on page {}.", page_num);
                report.skipped.push(page_num);
            }
        }
    }

    report
}
