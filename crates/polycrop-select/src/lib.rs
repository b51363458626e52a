//! The selection phase: preview one page, collect polygon vertices.

mod preview;
mod window;

pub use preview::{PreviewImage, PREVIEW_FILE_NAME};
pub use window::collect_points;

use std::path::Path;

use rand::Rng;

use polycrop_core::error::{CropError, Result};
use polycrop_core::geometry::{Point, ScaleFactor};
use polycrop_core::options::CropOptions;

/// Render one page, fit it to the viewport, run the click-collection
/// window, and return the polygon vertices in original coordinates.
///
/// The preview file and the document handle never outlive this call.
pub fn select_polygon(pdf_path: &Path, options: &CropOptions) -> Result<Vec<Point>> {
    let num_pages = polycrop_render::page_count(pdf_path)?;
    if num_pages == 0 {
        return Err(CropError::NoPages);
    }

    let page_num = pick_preview_page(options.preview_page, num_pages);
    println!("\nRendering page {} (out of {}) for selection.", page_num, num_pages);

    let render = polycrop_render::render_page(pdf_path, page_num, num_pages, options.dpi)?;
    let (img_w, img_h) = render.dimensions();
    let scale = ScaleFactor::fit(img_w, img_h, options.viewport_width, options.viewport_height);
    log::debug!(
        "Page render is {}x{}, viewport {}x{}, scale factor {}",
        img_w,
        img_h,
        options.viewport_width,
        options.viewport_height,
        scale.value()
    );

    let cwd = std::env::current_dir()?;
    let preview = PreviewImage::create(&render, scale, &cwd)?;
    collect_points(preview.path(), scale)
    // `preview` drops here and takes temp_display_image.png with it.
}

/// A forced page when one is configured and in range, a random page
/// otherwise.
fn pick_preview_page(forced: Option<u32>, num_pages: u32) -> u32 {
    match forced {
        Some(p) if (1..=num_pages).contains(&p) => p,
        Some(p) => {
            log::warn!(
                "Preview page {} is out of range (document has {} pages), picking at random",
                p,
                num_pages
            );
            rand::thread_rng().gen_range(1..=num_pages)
        }
        None => rand::thread_rng().gen_range(1..=num_pages),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lopdf::{dictionary, Document, Object};

    fn write_pdf_with_pages(path: &Path, n: usize) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = (0..n)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                })
                .into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => n as i64,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_zero_page_document_aborts_selection() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.pdf");
        write_pdf_with_pages(&path, 0);

        let options = CropOptions::default();
        // Fails before any rendering or window is attempted.
        let result = select_polygon(&path, &options);
        assert!(matches!(result, Err(CropError::NoPages)));
    }

    #[test]
    fn test_unreadable_document_propagates() {
        let dir = tempfile::TempDir::new().unwrap();
        let options = CropOptions::default();
        let result = select_polygon(&dir.path().join("nope.pdf"), &options);
        assert!(matches!(result, Err(CropError::Pdf(_))));
    }

    #[test]
    fn test_pick_preview_page_forced_in_range() {
        assert_eq!(pick_preview_page(Some(3), 10), 3);
        assert_eq!(pick_preview_page(Some(1), 1), 1);
        assert_eq!(pick_preview_page(Some(10), 10), 10);
    }

    #[test]
    fn test_pick_preview_page_random_in_range() {
        for _ in 0..50 {
            let p = pick_preview_page(None, 7);
            assert!((1..=7).contains(&p));
        }
        // Out-of-range force also falls back to a valid page.
        for _ in 0..50 {
            let p = pick_preview_page(Some(99), 7);
            assert!((1..=7).contains(&p));
        }
    }
}
