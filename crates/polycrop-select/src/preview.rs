//! The on-disk preview image the selection window displays.
//!
//! Uses fast_image_resize for SIMD-accelerated Lanczos3 resampling, with
//! the image crate's resize as fallback.

use std::path::{Path, PathBuf};

use image::RgbImage;

use polycrop_core::error::{CropError, Result};
use polycrop_core::geometry::ScaleFactor;

/// File name the preview is written under, in the working directory.
pub const PREVIEW_FILE_NAME: &str = "temp_display_image.png";

/// A page render scaled to the viewport and written to disk for the
/// selection window.
///
/// The file is removed when the value drops, so it never outlives the
/// selection session, whichever way the session ends.
pub struct PreviewImage {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl PreviewImage {
    /// Write the preview for `render` into `dir`.
    ///
    /// An identity scale writes the render as-is: the preview is then
    /// pixel-identical to the full-resolution page. Anything else
    /// resamples to the rounded scaled dimensions first.
    pub fn create(render: &RgbImage, scale: ScaleFactor, dir: &Path) -> Result<PreviewImage> {
        let (img_w, img_h) = render.dimensions();
        let path = dir.join(PREVIEW_FILE_NAME);

        let (width, height) = if scale.is_identity() {
            println!("Image fits the viewport. No resizing needed for selection.");
            save_preview(render, &path)?;
            (img_w, img_h)
        } else {
            let (new_w, new_h) = scale.scaled_dimensions(img_w, img_h);
            println!("Image is too large. Resizing to {}x{} for display.", new_w, new_h);
            let display = resample(render, new_w, new_h);
            save_preview(&display, &path)?;
            (new_w, new_h)
        };

        Ok(PreviewImage { path, width, height })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for PreviewImage {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!("Failed to remove preview {}: {}", self.path.display(), e);
        }
    }
}

fn save_preview(img: &RgbImage, path: &Path) -> Result<()> {
    img.save(path)
        .map_err(|e| CropError::Image(format!("Failed to write preview {}: {}", path.display(), e)))
}

/// Resize with SIMD-accelerated Lanczos3, falling back to the image
/// crate when fast_image_resize can't handle the buffer.
fn resample(render: &RgbImage, new_w: u32, new_h: u32) -> RgbImage {
    use fast_image_resize::images::{Image, ImageRef};
    use fast_image_resize::{PixelType, Resizer};

    let (w, h) = render.dimensions();
    let src = match ImageRef::new(w, h, render.as_raw(), PixelType::U8x3) {
        Ok(src) => src,
        Err(e) => {
            log::warn!("fast_image_resize rejected the render: {}, falling back", e);
            return resize_fallback(render, new_w, new_h);
        }
    };

    let mut dst = Image::new(new_w, new_h, PixelType::U8x3);
    let mut resizer = Resizer::new();
    if let Err(e) = resizer.resize(&src, &mut dst, None) {
        log::warn!(
            "fast_image_resize failed ({}x{} to {}x{}): {}, falling back",
            w,
            h,
            new_w,
            new_h,
            e
        );
        return resize_fallback(render, new_w, new_h);
    }

    match RgbImage::from_raw(new_w, new_h, dst.into_vec()) {
        Some(img) => img,
        None => resize_fallback(render, new_w, new_h),
    }
}

fn resize_fallback(render: &RgbImage, new_w: u32, new_h: u32) -> RgbImage {
    image::imageops::resize(render, new_w, new_h, image::imageops::FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::Rgb;

    fn checker(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([30, 60, 90])
            }
        })
    }

    #[test]
    fn test_identity_preview_is_pixel_identical() {
        let dir = tempfile::TempDir::new().unwrap();
        let render = checker(64, 48);
        let scale = ScaleFactor::fit(64, 48, 1600, 900);
        assert!(scale.is_identity());

        let preview = PreviewImage::create(&render, scale, dir.path()).unwrap();
        assert_eq!(preview.dimensions(), (64, 48));

        let reloaded = image::open(preview.path()).unwrap().to_rgb8();
        assert_eq!(reloaded.as_raw(), render.as_raw());
    }

    #[test]
    fn test_scaled_preview_has_scaled_dimensions() {
        let dir = tempfile::TempDir::new().unwrap();
        let render = checker(200, 100);
        let scale = ScaleFactor::fit(200, 100, 100, 100);
        assert_eq!(scale.value(), 0.5);

        let preview = PreviewImage::create(&render, scale, dir.path()).unwrap();
        assert_eq!(preview.dimensions(), (100, 50));

        let (w, h) = image::image_dimensions(preview.path()).unwrap();
        assert_eq!((w, h), (100, 50));
    }

    #[test]
    fn test_preview_file_removed_on_drop() {
        let dir = tempfile::TempDir::new().unwrap();
        let render = checker(32, 32);
        let scale = ScaleFactor::fit(32, 32, 1600, 900);

        let preview = PreviewImage::create(&render, scale, dir.path()).unwrap();
        let path = preview.path().to_path_buf();
        assert!(path.exists());

        drop(preview);
        assert!(!path.exists());
    }

    #[test]
    fn test_preview_uses_fixed_file_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let render = checker(16, 16);
        let scale = ScaleFactor::fit(16, 16, 1600, 900);

        let preview = PreviewImage::create(&render, scale, dir.path()).unwrap();
        assert_eq!(
            preview.path().file_name().and_then(|n| n.to_str()),
            Some(PREVIEW_FILE_NAME)
        );
    }

    #[test]
    fn test_resample_fallback_agrees_on_dimensions() {
        let render = checker(120, 80);
        let fast = resample(&render, 60, 40);
        let slow = resize_fallback(&render, 60, 40);
        assert_eq!(fast.dimensions(), (60, 40));
        assert_eq!(slow.dimensions(), (60, 40));
    }
}
