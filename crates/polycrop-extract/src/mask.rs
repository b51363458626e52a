//! Polygon mask rasterization and alpha compositing.
//!
//! The mask is a single-channel image at the full render resolution:
//! 255 inside the polygon (outline inclusive), 0 outside. It becomes the
//! alpha channel of the output, so everything outside the selection is
//! fully transparent.

use image::{GrayImage, Luma, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};

use polycrop_core::geometry::Point;

type Vertex = imageproc::point::Point<i32>;

const INSIDE: Luma<u8> = Luma([255u8]);

/// Rasterize the polygon into a `width` x `height` mask.
///
/// Vertices are taken in click order with an implicit closing edge from
/// the last back to the first. Trailing vertices equal to the first are
/// dropped first: the rasterizer rejects an explicitly closed ring.
pub fn polygon_mask(width: u32, height: u32, polygon: &[Point]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);

    let mut verts: Vec<Vertex> = polygon
        .iter()
        .map(|p| Vertex::new(p.x.round() as i32, p.y.round() as i32))
        .collect();
    while verts.len() > 1 && verts.last() == verts.first() {
        verts.pop();
    }

    match verts.len() {
        0 => {}
        1 => {
            // Degenerate selection collapses to one pixel.
            let v = verts[0];
            if v.x >= 0 && v.y >= 0 && (v.x as u32) < width && (v.y as u32) < height {
                mask.put_pixel(v.x as u32, v.y as u32, INSIDE);
            }
        }
        2 => {
            draw_line_segment_mut(
                &mut mask,
                (verts[0].x as f32, verts[0].y as f32),
                (verts[1].x as f32, verts[1].y as f32),
                INSIDE,
            );
        }
        _ => draw_polygon_mut(&mut mask, &verts, INSIDE),
    }

    mask
}

/// Minimal axis-aligned box over the non-zero pixels of a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Bounding box of the mask's non-zero region, or None when the polygon
/// missed the page entirely.
pub fn mask_bounding_box(mask: &GrayImage) -> Option<CropBox> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;

    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[0] != 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !any {
        return None;
    }
    Some(CropBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Composite the mask into the render's alpha channel.
///
/// The mask must have the render's dimensions (both come from the same
/// page). Pixels keep their original color; only alpha varies.
pub fn apply_mask(render: &RgbImage, mask: &GrayImage) -> RgbaImage {
    let (width, height) = render.dimensions();
    let mut out = RgbaImage::new(width, height);

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let rgb = render.get_pixel(x, y);
        let alpha = mask.get_pixel(x, y)[0];
        *pixel = Rgba([rgb[0], rgb[1], rgb[2], alpha]);
    }

    out
}
