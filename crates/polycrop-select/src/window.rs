//! The click-collection window.
//!
//! Runs a blocking event loop on the calling thread. Every click is
//! mapped to original image coordinates the moment it arrives; closing
//! the window ends the session and hands back whatever was collected,
//! however many points that is.

use std::path::Path;
use std::sync::{Arc, Mutex};

use eframe::egui;

use polycrop_core::error::{CropError, Result};
use polycrop_core::geometry::{Point, ScaleFactor};

const WINDOW_TITLE: &str = "Select Polygon Area - Click points, then close this window.";
const DOT_RADIUS: f32 = 3.0;
const LINE_WIDTH: f32 = 2.0;

/// Show the preview and block until the window is closed.
///
/// Returns the clicked vertices in original (full-resolution)
/// coordinates. No validation happens here; zero, one or two points are
/// all legitimate returns.
pub fn collect_points(preview_path: &Path, scale: ScaleFactor) -> Result<Vec<Point>> {
    let preview = image::open(preview_path)
        .map_err(|e| CropError::Selection(format!("Failed to load preview image: {}", e)))?
        .to_rgba8();
    let size = [preview.width() as usize, preview.height() as usize];
    let color_image =
        egui::ColorImage::from_rgba_unmultiplied(size, preview.as_flat_samples().as_slice());

    let points = Arc::new(Mutex::new(Vec::new()));
    let app = SelectorApp {
        color_image,
        texture: None,
        scale,
        display_clicks: Vec::new(),
        points: Arc::clone(&points),
    };

    println!("Click on the image to define the vertices of your polygon.");
    println!("When you are finished selecting points, simply close the image window.");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([preview.width() as f32, preview.height() as f32])
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(WINDOW_TITLE, options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| CropError::Selection(format!("Selection window failed: {}", e)))?;

    // The window is gone; the app (and its Arc clone) dropped with it.
    let collected = points
        .lock()
        .map_err(|_| CropError::Selection("Point list lock poisoned".to_string()))?
        .clone();
    Ok(collected)
}

struct SelectorApp {
    color_image: egui::ColorImage,
    texture: Option<egui::TextureHandle>,
    scale: ScaleFactor,
    /// Clicks in display coordinates, driving the red feedback overlay.
    display_clicks: Vec<egui::Pos2>,
    /// Clicks in original coordinates, read by the caller after close.
    points: Arc<Mutex<Vec<Point>>>,
}

impl SelectorApp {
    fn record_click(&mut self, x: f32, y: f32) {
        let original = self.scale.to_original(x as f64, y as f64);
        self.display_clicks.push(egui::pos2(x, y));
        if let Ok(mut points) = self.points.lock() {
            points.push(original);
        }
    }
}

impl eframe::App for SelectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.texture.is_none() {
            self.texture = Some(ctx.load_texture(
                "preview",
                self.color_image.clone(),
                egui::TextureOptions::LINEAR,
            ));
        }
        let (tex_id, tex_size) = match &self.texture {
            Some(t) => (t.id(), t.size_vec2()),
            None => return,
        };

        // No frame margin: widget-local coordinates are preview pixels.
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let (rect, response) = ui.allocate_exact_size(tex_size, egui::Sense::click());
                let painter = ui.painter_at(rect);
                painter.image(
                    tex_id,
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        let local = pos - rect.min;
                        self.record_click(local.x, local.y);
                    }
                }

                // Feedback: a line from each click to the previous one,
                // then a dot per click, all in display coordinates.
                for pair in self.display_clicks.windows(2) {
                    painter.line_segment(
                        [rect.min + pair[0].to_vec2(), rect.min + pair[1].to_vec2()],
                        egui::Stroke::new(LINE_WIDTH, egui::Color32::RED),
                    );
                }
                for click in &self.display_clicks {
                    let center = rect.min + click.to_vec2();
                    painter.circle_filled(center, DOT_RADIUS, egui::Color32::RED);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app(scale: ScaleFactor) -> (SelectorApp, Arc<Mutex<Vec<Point>>>) {
        let points = Arc::new(Mutex::new(Vec::new()));
        let app = SelectorApp {
            color_image: egui::ColorImage::new([8, 8], egui::Color32::BLACK),
            texture: None,
            scale,
            display_clicks: Vec::new(),
            points: Arc::clone(&points),
        };
        (app, points)
    }

    #[test]
    fn test_clicks_stored_in_original_coordinates() {
        let scale = ScaleFactor::fit(3200, 1800, 1600, 900);
        let (mut app, points) = test_app(scale);

        app.record_click(100.0, 200.0);
        app.record_click(10.0, 20.0);

        let stored = points.lock().unwrap();
        assert_eq!(stored[0], Point::new(200.0, 400.0));
        assert_eq!(stored[1], Point::new(20.0, 40.0));
    }

    #[test]
    fn test_clicks_at_identity_scale_unchanged() {
        let scale = ScaleFactor::fit(800, 600, 1600, 900);
        let (mut app, points) = test_app(scale);

        app.record_click(123.0, 45.0);

        let stored = points.lock().unwrap();
        assert_eq!(stored[0], Point::new(123.0, 45.0));
    }

    #[test]
    fn test_feedback_tracks_display_coordinates() {
        let scale = ScaleFactor::fit(3200, 1800, 1600, 900);
        let (mut app, _points) = test_app(scale);

        app.record_click(100.0, 200.0);
        app.record_click(150.0, 250.0);

        // The overlay keeps display coordinates; the previous click is
        // always available for the connecting line.
        assert_eq!(
            app.display_clicks,
            vec![egui::pos2(100.0, 200.0), egui::pos2(150.0, 250.0)]
        );
    }
}
