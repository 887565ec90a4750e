//! Preview viewport - zoom/pan state and textured rendering of the latest
//! processed bitmap.
//!
//! The surface always shows the full result of the newest completed request;
//! a new bitmap overwrites the texture wholesale, there is no incremental
//! drawing. The last pixels are kept CPU-side for export.

use eframe::egui;
use log::info;

// Zoom constants
const ZOOM_STEP: f32 = 0.025;
const ZOOM_IN_FACTOR: f32 = 1.0 + ZOOM_STEP;
const ZOOM_OUT_FACTOR: f32 = 1.0 / ZOOM_IN_FACTOR;

/// Viewport mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportMode {
    /// Manual mode - user controls zoom/pan, nothing auto-adjusts
    Manual,
    /// Auto-fit mode - image fits to window, adjusts on resize
    AutoFit,
    /// Auto-100% mode - image at 100% zoom, no auto-adjust on resize
    Auto100,
}

/// Viewport state for pan/zoom
#[derive(Debug, Clone)]
pub struct ViewportState {
    pub zoom: f32,
    pub pan: egui::Vec2,
    pub mode: ViewportMode,
    pub image_size: egui::Vec2,
    pub viewport_size: egui::Vec2,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
            mode: ViewportMode::AutoFit,
            image_size: egui::Vec2::new(1.0, 1.0),
            viewport_size: egui::Vec2::new(1280.0, 720.0),
        }
    }
}

impl ViewportState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update viewport size (called when the panel resizes)
    pub fn set_viewport_size(&mut self, size: egui::Vec2) {
        if size == self.viewport_size {
            return;
        }
        self.viewport_size = size;
        // Auto-refit if in AutoFit mode
        if self.mode == ViewportMode::AutoFit {
            self.apply_fit();
        }
    }

    /// Update image size (called when a new bitmap arrives)
    pub fn set_image_size(&mut self, size: egui::Vec2) {
        self.image_size = size;
        if self.mode == ViewportMode::AutoFit {
            self.apply_fit();
        }
    }

    /// Set AutoFit mode and apply fit
    pub fn set_mode_fit(&mut self) {
        info!("Viewport mode: AutoFit");
        self.mode = ViewportMode::AutoFit;
        self.apply_fit();
    }

    /// Set Auto100 mode and apply 100% zoom
    pub fn set_mode_100(&mut self) {
        info!("Viewport mode: Auto100");
        self.mode = ViewportMode::Auto100;
        self.apply_100();
    }

    fn apply_fit(&mut self) {
        if self.image_size.x <= 0.0 || self.image_size.y <= 0.0 {
            return;
        }
        let scale_x = self.viewport_size.x / self.image_size.x;
        let scale_y = self.viewport_size.y / self.image_size.y;
        self.zoom = scale_x.min(scale_y);
        self.pan = egui::Vec2::ZERO;
    }

    fn apply_100(&mut self) {
        self.zoom = 1.0;
        self.pan = egui::Vec2::ZERO;
    }

    /// Handle zoom with center-on-cursor (switches to Manual mode).
    /// `cursor_pos` is relative to the viewport's top-left corner.
    pub fn handle_zoom(&mut self, zoom_delta: f32, cursor_pos: egui::Vec2) {
        if zoom_delta.abs() < 0.001 {
            return;
        }

        self.mode = ViewportMode::Manual;

        let old_zoom = self.zoom;
        let zoom_factor = if zoom_delta > 0.0 {
            ZOOM_IN_FACTOR
        } else {
            ZOOM_OUT_FACTOR
        };
        self.zoom = (self.zoom * zoom_factor).clamp(0.01, 100.0);

        // Keep the point under the cursor stationary
        let zoom_ratio = self.zoom / old_zoom;
        let cursor_to_center = cursor_pos - self.viewport_size * 0.5;
        self.pan = cursor_to_center - (cursor_to_center - self.pan) * zoom_ratio;
    }

    /// Pan by a drag delta (switches to Manual mode)
    pub fn handle_pan(&mut self, delta: egui::Vec2) {
        if delta == egui::Vec2::ZERO {
            return;
        }
        self.mode = ViewportMode::Manual;
        self.pan += delta;
    }
}

/// The render surface: owns the preview texture and the last pixels.
pub struct Viewport {
    pub state: ViewportState,
    texture: Option<egui::TextureHandle>,
    current: Option<image::RgbaImage>,
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            state: ViewportState::new(),
            texture: None,
            current: None,
        }
    }

    /// Replace the preview with a freshly processed bitmap. Always a full
    /// overwrite; the surface is resized to the bitmap's dimensions.
    pub fn set_image(&mut self, ctx: &egui::Context, rgba: image::RgbaImage) {
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        // Nearest filtering: pixel-art output must stay blocky when zoomed.
        self.texture = Some(ctx.load_texture("preview", color, egui::TextureOptions::NEAREST));
        self.state
            .set_image_size(egui::vec2(size[0] as f32, size[1] as f32));
        self.current = Some(rgba);
    }

    /// Whether anything has ever been rendered (gates the export control).
    pub fn has_image(&self) -> bool {
        self.current.is_some()
    }

    /// Current pixel buffer, for export.
    pub fn current_pixels(&self) -> Option<&image::RgbaImage> {
        self.current.as_ref()
    }

    /// Refit on the next frame (new source loaded).
    pub fn reset_view(&mut self) {
        self.state.set_mode_fit();
    }

    /// Render the viewport into the available panel space.
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        let avail = ui.available_size();
        self.state.set_viewport_size(avail);

        let (rect, response) =
            ui.allocate_exact_size(avail, egui::Sense::click_and_drag());
        ui.painter()
            .rect_filled(rect, 0.0, egui::Color32::from_gray(18));

        let Some(texture) = &self.texture else {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Open an image or drop one here",
                egui::FontId::proportional(16.0),
                egui::Color32::from_gray(110),
            );
            return;
        };

        if response.dragged() {
            self.state.handle_pan(response.drag_delta());
        }
        if response.double_clicked() {
            self.state.set_mode_fit();
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0
                && let Some(pos) = response.hover_pos()
            {
                self.state.handle_zoom(scroll, pos - rect.min);
            }
        }

        let draw_size = self.state.image_size * self.state.zoom;
        let center = rect.center() + self.state.pan;
        let image_rect = egui::Rect::from_center_size(center, draw_size);
        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_uses_smaller_scale() {
        let mut state = ViewportState::new();
        state.viewport_size = egui::vec2(200.0, 100.0);
        state.set_image_size(egui::vec2(100.0, 100.0));
        // Height is the limiting dimension
        assert!((state.zoom - 1.0).abs() < f32::EPSILON);

        state.set_image_size(egui::vec2(400.0, 100.0));
        assert!((state.zoom - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zoom_switches_to_manual_and_clamps() {
        let mut state = ViewportState::new();
        for _ in 0..10_000 {
            state.handle_zoom(1.0, egui::vec2(10.0, 10.0));
        }
        assert_eq!(state.mode, ViewportMode::Manual);
        assert!(state.zoom <= 100.0);
    }

    #[test]
    fn test_zoom_keeps_cursor_point_stationary() {
        let mut state = ViewportState::new();
        state.viewport_size = egui::vec2(100.0, 100.0);
        state.set_image_size(egui::vec2(100.0, 100.0));
        state.set_mode_100();

        // Image point under the cursor before zooming, in image coords:
        // (cursor_to_center - pan) / zoom
        let cursor = egui::vec2(75.0, 25.0);
        let cursor_to_center = cursor - state.viewport_size * 0.5;
        let before = (cursor_to_center - state.pan) / state.zoom;

        state.handle_zoom(1.0, cursor);
        let after = (cursor_to_center - state.pan) / state.zoom;

        assert!((before - after).length() < 0.001);
    }
}
