//! Status bar - file info, zoom, request accounting and transient messages.

use crate::entities::source::SourceImage;
use crate::widgets::viewport::ViewportState;
use eframe::egui;
use std::time::{Duration, Instant};

const MESSAGE_TTL: Duration = Duration::from_secs(6);

/// Request accounting snapshot for display.
pub struct RequestStats {
    pub latest_issued: u64,
    pub last_rendered: Option<u64>,
    pub in_flight: usize,
}

/// Status bar component
pub struct StatusBar {
    message: Option<(String, bool, Instant)>, // text, is_error, set at
}

impl StatusBar {
    pub fn new() -> Self {
        Self { message: None }
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.message = Some((text.into(), false, Instant::now()));
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.message = Some((text.into(), true, Instant::now()));
    }

    /// Expire stale messages; call once per frame before render.
    pub fn update(&mut self) {
        if let Some((_, _, at)) = &self.message
            && at.elapsed() > MESSAGE_TTL
        {
            self.message = None;
        }
    }

    /// Render status bar at bottom of screen
    pub fn render(
        &self,
        ctx: &egui::Context,
        source: Option<&SourceImage>,
        viewport_state: &ViewportState,
        stats: &RequestStats,
        server_url: &str,
    ) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                // Filename
                if let Some(source) = source {
                    ui.monospace(source.file_name());
                } else {
                    ui.monospace("No file");
                }

                ui.separator();

                // Resolution
                if let Some(source) = source {
                    ui.monospace(format!("{:>4}x{:<4}", source.width(), source.height()));
                } else {
                    ui.monospace("   0x0   ");
                }

                ui.separator();

                // Zoom
                ui.monospace(format!("{:>6.1}%", viewport_state.zoom * 100.0));

                ui.separator();

                // Request accounting: issued / drawn / outstanding
                let drawn = stats
                    .last_rendered
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string());
                ui.monospace(format!(
                    "req #{} drawn #{} ({} in flight)",
                    stats.latest_issued, drawn, stats.in_flight
                ));

                ui.separator();

                ui.monospace(server_url);

                // Transient message, errors in red
                if let Some((text, is_error, _)) = &self.message {
                    ui.separator();
                    if *is_error {
                        ui.colored_label(egui::Color32::from_rgb(200, 60, 60), text.as_str());
                    } else {
                        ui.label(text.as_str());
                    }
                }
            });
        });
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}
