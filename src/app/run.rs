//! Main application loop - eframe::App implementation.
//!
//! Contains the core update() method that runs each frame:
//! - One-shot catalog fetch
//! - Dropped-file handling
//! - Event processing and debounce tick
//! - Sequencer polling and render application
//! - UI rendering (controls, viewport, status bar)

use std::time::Duration;

use eframe::egui;
use log::info;

use crate::app::RepixApp;
use crate::core::app_events::SourceChosenEvent;
use crate::widgets::{controls, status::RequestStats};

impl eframe::App for RepixApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Palette catalog: fetched once, lazily, on the first frame.
        if !self.catalog_requested {
            self.catalog_requested = true;
            self.request_catalog();
        }

        // Handle drag-and-drop: a dropped image becomes the new source.
        ctx.input(|i| {
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    info!("File dropped: {}", path.display());
                    self.event_bus.emit(SourceChosenEvent(path.clone()));
                }
            }
        });

        // Drain intent/result events, then fire any coalesced submission.
        self.handle_events();
        if self.debounce.tick() {
            self.submit_current();
        }

        // Apply settled processing results to the render surface.
        self.apply_sequencer_updates(ctx);

        // Update status messages BEFORE laying out panels
        self.status_bar.update();
        let stats = RequestStats {
            latest_issued: self.sequencer.latest_issued(),
            last_rendered: self.sequencer.last_rendered(),
            in_flight: self.sequencer.in_flight(),
        };
        self.status_bar.render(
            ctx,
            self.store.source().map(|s| s.as_ref()),
            &self.viewport.state,
            &stats,
            self.transport.base_url(),
        );

        let emitter = self.event_bus.emitter();
        let can_export = self.viewport.has_image();
        let extract_busy = self.extract_in_flight;
        egui::SidePanel::left("controls")
            .default_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    controls::render(ui, &mut self.store, can_export, extract_busy, &emitter);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewport.ui(ui);
        });

        // Keep polling while work is outstanding; egui only repaints on
        // input otherwise and results would sit in the channel.
        if self.sequencer.in_flight() > 0
            || self.debounce.is_pending()
            || self.extract_in_flight
        {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
