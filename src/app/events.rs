//! Event handling for RepixApp.
//!
//! Contains handlers for:
//! - Event bus events (handle_events)
//! - Sequencer results (apply_sequencer_updates)

use super::RepixApp;
use crate::core::app_events::*;
use crate::core::event_bus::downcast_event;
use crate::core::sequencer::SequencerUpdate;

use eframe::egui;
use log::{info, trace, warn};

impl RepixApp {
    /// Handle events from the event bus.
    pub fn handle_events(&mut self) {
        let events = self.event_bus.poll();
        for event in events {
            if downcast_event::<ParamsChangedEvent>(&event).is_some() {
                self.on_params_changed();
                continue;
            }
            if let Some(e) = downcast_event::<PaletteSelectedEvent>(&event) {
                info!("Palette selected: {}", e.0);
                // Selecting a palette re-clamps the intensity (the invariant
                // lives in the store), then reprocesses like any change.
                self.store.select_palette(&e.0);
                self.on_params_changed();
                continue;
            }
            if downcast_event::<OpenRequestedEvent>(&event).is_some() {
                if let Some(path) = crate::widgets::file_dialogs::create_open_dialog().pick_file() {
                    self.load_source(&path);
                }
                continue;
            }
            if let Some(e) = downcast_event::<SourceChosenEvent>(&event) {
                self.load_source(&e.0);
                continue;
            }
            if downcast_event::<ExportRequestedEvent>(&event).is_some() {
                self.export_current();
                continue;
            }
            if downcast_event::<ExtractPaletteRequestedEvent>(&event).is_some() {
                self.request_extract();
                continue;
            }
            if let Some(e) = downcast_event::<CatalogLoadedEvent>(&event) {
                self.status_bar
                    .set_info(format!("{} palettes available", e.0.len()));
                self.store.set_palettes(e.0.clone());
                // The fallback selection may differ from what was submitted
                // before the catalog arrived; reprocess if a pass already ran.
                if self.sequencer.latest_issued() > 0 {
                    self.on_params_changed();
                }
                continue;
            }
            if let Some(e) = downcast_event::<CatalogFailedEvent>(&event) {
                // Fail soft: selection stays empty, everything else works.
                warn!("Palette catalog unavailable: {}", e.0);
                self.status_bar.set_error(format!("Palette catalog: {}", e.0));
                continue;
            }
            if let Some(e) = downcast_event::<PaletteExtractedEvent>(&event) {
                self.extract_in_flight = false;
                self.status_bar
                    .set_info(format!("Palette extracted: {} colors", e.colors.len()));
                self.store.set_extracted(e.colors.clone());
                continue;
            }
            if let Some(e) = downcast_event::<PaletteExtractFailedEvent>(&event) {
                self.extract_in_flight = false;
                warn!("Palette extraction failed: {}", e.0);
                self.status_bar.set_error(format!("Extraction: {}", e.0));
                continue;
            }
        }
    }

    /// Drain the sequencer and apply settled results to the render surface.
    pub fn apply_sequencer_updates(&mut self, ctx: &egui::Context) {
        for update in self.sequencer.poll() {
            match update {
                SequencerUpdate::Rendered { token, image } => {
                    trace!("rendering token {}", token);
                    self.viewport.set_image(ctx, image.rgba);
                }
                SequencerUpdate::Stale { token } => {
                    // Superseded result; dropping it is the whole point.
                    trace!("discarded stale token {}", token);
                }
                SequencerUpdate::Failed { token, error } => {
                    self.status_bar.set_error(error.to_string());
                    trace!("token {} failed, awaiting next submission", token);
                }
            }
        }
    }
}
