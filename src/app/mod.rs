//! Application module - RepixApp and related functionality.
//!
//! This module organizes the main application logic into focused submodules:
//! - `events` - event bus handling and sequencer result application
//! - `run` - the eframe::App update loop

mod events;
mod run;

use crate::cli::Args;
use crate::core::app_events::*;
use crate::core::debounce::Debounce;
use crate::core::event_bus::EventBus;
use crate::core::sequencer::{ProcessService, RequestSequencer};
use crate::core::workers::Workers;
use crate::entities::params::ParamStore;
use crate::entities::source::SourceImage;
use crate::remote::transport::HttpTransport;
use crate::remote::catalog;
use crate::widgets::status::StatusBar;
use crate::widgets::viewport::Viewport;

use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

/// Main application state.
///
/// Owns every collaborator explicitly (no globals): the parameter store, the
/// request sequencer with its transport, the worker pool, the event bus, and
/// the render surface.
pub struct RepixApp {
    pub(crate) store: ParamStore,
    pub(crate) sequencer: RequestSequencer,
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) workers: Arc<Workers>,
    pub(crate) event_bus: EventBus,
    pub(crate) viewport: Viewport,
    pub(crate) status_bar: StatusBar,
    pub(crate) debounce: Debounce,
    /// Lazy one-shot catalog fetch on the first frame.
    pub(crate) catalog_requested: bool,
    pub(crate) extract_in_flight: bool,
}

impl RepixApp {
    pub fn new(args: &Args) -> Self {
        let workers = Arc::new(Workers::new(Workers::default_threads()));
        let transport = Arc::new(HttpTransport::new(&args.server));
        let sequencer = RequestSequencer::new(
            Arc::clone(&transport) as Arc<dyn ProcessService>,
            Arc::clone(&workers),
        );
        let event_bus = EventBus::new();

        // Queue the startup image; it loads through the normal event path.
        if let Some(path) = &args.file_path {
            event_bus.emit(SourceChosenEvent(path.clone()));
        }

        Self {
            store: ParamStore::new(),
            sequencer,
            transport,
            workers,
            event_bus,
            viewport: Viewport::new(),
            status_bar: StatusBar::new(),
            debounce: Debounce::new(args.debounce_ms),
            catalog_requested: false,
            extract_in_flight: false,
        }
    }

    /// Fire the one-shot palette catalog fetch on a worker.
    pub(crate) fn request_catalog(&self) {
        let transport = Arc::clone(&self.transport);
        let emitter = self.event_bus.emitter();
        self.workers.execute(move || match catalog::fetch_palettes(&transport) {
            Ok(palettes) => emitter.emit(CatalogLoadedEvent(palettes)),
            Err(e) => emitter.emit(CatalogFailedEvent(e.to_string())),
        });
    }

    /// Snapshot the store and issue a processing request for it.
    pub(crate) fn submit_current(&mut self) {
        if !self.store.can_submit() {
            log::trace!("submit skipped: store not ready");
            return;
        }
        let palette_data = self.store.palette_data_json();
        self.sequencer
            .submit(&self.store.params, palette_data, self.store.source());
    }

    /// A control changed: submit now, or arm the debounce when coalescing.
    pub(crate) fn on_params_changed(&mut self) {
        if self.debounce.enabled() {
            self.debounce.schedule();
        } else {
            self.submit_current();
        }
    }

    /// Load a new source image and kick off its first processing pass.
    pub(crate) fn load_source(&mut self, path: &Path) {
        match SourceImage::from_path(path) {
            Ok(source) => {
                self.store.set_source(source);
                self.viewport.reset_view();
                self.status_bar.set_info(format!("Loaded {}", path.display()));
                self.submit_current();
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                self.status_bar.set_error(format!("{}: {}", path.display(), e));
            }
        }
    }

    /// Ask the server for a k-means palette of the current source.
    pub(crate) fn request_extract(&mut self) {
        let Some(source) = self.store.source() else {
            return;
        };
        self.extract_in_flight = true;
        let source = Arc::clone(source);
        let transport = Arc::clone(&self.transport);
        let emitter = self.event_bus.emitter();
        self.workers.execute(move || {
            match catalog::extract_palette(&transport, &source) {
                Ok(extract) => emitter.emit(PaletteExtractedEvent {
                    colors: extract.palette,
                }),
                Err(e) => emitter.emit(PaletteExtractFailedEvent(e.to_string())),
            }
        });
    }

    /// Write the currently rendered pixels to disk. JPEG has no alpha, so
    /// the buffer is flattened for .jpg targets.
    pub(crate) fn export_current(&mut self) {
        let Some(pixels) = self.viewport.current_pixels() else {
            return;
        };
        let Some(path) = crate::widgets::file_dialogs::create_export_dialog().save_file() else {
            return;
        };

        let is_jpeg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
        let result = if is_jpeg {
            image::DynamicImage::ImageRgba8(pixels.clone()).to_rgb8().save(&path)
        } else {
            pixels.save(&path)
        };

        match result {
            Ok(()) => {
                info!("Exported preview to {}", path.display());
                self.status_bar.set_info(format!("Exported {}", path.display()));
            }
            Err(e) => {
                warn!("Export failed: {}", e);
                self.status_bar.set_error(format!("Export failed: {}", e));
            }
        }
    }
}
