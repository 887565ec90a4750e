//! Application event types carried on the event bus.
//!
//! UI widgets emit intent events; background workers emit result events.
//! All handling happens in `RepixApp::handle_events()`.

use crate::remote::catalog::PaletteDescriptor;
use std::path::PathBuf;

/// A transformation control changed; current values live in the store.
#[derive(Debug, Clone)]
pub struct ParamsChangedEvent;

/// A different palette was selected by name.
#[derive(Debug, Clone)]
pub struct PaletteSelectedEvent(pub String);

/// User asked to pick a source image via the file dialog.
#[derive(Debug, Clone)]
pub struct OpenRequestedEvent;

/// A source image file was chosen (picker or drag-and-drop).
#[derive(Debug, Clone)]
pub struct SourceChosenEvent(pub PathBuf);

/// Export the current preview to disk.
#[derive(Debug, Clone)]
pub struct ExportRequestedEvent;

/// Ask the server to derive a palette from the current source image.
#[derive(Debug, Clone)]
pub struct ExtractPaletteRequestedEvent;

/// Palette catalog fetch succeeded.
#[derive(Debug, Clone)]
pub struct CatalogLoadedEvent(pub Vec<PaletteDescriptor>);

/// Palette catalog fetch failed (non-fatal, selection stays empty).
#[derive(Debug, Clone)]
pub struct CatalogFailedEvent(pub String);

/// Palette extraction succeeded.
#[derive(Debug, Clone)]
pub struct PaletteExtractedEvent {
    pub colors: Vec<String>,
}

/// Palette extraction failed.
#[derive(Debug, Clone)]
pub struct PaletteExtractFailedEvent(pub String);
