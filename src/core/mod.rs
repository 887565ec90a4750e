//! Core engine modules - events, workers, request sequencing, debounce
//!
//! These modules form the request lifecycle engine, independent of UI.

pub mod app_events;
pub mod debounce;
pub mod event_bus;
pub mod sequencer;
pub mod workers;

// Re-exports for convenience
pub use debounce::Debounce;
pub use event_bus::EventBus;
pub use sequencer::{ProcessService, ProcessedImage, ProcessingRequest, RequestSequencer, SequencerUpdate};
pub use workers::Workers;
