//! REPIX - desktop client for a remote pixel-art conversion service
//!
//! Re-exports all modules for use by binary targets.

// Core engine (events, workers, request sequencing)
pub mod core;

// App modules
pub mod app;
pub mod cli;
pub mod config;
pub mod entities;
pub mod remote;
pub mod widgets;

// Re-export commonly used types from core
pub use self::core::event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use self::core::sequencer::{ProcessService, RequestSequencer, SequencerUpdate};
pub use self::core::workers::Workers;

// Re-export entities
pub use entities::{ParamSet, ParamStore, Resolution, SourceImage};
