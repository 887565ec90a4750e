//! Entities module - data types with business logic separated from GUI
//!
//! Each entity is a plain state container; widgets render views of them and
//! mutations flow back through the event bus.

pub mod params;
pub mod source;

pub use params::{ParamSet, ParamStore, Resolution};
pub use source::SourceImage;
