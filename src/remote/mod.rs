//! Remote service layer - HTTP transport and palette catalog.
//!
//! All calls here are blocking and run on worker threads; the UI thread
//! never touches the network.

pub mod catalog;
pub mod transport;

pub use catalog::{PaletteDescriptor, PaletteExtract};
pub use transport::HttpTransport;

/// Errors from the remote service layer.
///
/// Every error is local to the request that produced it; the caller surfaces
/// it and moves on (there is no retry policy - the next user change simply
/// supersedes the failed request).
#[derive(Debug)]
pub enum RemoteError {
    /// Palette catalog unavailable - the app degrades to an empty selection.
    Catalog(String),
    /// Network failure or non-2xx response.
    Transport(String),
    /// Response bytes were not a decodable image.
    Decode(String),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::Catalog(e) => write!(f, "Palette catalog error: {}", e),
            RemoteError::Transport(e) => write!(f, "Transport error: {}", e),
            RemoteError::Decode(e) => write!(f, "Decode error: {}", e),
        }
    }
}

impl std::error::Error for RemoteError {}
