//! Palette catalog client - fetches the palette list once at startup and
//! asks the server to extract a palette from the current source image.
//!
//! Both calls fail soft: on error the palette UI just stays in its previous
//! state and a diagnostic is surfaced through the status bar.

use crate::entities::source::SourceImage;
use crate::remote::{HttpTransport, RemoteError};
use log::{debug, info};
use reqwest::blocking::multipart;
use serde::Deserialize;

/// One available palette: name plus how many colors it holds.
///
/// The server prepends two synthetic entries: `default` (count 0, server
/// picks) and `original` (extracted palette, usable only after extraction).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaletteDescriptor {
    pub name: String,
    pub count: u32,
}

/// Server response for a palette extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteExtract {
    /// Hex colors ("#rrggbb") derived from the image via k-means.
    pub palette: Vec<String>,
    pub info: PaletteDescriptor,
}

/// Fetch the available palettes. Called once at startup, from a worker.
pub fn fetch_palettes(transport: &HttpTransport) -> Result<Vec<PaletteDescriptor>, RemoteError> {
    let response = transport
        .get("/palettes")
        .map_err(|e| RemoteError::Catalog(e.to_string()))?;
    let palettes: Vec<PaletteDescriptor> = response
        .json()
        .map_err(|e| RemoteError::Catalog(e.to_string()))?;
    info!("Palette catalog loaded: {} palettes", palettes.len());
    debug!("Palettes: {:?}", palettes);
    Ok(palettes)
}

/// Ask the server for a k-means palette of the given source image.
pub fn extract_palette(
    transport: &HttpTransport,
    source: &SourceImage,
) -> Result<PaletteExtract, RemoteError> {
    let form = multipart::Form::new().part("image", HttpTransport::image_part(source)?);
    let response = transport.post_multipart("/extractPalette", form)?;
    let extract: PaletteExtract = response
        .json()
        .map_err(|e| RemoteError::Decode(e.to_string()))?;
    info!(
        "Palette extracted: {} colors ('{}')",
        extract.palette.len(),
        extract.info.name
    );
    Ok(extract)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_list_parses() {
        let json = r#"[{"name":"gameboy","count":4},{"name":"c64","count":16}]"#;
        let palettes: Vec<PaletteDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(palettes.len(), 2);
        assert_eq!(palettes[0].name, "gameboy");
        assert_eq!(palettes[0].count, 4);
        assert_eq!(palettes[1].count, 16);
    }

    #[test]
    fn test_synthetic_entries_parse() {
        let json = r#"[{"name":"default","count":0},{"name":"original","count":20}]"#;
        let palettes: Vec<PaletteDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(palettes[0].count, 0);
        assert_eq!(palettes[1].name, "original");
    }

    #[test]
    fn test_extract_response_parses() {
        let json = r##"{"palette":["#0f380f","#306230"],"info":{"name":"original","count":2}}"##;
        let extract: PaletteExtract = serde_json::from_str(json).unwrap();
        assert_eq!(extract.palette.len(), 2);
        assert_eq!(extract.info.count, 2);
    }
}
