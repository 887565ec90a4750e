//! Transformation parameters: the control values, the palette clamp
//! invariant, and the wire encoding for the processing form.
//!
//! **Why**: every control change snapshots the full parameter tuple; the
//! snapshot must already be valid (color intensity inside the selected
//! palette's range) before it reaches the transport.
//!
//! **Used by**: ControlsPanel (editing), RequestSequencer (request
//! snapshots), HttpTransport (form fields)

use crate::remote::catalog::PaletteDescriptor;
use crate::entities::source::SourceImage;
use log::{debug, info};
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Pixelation block size limits (server floor is 2).
pub const BLOCK_SIZE_RANGE: RangeInclusive<u32> = 2..=64;

/// Brightness/contrast/saturation are percentages around 0.
pub const ADJUST_RANGE: RangeInclusive<i32> = -100..=100;

/// Output resolution preset.
///
/// `Original` keeps the source resolution and pixelates by block size on the
/// server; fixed presets make the server downscale to N px (nearest
/// neighbor) and upscale back, overriding block pixelation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Original,
    Px32,
    Px64,
    Px128,
    Px256,
}

impl Resolution {
    pub const ALL: [Resolution; 5] = [
        Resolution::Original,
        Resolution::Px32,
        Resolution::Px64,
        Resolution::Px128,
        Resolution::Px256,
    ];

    /// Value sent in the `resolution` form field; "0" means original.
    pub fn wire(&self) -> &'static str {
        match self {
            Resolution::Original => "0",
            Resolution::Px32 => "32",
            Resolution::Px64 => "64",
            Resolution::Px128 => "128",
            Resolution::Px256 => "256",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Original => "Original",
            Resolution::Px32 => "32 px",
            Resolution::Px64 => "64 px",
            Resolution::Px128 => "128 px",
            Resolution::Px256 => "256 px",
        }
    }
}

/// Immutable snapshot of every transformation control.
///
/// Cheap to clone; a fresh one is captured per submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    pub block_size: u32,
    pub palette: String,
    /// How many of the palette's colors may be used ("useAllColors" on the
    /// wire). Invariant: 1 ..= selected palette color count.
    pub use_colors: u32,
    pub brightness: i32,
    pub contrast: i32,
    pub saturation: i32,
    pub contour: bool,
    pub resolution: Resolution,
}

impl Default for ParamSet {
    fn default() -> Self {
        Self {
            block_size: 8,
            palette: "default".to_string(),
            use_colors: 1,
            brightness: 0,
            contrast: 0,
            saturation: 0,
            contour: false,
            resolution: Resolution::Original,
        }
    }
}

impl ParamSet {
    /// Clamp `use_colors` into the valid range for a palette with
    /// `color_count` colors. A count of 0 (server-default palette) still
    /// keeps the wire value at the server's floor of 1.
    ///
    /// Returns true if the value changed.
    pub fn clamp_use_colors(&mut self, color_count: u32) -> bool {
        let clamped = self.use_colors.clamp(1, color_count.max(1));
        if clamped != self.use_colors {
            debug!(
                "use_colors clamped: {} -> {} (palette '{}' has {} colors)",
                self.use_colors, clamped, self.palette, color_count
            );
            self.use_colors = clamped;
            true
        } else {
            false
        }
    }

    /// Text form fields for `POST /process`, in wire order.
    /// The `image` part and optional `palette_data` are attached separately.
    pub fn wire_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("blocksize", self.block_size.to_string()),
            ("palette", self.palette.clone()),
            ("useAllColors", self.use_colors.to_string()),
            ("brightness", self.brightness.to_string()),
            ("contrast", self.contrast.to_string()),
            ("saturation", self.saturation.to_string()),
            ("contour", (if self.contour { "on" } else { "off" }).to_string()),
            ("resolution", self.resolution.wire().to_string()),
        ]
    }
}

/// Owning store for the current control values, the loaded source image,
/// the palette catalog and the session's extracted palette.
///
/// Constructor-injected into the app; plain get/set plus the clamp
/// invariant. Change notification is the caller's job (event bus).
#[derive(Default)]
pub struct ParamStore {
    pub params: ParamSet,
    source: Option<Arc<SourceImage>>,
    palettes: Vec<PaletteDescriptor>,
    extracted: Option<Vec<String>>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<&Arc<SourceImage>> {
        self.source.as_ref()
    }

    /// Replace the source wholesale; the previous image stays alive only
    /// through whatever in-flight requests still reference it.
    pub fn set_source(&mut self, source: SourceImage) {
        self.source = Some(Arc::new(source));
    }

    pub fn palettes(&self) -> &[PaletteDescriptor] {
        &self.palettes
    }

    /// Install the fetched catalog. Falls back to the first entry if the
    /// current selection is not in the list, then re-applies the clamp.
    pub fn set_palettes(&mut self, palettes: Vec<PaletteDescriptor>) {
        self.palettes = palettes;
        if !self.palettes.is_empty()
            && !self.palettes.iter().any(|p| p.name == self.params.palette)
        {
            let first = self.palettes[0].name.clone();
            info!("Palette '{}' not in catalog, selecting '{}'", self.params.palette, first);
            self.params.palette = first;
        }
        self.params.clamp_use_colors(self.color_limit());
    }

    /// Select a palette by name and re-clamp the intensity.
    pub fn select_palette(&mut self, name: &str) {
        self.params.palette = name.to_string();
        self.params.clamp_use_colors(self.color_limit());
    }

    /// Color count of the selected palette (0 for the server-default entry
    /// or when the catalog has not loaded).
    pub fn color_limit(&self) -> u32 {
        self.palettes
            .iter()
            .find(|p| p.name == self.params.palette)
            .map(|p| p.count)
            .unwrap_or(0)
    }

    /// Set the color intensity, clamped against the selected palette.
    pub fn set_use_colors(&mut self, value: u32) {
        self.params.use_colors = value;
        self.params.clamp_use_colors(self.color_limit());
    }

    pub fn extracted(&self) -> Option<&Vec<String>> {
        self.extracted.as_ref()
    }

    /// Keep the server-extracted palette for the session; required before
    /// the "original" palette may be submitted.
    pub fn set_extracted(&mut self, colors: Vec<String>) {
        info!("Extracted palette stored: {} colors", colors.len());
        self.extracted = Some(colors);
    }

    /// JSON-encoded `palette_data` field, present exactly when the selected
    /// palette needs it.
    pub fn palette_data_json(&self) -> Option<String> {
        if self.params.palette != "original" {
            return None;
        }
        self.extracted
            .as_ref()
            .and_then(|colors| serde_json::to_string(colors).ok())
    }

    /// Whether a processing request can be issued right now. No source is a
    /// silent no-op downstream; the "original" palette additionally needs an
    /// extraction, which the server would otherwise reject.
    pub fn can_submit(&self) -> bool {
        self.source.is_some()
            && (self.params.palette != "original" || self.extracted.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn catalog() -> Vec<PaletteDescriptor> {
        vec![
            PaletteDescriptor { name: "gameboy".into(), count: 4 },
            PaletteDescriptor { name: "c64".into(), count: 16 },
        ]
    }

    #[test]
    fn test_defaults_are_wire_valid() {
        let params = ParamSet::default();
        assert!(BLOCK_SIZE_RANGE.contains(&params.block_size));
        assert_eq!(params.use_colors, 1);
        assert_eq!(params.resolution.wire(), "0");
    }

    #[test]
    fn test_wire_fields_order_and_values() {
        let params = ParamSet {
            block_size: 12,
            palette: "gameboy".into(),
            use_colors: 3,
            brightness: -10,
            contrast: 25,
            saturation: 0,
            contour: true,
            resolution: Resolution::Px128,
        };
        let fields = params.wire_fields();
        assert_eq!(fields[0], ("blocksize", "12".to_string()));
        assert_eq!(fields[1], ("palette", "gameboy".to_string()));
        assert_eq!(fields[2], ("useAllColors", "3".to_string()));
        assert_eq!(fields[3], ("brightness", "-10".to_string()));
        assert_eq!(fields[6], ("contour", "on".to_string()));
        assert_eq!(fields[7], ("resolution", "128".to_string()));
    }

    #[test]
    fn test_contour_off_on_wire() {
        let params = ParamSet::default();
        let fields = params.wire_fields();
        assert_eq!(fields[6], ("contour", "off".to_string()));
    }

    #[test]
    fn test_select_palette_clamps_intensity() {
        // Catalog with gameboy(4) and c64(16); intensity above the selected
        // palette's count must clamp, not pass through.
        let mut store = ParamStore::new();
        store.set_palettes(catalog());
        store.select_palette("c64");
        store.set_use_colors(10);
        assert_eq!(store.params.use_colors, 10);

        store.select_palette("gameboy");
        assert_eq!(store.params.use_colors, 4);

        store.set_use_colors(10);
        assert_eq!(store.params.use_colors, 4);
    }

    #[test]
    fn test_zero_count_palette_keeps_floor() {
        let mut store = ParamStore::new();
        store.set_palettes(vec![PaletteDescriptor { name: "default".into(), count: 0 }]);
        store.set_use_colors(7);
        assert_eq!(store.params.use_colors, 1);
    }

    #[test]
    fn test_missing_selection_falls_back_to_first() {
        let mut store = ParamStore::new();
        store.params.palette = "nope".into();
        store.set_palettes(catalog());
        assert_eq!(store.params.palette, "gameboy");
    }

    #[test]
    fn test_original_palette_gated_on_extraction() {
        let mut store = ParamStore::new();
        store.set_source(crate::entities::source::SourceImage::from_bytes(test_png()).unwrap());
        store.params.palette = "original".into();
        assert!(!store.can_submit());
        assert_eq!(store.palette_data_json(), None);

        store.set_extracted(vec!["#102030".into(), "#405060".into()]);
        assert!(store.can_submit());
        let data = store.palette_data_json().unwrap();
        assert_eq!(data, r##"["#102030","#405060"]"##);
    }

    #[test]
    fn test_no_source_blocks_submission() {
        let store = ParamStore::new();
        assert!(!store.can_submit());
    }

    fn test_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    proptest! {
        // The clamp invariant: for any palette size and requested value the
        // stored intensity lands in [1, max(count, 1)].
        #[test]
        fn prop_use_colors_always_in_range(count in 0u32..=256, value in 0u32..=1000) {
            let mut params = ParamSet { use_colors: value, ..ParamSet::default() };
            params.clamp_use_colors(count);
            prop_assert!(params.use_colors >= 1);
            prop_assert!(params.use_colors <= count.max(1));
        }
    }
}
