//! Shared file dialog helpers for widget UI.

/// Extensions the source loader accepts.
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "tga", "webp"];

/// Create configured file dialog for source image selection.
pub fn create_open_dialog() -> rfd::FileDialog {
    rfd::FileDialog::new()
        .add_filter("Images", IMAGE_EXTS)
        .set_title("Open image")
}

/// Create configured save dialog for preview export.
pub fn create_export_dialog() -> rfd::FileDialog {
    rfd::FileDialog::new()
        .add_filter("PNG image", &["png"])
        .add_filter("JPEG image", &["jpg", "jpeg"])
        .set_file_name("processed-image.png")
        .set_title("Export processed image")
}
