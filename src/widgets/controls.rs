//! Parameter panel - the transformation controls and file actions.
//!
//! Renders over the store's current values and emits intent events; all
//! consequences (clamping, submission, dialogs) happen in the app loop.

use crate::core::app_events::*;
use crate::core::event_bus::EventEmitter;
use crate::entities::params::{ADJUST_RANGE, BLOCK_SIZE_RANGE, ParamStore, Resolution};
use eframe::egui;

/// Prettify a palette name for display ("game-boy" -> "Game boy").
fn palette_label(name: &str) -> String {
    let spaced = name.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Render the controls panel. Emits events on interaction.
pub fn render(
    ui: &mut egui::Ui,
    store: &mut ParamStore,
    can_export: bool,
    extract_busy: bool,
    emitter: &EventEmitter,
) {
    ui.heading("repix");
    ui.separator();

    ui.horizontal(|ui| {
        if ui.button("Open image…").clicked() {
            emitter.emit(OpenRequestedEvent);
        }
        if ui
            .add_enabled(can_export, egui::Button::new("Export…"))
            .on_disabled_hover_text("Nothing rendered yet")
            .clicked()
        {
            emitter.emit(ExportRequestedEvent);
        }
    });
    if let Some(source) = store.source() {
        ui.monospace(format!(
            "{} ({}x{})",
            source.file_name(),
            source.width(),
            source.height()
        ));
    } else {
        ui.monospace("No image loaded");
    }

    ui.separator();

    let mut changed = false;

    changed |= ui
        .add(egui::Slider::new(&mut store.params.block_size, BLOCK_SIZE_RANGE).text("Block size"))
        .changed();

    // Palette selection; "original" only becomes selectable once the server
    // has extracted a palette for this session.
    let names: Vec<String> = store.palettes().iter().map(|p| p.name.clone()).collect();
    let has_extract = store.extracted().is_some();
    let mut selected: Option<String> = None;
    egui::ComboBox::from_label("Palette")
        .selected_text(palette_label(&store.params.palette))
        .show_ui(ui, |ui| {
            for name in &names {
                let enabled = name != "original" || has_extract;
                let is_current = *name == store.params.palette;
                ui.add_enabled_ui(enabled, |ui| {
                    if ui.selectable_label(is_current, palette_label(name)).clicked()
                        && !is_current
                    {
                        selected = Some(name.clone());
                    }
                });
            }
            if names.is_empty() {
                ui.label("(catalog unavailable)");
            }
        });
    if let Some(name) = selected {
        emitter.emit(PaletteSelectedEvent(name));
    }

    // Intensity spans the selected palette's color count; pinned (and
    // disabled) at 1 for the server-default palette.
    let limit = store.color_limit().max(1);
    let mut use_colors = store.params.use_colors;
    let intensity = ui.add_enabled(
        limit > 1,
        egui::Slider::new(&mut use_colors, 1..=limit).text("Colors used"),
    );
    if intensity.changed() {
        store.set_use_colors(use_colors);
        changed = true;
    }

    ui.separator();

    changed |= ui
        .add(egui::Slider::new(&mut store.params.brightness, ADJUST_RANGE).text("Brightness"))
        .changed();
    changed |= ui
        .add(egui::Slider::new(&mut store.params.contrast, ADJUST_RANGE).text("Contrast"))
        .changed();
    changed |= ui
        .add(egui::Slider::new(&mut store.params.saturation, ADJUST_RANGE).text("Saturation"))
        .changed();
    changed |= ui.checkbox(&mut store.params.contour, "Contour").changed();

    let mut resolution = store.params.resolution;
    egui::ComboBox::from_label("Resolution")
        .selected_text(resolution.label())
        .show_ui(ui, |ui| {
            for option in Resolution::ALL {
                ui.selectable_value(&mut resolution, option, option.label());
            }
        });
    if resolution != store.params.resolution {
        store.params.resolution = resolution;
        changed = true;
    }

    ui.separator();

    let extract_label = if extract_busy {
        "Extracting…"
    } else {
        "Extract palette from image"
    };
    if ui
        .add_enabled(
            store.source().is_some() && !extract_busy,
            egui::Button::new(extract_label),
        )
        .on_disabled_hover_text("Load an image first")
        .clicked()
    {
        emitter.emit(ExtractPaletteRequestedEvent);
    }
    if let Some(colors) = store.extracted() {
        ui.monospace(format!("extracted: {} colors", colors.len()));
    }

    if changed {
        emitter.emit(ParamsChangedEvent);
    }
}
