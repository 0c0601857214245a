use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use trade_dashboard::data::loader::{load_dataset, LoadOptions};
use trade_dashboard::state::{AppState, Dimension};

use crate::color::ChartColors;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// What the user clicked inside one filter section.
enum SectionAction<T> {
    All,
    None,
    Toggle(T),
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, colors: &ChartColors) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };
    let selection = state.selection().clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let action = filter_section(
                ui,
                "Select Categories",
                dataset.categories(),
                &selection.categories,
                |c| Some(colors.category(c)),
            );
            match action {
                Some(SectionAction::All) => state.select_all(Dimension::Category),
                Some(SectionAction::None) => state.select_none(Dimension::Category),
                Some(SectionAction::Toggle(c)) => state.toggle_category(&c),
                None => {}
            }

            let action = filter_section(
                ui,
                "Select Import/Export",
                dataset.directions(),
                &selection.directions,
                |d| Some(colors.direction(d)),
            );
            match action {
                Some(SectionAction::All) => state.select_all(Dimension::Direction),
                Some(SectionAction::None) => state.select_none(Dimension::Direction),
                Some(SectionAction::Toggle(d)) => state.toggle_direction(&d),
                None => {}
            }

            let action =
                filter_section(ui, "Select Years", dataset.years(), &selection.years, |_| None);
            match action {
                Some(SectionAction::All) => state.select_all(Dimension::Year),
                Some(SectionAction::None) => state.select_none(Dimension::Year),
                Some(SectionAction::Toggle(y)) => state.toggle_year(y),
                None => {}
            }
        });
}

/// One collapsible multi-select with All/None buttons.
fn filter_section<T: Ord + Clone + ToString>(
    ui: &mut Ui,
    title: &str,
    all_values: &BTreeSet<T>,
    selected: &BTreeSet<T>,
    swatch: impl Fn(&T) -> Option<Color32>,
) -> Option<SectionAction<T>> {
    let mut action = None;

    // Show count of selected / total in the header
    let header_text = format!("{title}  ({}/{})", selected.len(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    action = Some(SectionAction::All);
                }
                if ui.small_button("None").clicked() {
                    action = Some(SectionAction::None);
                }
            });

            for val in all_values {
                let mut text = RichText::new(val.to_string());
                if let Some(c) = swatch(val) {
                    text = text.color(c);
                }

                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, text).changed() {
                    action = Some(SectionAction::Toggle(val.clone()));
                }
            }
        });

    action
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar. Returns true when a new dataset was loaded.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, options: &LoadOptions) -> bool {
    let mut loaded = false;

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                loaded = open_file_dialog(state, options);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} transactions sampled from {} rows, {} visible",
                ds.len(),
                ds.source_rows(),
                state.visible()
            ));
            if ds.skipped_rows() > 0 {
                ui.label(
                    RichText::new(format!("{} rows skipped (unparseable date)", ds.skipped_rows()))
                        .color(Color32::YELLOW),
                );
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    loaded
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Pick and load another file. On failure the current dataset stays active
/// and the error goes to the status line.
pub fn open_file_dialog(state: &mut AppState, options: &LoadOptions) -> bool {
    let file = rfd::FileDialog::new()
        .set_title("Open transactions")
        .add_filter("Supported files", &["csv", "tsv", "json", "parquet", "pq"])
        .add_filter("CSV / TSV", &["csv", "tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    let Some(path) = file else {
        return false;
    };

    match load_dataset(&path, options).with_context(|| format!("loading {}", path.display())) {
        Ok(dataset) => {
            state.set_dataset(Arc::new(dataset));
            true
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
            false
        }
    }
}
