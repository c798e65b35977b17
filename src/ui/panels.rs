use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::session::Session;

// ---------------------------------------------------------------------------
// Left side panel – feature selection
// ---------------------------------------------------------------------------

/// Render the left panel: one checkbox per feature column.
pub fn side_panel(ui: &mut Ui, session: &mut Session) {
    ui.heading("Features");
    ui.separator();

    if session.dataset().is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let features = session.feature_columns();
    let max = session.config.max_features;
    let n_selected = session.selected_features().len();
    ui.label(format!("{n_selected} selected (max {max} plotted)"));
    if n_selected > max {
        ui.label(
            RichText::new(format!("Only the first {max} will be plotted."))
                .color(Color32::YELLOW),
        );
    }
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .max_height((ui.available_height() - 90.0).max(60.0))
        .show(ui, |ui: &mut Ui| {
            for feature in &features {
                let mut checked = session.is_selected(feature);
                if ui.checkbox(&mut checked, feature.as_str()).changed() {
                    session.toggle_feature(feature);
                }
            }
        });

    ui.separator();
    dataset_summary(ui, session);
}

/// Read-only summary of the loaded table.
fn dataset_summary(ui: &mut Ui, session: &Session) {
    let Some(ds) = session.dataset() else {
        return;
    };
    egui::Grid::new("dataset_summary")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("Rows");
            ui.label(ds.len().to_string());
            ui.end_row();
            ui.label("Depth column");
            ui.label(ds.depth_column.as_str());
            ui.end_row();
            ui.label("Columns");
            ui.label(ds.columns.len().to_string());
            ui.end_row();
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, session: &mut Session) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(session);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = session.dataset() {
            ui.label(format!("{} rows loaded", ds.len()));
            ui.separator();
        }

        let plot_button = ui.add_enabled(session.can_plot(), egui::Button::new("Plot Graph"));
        if plot_button.clicked() {
            match session.prepare_plot() {
                Ok(spec) => log::debug!("Plotting {} series", spec.series.len()),
                Err(e) => log::debug!("Plot request rejected: {e}"),
            }
        }

        if let Some(msg) = session.status_message() {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(session: &mut Session) {
    let file = rfd::FileDialog::new()
        .set_title("Open well-log data")
        .add_filter("Supported files", &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"])
        .add_filter("Excel Files", &["xlsx", "xlsm", "xls"])
        .add_filter("OpenDocument", &["ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match session.load(&path) {
            Ok(()) => log::debug!("Opened {}", path.display()),
            Err(e) => log::debug!("Open of {} failed: {e}", path.display()),
        }
    }
}
