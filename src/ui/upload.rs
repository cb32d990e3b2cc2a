use eframe::egui::{RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::FileFormat;
use crate::session::ReviewSession;
use crate::state::{Action, AppState};

/// Rows shown in the preview table.
const PREVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Upload page
// ---------------------------------------------------------------------------

/// Render the upload page and return the action the user triggered, if any.
pub fn upload_page(ui: &mut Ui, state: &AppState) -> Option<Action> {
    let mut action = None;

    ui.heading("Valida las Cadenas asignadas a los restaurantes");
    ui.add_space(8.0);

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Sube tu archivo (Excel o CSV)");
        if ui.button("Abrir archivo…").clicked() {
            action = open_file_dialog().map(Action::Open);
        }
        if let Some(session) = &state.session {
            ui.label(RichText::new(session.source_name()).monospace());
        }
    });
    super::status_line(ui, state);

    let Some(session) = &state.session else {
        return action;
    };

    ui.add_space(8.0);
    ui.label(RichText::new("Vista previa de los datos:").strong().size(18.0));
    ui.label(format!(
        "{} filas, {} columnas",
        session.len(),
        session.dataset().columns.len()
    ));
    preview_table(ui, session);

    ui.add_space(8.0);
    if ui.button("Comenzar").clicked() {
        action = Some(Action::Begin);
    }

    action
}

fn preview_table(ui: &mut Ui, session: &ReviewSession) {
    let dataset = session.dataset();
    ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .columns(Column::auto().resizable(true), dataset.columns.len())
                .header(20.0, |mut header| {
                    for name in &dataset.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for row in dataset.head(PREVIEW_ROWS) {
                        body.row(18.0, |mut table_row| {
                            for value in row {
                                table_row.col(|ui: &mut Ui| {
                                    ui.label(value.to_string());
                                });
                            }
                        });
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

fn open_file_dialog() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Abrir archivo")
        .add_filter("Excel o CSV", &FileFormat::EXTENSIONS)
        .add_filter("Excel", &["xlsx", "xls"])
        .add_filter("CSV", &["csv"])
        .pick_file()
}

