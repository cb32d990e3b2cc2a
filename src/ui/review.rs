use std::path::PathBuf;

use eframe::egui::{self, Color32, Key, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::{info_fill, LabelColors};
use crate::data::model::{Label, Verdict, CHAIN_COLUMN, RESTAURANT_COLUMN};
use crate::session::ReviewSession;
use crate::state::{Action, AppState};

// ---------------------------------------------------------------------------
// Review page (central panel)
// ---------------------------------------------------------------------------

/// Render the row under review and return the action the user triggered.
pub fn review_page(ui: &mut Ui, state: &AppState) -> Option<Action> {
    let session = state.session.as_ref()?;
    let mut action = shortcut_action(ui);
    let cursor = session.cursor();
    let dataset = session.dataset();

    ui.heading("Proceso de Validación");
    ui.label(
        RichText::new(format!("Validando fila {} de {}", cursor + 1, session.len()))
            .strong()
            .size(18.0),
    );
    ui.separator();

    ui.columns(2, |cols: &mut [Ui]| {
        let primary = |ui: &mut Ui, title: &str, column: &str| {
            ui.strong(title);
            let value = dataset
                .get(cursor, column)
                .map(|v| v.to_string())
                .unwrap_or_default();
            egui::Frame::group(ui.style())
                .fill(info_fill())
                .show(ui, |ui: &mut Ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(RichText::new(value).color(Color32::BLACK));
                });
            ui.add_space(6.0);
        };
        primary(&mut cols[0], "Nombre Restaurante:", RESTAURANT_COLUMN);
        primary(&mut cols[0], "Cadena Asignada:", CHAIN_COLUMN);

        let ui = &mut cols[1];
        ui.strong("Otros Detalles:");
        ScrollArea::vertical()
            .id_salt("details_scroll")
            .max_height(260.0)
            .show(ui, |ui: &mut Ui| {
                for (column, value) in dataset.extra_details(cursor) {
                    ui.horizontal_wrapped(|ui: &mut Ui| {
                        ui.label(RichText::new(format!("• {column}:")).strong());
                        ui.label(value.to_string());
                    });
                }
            });
    });

    ui.separator();
    label_badge(ui, session.current_label());
    ui.add_space(4.0);

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Correcto").clicked() {
            action = Some(Action::Mark(Verdict::Correct));
        }
        if ui.button("Incorrecto").clicked() {
            action = Some(Action::Mark(Verdict::Incorrect));
        }
        if ui.add_enabled(cursor > 0, egui::Button::new("Atrás")).clicked() {
            action = Some(Action::Back);
        }
    });

    ui.add_space(12.0);
    if ui.button("Guardar Validación").clicked() {
        action = save_destination(state).map(Action::Save);
    }
    if let Some(path) = &state.last_saved {
        ui.label(format!("Guardado en {}", path.display()));
    }
    super::status_line(ui, state);

    action
}

/// `C` marks correct, `I` incorrect, Left arrow goes back.
fn shortcut_action(ui: &Ui) -> Option<Action> {
    ui.ctx().input(|input| {
        if input.key_pressed(Key::C) {
            Some(Action::Mark(Verdict::Correct))
        } else if input.key_pressed(Key::I) {
            Some(Action::Mark(Verdict::Incorrect))
        } else if input.key_pressed(Key::ArrowLeft) {
            Some(Action::Back)
        } else {
            None
        }
    })
}

fn label_badge(ui: &mut Ui, label: Label) {
    egui::Frame::group(ui.style())
        .fill(LabelColors::tint(label))
        .show(ui, |ui: &mut Ui| {
            ui.label(
                RichText::new(format!("Estado: {label}"))
                    .color(Color32::BLACK)
                    .strong(),
            );
        });
}

/// The configured output directory wins; otherwise ask with a save dialog.
fn save_destination(state: &AppState) -> Option<PathBuf> {
    if let Some(path) = state.default_save_path() {
        return Some(path);
    }
    let session = state.session.as_ref()?;
    let name = session
        .export_file_name()
        .unwrap_or_else(|_| session.source_name());
    rfd::FileDialog::new()
        .set_title("Guardar Validación")
        .set_file_name(name)
        .save_file()
}

// ---------------------------------------------------------------------------
// Summary (side panel)
// ---------------------------------------------------------------------------

/// Running counts, percentages and a bar chart of the labels so far.
pub fn summary_panel(ui: &mut Ui, session: &ReviewSession) {
    let summary = session.summarize();

    ui.heading("Resumen");
    ui.separator();
    ui.label(format!("Total: {}", summary.total));
    ui.label(
        RichText::new(format!(
            "Correctos: {} ({:.2}%)",
            summary.correct,
            summary.correct_pct()
        ))
        .color(LabelColors::strong(Label::Correct)),
    );
    ui.label(
        RichText::new(format!(
            "Incorrectos: {} ({:.2}%)",
            summary.incorrect,
            summary.incorrect_pct()
        ))
        .color(LabelColors::strong(Label::Incorrect)),
    );
    ui.label(format!("No revisados: {}", summary.not_reviewed));
    ui.add_space(8.0);

    let bars: Vec<Bar> = [
        (Label::Correct, summary.correct),
        (Label::Incorrect, summary.incorrect),
        (Label::NotReviewed, summary.not_reviewed),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (label, count))| {
        Bar::new(i as f64, count as f64)
            .name(label.as_str())
            .fill(LabelColors::strong(label))
    })
    .collect();

    Plot::new("summary_chart")
        .height(160.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show_x(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.6));
        });
}
