pub mod review;
pub mod upload;

use eframe::egui::{Color32, RichText, Ui};

use crate::state::AppState;

/// Status line shared by both pages.
pub fn status_line(ui: &mut Ui, state: &AppState) {
    if let Some(msg) = &state.status_message {
        ui.label(RichText::new(msg).color(Color32::RED));
    }
}
