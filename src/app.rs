use eframe::egui;

use crate::state::AppState;
use crate::ui::{review, upload};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ChainValidatorApp {
    pub state: AppState,
}

impl ChainValidatorApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ChainValidatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut action = None;

        if self.state.review_started {
            // ---- Right side panel: running summary ----
            if let Some(session) = &self.state.session {
                egui::SidePanel::right("summary_panel")
                    .default_width(240.0)
                    .resizable(true)
                    .show(ctx, |ui| {
                        review::summary_panel(ui, session);
                    });
            }

            // ---- Central panel: row under review ----
            egui::CentralPanel::default().show(ctx, |ui| {
                action = review::review_page(ui, &self.state);
            });
        } else {
            egui::CentralPanel::default().show(ctx, |ui| {
                action = upload::upload_page(ui, &self.state);
            });
        }

        // One action per frame; the next frame renders the new state.
        if let Some(action) = action {
            self.state.dispatch(action);
            ctx.request_repaint();
        }
    }
}
