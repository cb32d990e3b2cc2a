mod app;
mod color;
mod data;
mod session;
mod state;
mod ui;

use std::path::PathBuf;

use app::ChainValidatorApp;
use clap::Parser;
use eframe::egui;
use state::{Action, AppState};

#[derive(Parser, Debug)]
#[command(name = "chain-validator")]
#[command(about = "Review restaurant-to-chain assignments row by row")]
#[command(version)]
struct Cli {
    /// CSV, XLSX or XLS file to open at start-up
    file: Option<PathBuf>,

    /// Write validations into this directory instead of asking where to save
    #[arg(long, short = 'o')]
    output_dir: Option<PathBuf>,
}

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let mut state = AppState::with_output_dir(cli.output_dir);
    if let Some(path) = cli.file {
        state.dispatch(Action::Open(path));
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Validación de Cadenas",
        options,
        Box::new(|_cc| Ok(Box::new(ChainValidatorApp::new(state)))),
    )
}
