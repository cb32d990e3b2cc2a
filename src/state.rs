use std::path::{Path, PathBuf};

use crate::data::model::Verdict;
use crate::session::ReviewSession;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Everything the user can do; each UI event becomes exactly one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Load a file into a fresh session.
    Open(PathBuf),
    /// Leave the upload page and start reviewing.
    Begin,
    /// Label the current row and move on.
    Mark(Verdict),
    /// Go back one row.
    Back,
    /// Export the labeled dataset to the given file.
    Save(PathBuf),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded session (None until the user opens a file).
    pub session: Option<ReviewSession>,

    /// Whether the user has moved past the upload page.
    pub review_started: bool,

    /// Directory exports are written to without asking.
    pub output_dir: Option<PathBuf>,

    /// Where the last export went.
    pub last_saved: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn with_output_dir(output_dir: Option<PathBuf>) -> Self {
        Self {
            output_dir,
            ..Default::default()
        }
    }

    /// Apply one action.  Failures end up in `status_message`; the session
    /// is left as it was.
    pub fn dispatch(&mut self, action: Action) {
        log::debug!("Dispatching {action:?}");
        match action {
            Action::Open(path) => self.open(&path),
            Action::Begin => self.begin(),
            Action::Mark(verdict) => {
                if let Some(session) = self.active_session() {
                    session.advance(verdict);
                }
            }
            Action::Back => {
                if let Some(session) = self.active_session() {
                    session.retreat();
                }
            }
            Action::Save(path) => self.save(&path),
        }
    }

    /// Session under review, if review has started.
    fn active_session(&mut self) -> Option<&mut ReviewSession> {
        if self.review_started {
            self.session.as_mut()
        } else {
            None
        }
    }

    fn open(&mut self, path: &Path) {
        match ReviewSession::load(path) {
            Ok(session) => {
                self.session = Some(session);
                self.review_started = false;
                self.last_saved = None;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    fn begin(&mut self) {
        match &self.session {
            Some(session) if !session.is_empty() => {
                self.review_started = true;
                self.status_message = None;
            }
            Some(_) => {
                self.status_message = Some("El archivo no contiene filas para validar.".into());
            }
            None => {
                self.status_message = Some("Primero sube un archivo.".into());
            }
        }
    }

    fn save(&mut self, path: &Path) {
        let Some(session) = &self.session else {
            return;
        };
        match session.export_to(path) {
            Ok(()) => {
                self.status_message = None;
                self.last_saved = Some(path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to save validation: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Destination for a save without a dialog, when an output directory is
    /// configured.
    pub fn default_save_path(&self) -> Option<PathBuf> {
        let dir = self.output_dir.as_ref()?;
        let name = self.session.as_ref()?.export_file_name().ok()?;
        Some(dir.join(name))
    }
}
