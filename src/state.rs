use std::path::PathBuf;

use crate::config::DashboardConfig;
use crate::dashboard::{DashboardView, Session};
use crate::data::model::Value;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Table handle for the current dataset file.
    pub session: Session,

    /// Risk level chosen in the filter control (`None` = "All").
    pub risk_choice: Option<Value>,

    /// Result of the latest render pass.
    pub view: Option<DashboardView>,

    /// Fatal error of the latest render pass; replaces the dashboard.
    pub error_message: Option<String>,

    /// Short feedback shown in the top bar (e.g. after copying).
    pub status_message: Option<String>,
}

impl AppState {
    /// Start a session on the configured dataset and run the first pass.
    pub fn new(config: DashboardConfig) -> Self {
        let session = Session::new(config.dataset_path.clone());
        let mut state = Self {
            config,
            session,
            risk_choice: None,
            view: None,
            error_message: None,
            status_message: None,
        };
        state.refresh();
        state
    }

    /// Run one render pass with the current selection.
    pub fn refresh(&mut self) {
        match self.session.render(&self.config, self.risk_choice.as_ref()) {
            Ok(view) => {
                self.risk_choice = view.selected.clone();
                self.view = Some(view);
                self.error_message = None;
            }
            Err(e) => {
                log::error!("Failed to render dashboard: {e}");
                self.view = None;
                self.error_message = Some(format!("⚠ Could not load dataset: {e}"));
            }
        }
    }

    /// Change the risk-level filter and re-render if it differs.
    pub fn set_risk_choice(&mut self, choice: Option<Value>) {
        if self.risk_choice != choice {
            self.risk_choice = choice;
            self.refresh();
        }
    }

    /// Start a new session on another file.
    pub fn open(&mut self, path: PathBuf) {
        self.session = Session::new(path);
        self.risk_choice = None;
        self.status_message = None;
        self.refresh();
    }

    /// Drop the cached table and load the current file again.
    pub fn reload(&mut self) {
        let path = self.session.path().to_path_buf();
        self.open(path);
    }
}
