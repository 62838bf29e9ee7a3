use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HealthyPulseApp {
    pub state: AppState,
}

impl HealthyPulseApp {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for HealthyPulseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: dashboard, or the load error alone ----
        let events = egui::CentralPanel::default()
            .show(ctx, |ui| {
                ui.heading(&self.state.config.window_title);
                ui.separator();
                match (&self.state.view, &self.state.error_message) {
                    (_, Some(msg)) => {
                        panels::error_view(ui, msg);
                        None
                    }
                    (Some(view), None) => Some(panels::dashboard(ui, view, &self.state.config)),
                    (None, None) => None,
                }
            })
            .inner;

        // Apply interactions after the view is no longer borrowed.
        if let Some(events) = events {
            if let Some(status) = events.status {
                self.state.status_message = Some(status);
            }
            if let Some(choice) = events.risk_choice {
                self.state.set_risk_choice(choice);
            }
        }
    }
}
