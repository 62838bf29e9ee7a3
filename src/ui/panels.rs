use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::dashboard::DashboardView;
use crate::data::model::Value;
use crate::data::summary::{SummaryStats, STAT_ROWS};
use crate::state::AppState;
use crate::ui::{plot, table};

/// Interactions collected while drawing the dashboard; applied afterwards so
/// the view can stay borrowed during rendering.
#[derive(Debug, Default)]
pub struct UiEvents {
    /// `Some(choice)` when the risk-level selection changed.
    pub risk_choice: Option<Option<Value>>,
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Central panel – dashboard sections
// ---------------------------------------------------------------------------

/// Render every section the view carries, top to bottom.
pub fn dashboard(ui: &mut Ui, view: &DashboardView, config: &DashboardConfig) -> UiEvents {
    let mut events = UiEvents::default();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            section_header(ui, "Basic Statistics", &view.summary, &mut events);
            stats_grid(ui, &view.summary);
            ui.separator();

            if let Some(freq) = &view.risk_counts {
                section_header(ui, "Risk Level Distribution", freq, &mut events);
                plot::frequency_chart(ui, "risk_level_chart", freq);
                ui.separator();
            }

            if let Some(freq) = &view.anomaly_counts {
                section_header(ui, "Anomaly Flag Breakdown", freq, &mut events);
                plot::frequency_chart(ui, "anomaly_chart", freq);
                ui.separator();
            }

            if let Some(ct) = &view.mask_by_risk {
                section_header(ui, "Mask Type vs Risk Level", ct, &mut events);
                table::cross_tab_grid(ui, ct);
                ui.separator();
            }

            ui.heading("Filter Patients by Risk Level");
            if view.capabilities.has_risk_level {
                events.risk_choice = risk_filter(ui, view);
            } else {
                ui.label(format!("No '{}' column: showing every record.", config.risk_column));
            }
            ui.label(format!("Showing {} records", view.shown_rows()));
            table::record_table(ui, &view.records, config);
        });

    events
}

fn section_header<T: Serialize>(ui: &mut Ui, title: &str, artifact: &T, events: &mut UiEvents) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading(title);
        if ui.small_button("Copy as JSON").clicked() {
            match serde_json::to_string_pretty(artifact) {
                Ok(json) => {
                    ui.ctx().copy_text(json);
                    events.status = Some(format!("Copied {title}"));
                }
                Err(e) => {
                    log::error!("Failed to serialise {title}: {e}");
                    events.status = Some(format!("Error: {e}"));
                }
            }
        }
    });
}

/// `describe()`-style grid: one row per statistic, one column per numeric column.
fn stats_grid(ui: &mut Ui, summary: &SummaryStats) {
    if summary.is_empty() {
        ui.label("No numeric columns.");
        return;
    }
    ScrollArea::horizontal()
        .id_salt("stats_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("stats_grid")
                .striped(true)
                .min_col_width(70.0)
                .show(ui, |ui: &mut Ui| {
                    ui.label("");
                    for col in &summary.columns {
                        ui.strong(&col.name);
                    }
                    ui.end_row();

                    for (label, stat) in STAT_ROWS {
                        ui.strong(label);
                        for col in &summary.columns {
                            ui.label(format_stat(stat(col)));
                        }
                        ui.end_row();
                    }
                });
        });
}

fn format_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.3}")
    }
}

/// Single-select control: "All" plus the sorted risk levels.
/// Returns the new choice when the user changed it.
fn risk_filter(ui: &mut Ui, view: &DashboardView) -> Option<Option<Value>> {
    let mut changed = None;
    let current = view
        .selected
        .as_ref()
        .map_or_else(|| "All".to_string(), |v| v.to_string());

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Choose a risk level");
        egui::ComboBox::from_id_salt("risk_filter")
            .selected_text(current)
            .show_ui(ui, |ui: &mut Ui| {
                if ui.selectable_label(view.selected.is_none(), "All").clicked() {
                    changed = Some(None);
                }
                for option in &view.filter_options {
                    let is_selected = view.selected.as_ref() == Some(option);
                    if ui
                        .selectable_label(is_selected, option.to_string())
                        .clicked()
                    {
                        changed = Some(Some(option.clone()));
                    }
                }
            });
    });

    changed
}

/// Replaces the whole dashboard when the render pass failed.
pub fn error_view(ui: &mut Ui, message: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(RichText::new(message).color(Color32::RED).heading());
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(state.session.path().display().to_string());

        if let Some(view) = &state.view {
            ui.separator();
            ui.label(format!(
                "{} records loaded, {} shown",
                view.total_rows,
                view.shown_rows()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).italics());
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open vitals dataset")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.open(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_stat() {
        assert_eq!(format_stat(f64::NAN), "NaN");
        assert_eq!(format_stat(5.0), "5");
        assert_eq!(format_stat(12.909944), "12.910");
    }
}
