use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::color::{row_style, RowStyle};
use crate::config::DashboardConfig;
use crate::data::aggregate::CrossTab;
use crate::data::model::Table;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Cross-tabulation grid
// ---------------------------------------------------------------------------

/// One line per observed pair, like a reset `groupby(...).size()` frame.
pub fn cross_tab_grid(ui: &mut Ui, ct: &CrossTab) {
    if ct.is_empty() {
        ui.label("No co-occurring values.");
        return;
    }
    egui::Grid::new("cross_tab")
        .striped(true)
        .min_col_width(80.0)
        .show(ui, |ui: &mut Ui| {
            ui.strong(&ct.column_a);
            ui.strong(&ct.column_b);
            ui.strong("count");
            ui.end_row();

            for (a, b, count) in ct.iter() {
                ui.label(a.to_string());
                ui.label(b.to_string());
                ui.label(count.to_string());
                ui.end_row();
            }
        });
    ui.weak(format!("{} records with both values", ct.total()));
}

// ---------------------------------------------------------------------------
// Record table
// ---------------------------------------------------------------------------

/// Render every record, highlighting rows whose risk level is an alert level.
pub fn record_table(ui: &mut Ui, records: &Table, config: &DashboardConfig) {
    if records.num_columns() == 0 {
        ui.label("No columns.");
        return;
    }
    if records.is_empty() {
        ui.label("No matching records.");
        return;
    }

    let risk_idx = records.column_index(&config.risk_column);
    let n_cols = records.num_columns();

    ui.push_id("record_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(TableColumn::auto().at_least(70.0).clip(true), n_cols)
            .min_scrolled_height(0.0)
            .max_scroll_height(420.0)
            .header(20.0, |mut header| {
                for descriptor in records.descriptors() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&descriptor.name)
                            .on_hover_text(descriptor.kind.to_string());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, records.num_rows(), |mut row| {
                    let r = row.index();
                    let style = risk_idx
                        .and_then(|c| records.cell(r, c))
                        .map_or(RowStyle::Normal, |level| {
                            row_style(level, &config.alert_levels)
                        });
                    for c in 0..n_cols {
                        let text = records.cell(r, c).map(|v| v.to_string()).unwrap_or_default();
                        row.col(|ui: &mut Ui| {
                            let mut text = RichText::new(text);
                            if let Some(color) = style.text_color() {
                                text = text.color(color).strong();
                            }
                            ui.label(text);
                        });
                    }
                });
            });
    });
}
