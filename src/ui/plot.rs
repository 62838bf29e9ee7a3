use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Plot};

use crate::color::ColorMap;
use crate::data::aggregate::FrequencyTable;

// ---------------------------------------------------------------------------
// Frequency bar charts
// ---------------------------------------------------------------------------

/// Render one bar per bucket of `freq`, tallest first.
pub fn frequency_chart(ui: &mut Ui, id: &str, freq: &FrequencyTable) {
    if freq.is_empty() {
        ui.label("No records.");
        return;
    }
    let entries = freq.by_count();

    let colors = ColorMap::new(entries.iter().map(|(value, _)| *value));
    let labels: Vec<String> = entries.iter().map(|(value, _)| value.to_string()).collect();

    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, (value, count))| {
            Bar::new(i as f64, *count as f64)
                .name(value.to_string())
                .fill(colors.color_for(value))
                .width(0.7)
        })
        .collect();

    let chart = BarChart::new(bars)
        .name(&freq.column)
        .element_formatter(Box::new(|bar, _| format!("{}\ncount: {}", bar.name, bar.value)));

    Plot::new(id)
        .height(220.0)
        .y_axis_label("count")
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show_grid([false, true])
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });

    match freq.missing() {
        0 => ui.weak(format!("{} records", freq.total())),
        n => ui.weak(format!("{} records, {n} missing", freq.total())),
    };
}
