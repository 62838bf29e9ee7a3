use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{FromColor, Hsl, Srgb};

use crate::data::model::Value;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// `n` hues spread evenly around the colour wheel at a fixed saturation
/// and lightness.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    let step = 360.0 / n.max(1) as f32;
    (0..n)
        .map(|i| to_color32(Hsl::new(step * i as f32, 0.65, 0.5)))
        .collect()
}

fn to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = Srgb::from_color(hsl);
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of a chart to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<Value, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the categories, in the order given.
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a Value>) -> Self {
        let categories: Vec<&Value> = categories.into_iter().collect();
        let palette = generate_palette(categories.len());
        let mapping = categories
            .into_iter()
            .zip(palette)
            .map(|(v, c)| {
                // missing values always render grey
                let c = if v.is_null() { Color32::GRAY } else { c };
                (v.clone(), c)
            })
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &Value) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Record row styling
// ---------------------------------------------------------------------------

/// How a record row is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    /// High or critical risk.
    Alert,
    Normal,
}

impl RowStyle {
    /// Text colour for the row, `None` keeps the theme default.
    pub fn text_color(self) -> Option<Color32> {
        match self {
            RowStyle::Alert => Some(Color32::from_rgb(230, 80, 70)),
            RowStyle::Normal => None,
        }
    }
}

/// Style for a record row, decided by its risk level alone.
/// Text levels are compared case-insensitively; anything else is normal.
pub fn row_style(risk_level: &Value, alert_levels: &[String]) -> RowStyle {
    let Some(level) = risk_level.as_str() else {
        return RowStyle::Normal;
    };
    let level = level.trim();
    if alert_levels.iter().any(|alert| alert.eq_ignore_ascii_case(level)) {
        RowStyle::Alert
    } else {
        RowStyle::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::DashboardConfig;

    #[test]
    fn test_row_style_alert_levels() {
        let levels = DashboardConfig::default().alert_levels;
        let style = |v: Value| row_style(&v, &levels);
        assert_eq!(style(Value::from("high")), RowStyle::Alert);
        assert_eq!(style(Value::from("CRITICAL")), RowStyle::Alert);
        assert_eq!(style(Value::from("High")), RowStyle::Alert);
        assert_eq!(style(Value::from("low")), RowStyle::Normal);
        assert_eq!(style(Value::from("highish")), RowStyle::Normal);
        assert_eq!(style(Value::Null), RowStyle::Normal);
        assert_eq!(style(Value::Integer(3)), RowStyle::Normal);
    }

    #[test]
    fn test_row_style_follows_configured_levels() {
        let levels = vec!["moderate".to_string()];
        assert_eq!(row_style(&Value::from("Moderate"), &levels), RowStyle::Alert);
        assert_eq!(row_style(&Value::from("critical"), &levels), RowStyle::Normal);
        assert_eq!(row_style(&Value::from("high"), &[]), RowStyle::Normal);
    }

    #[test]
    fn test_alert_rows_are_coloured() {
        assert!(RowStyle::Alert.text_color().is_some());
        assert!(RowStyle::Normal.text_color().is_none());
    }

    #[test]
    fn test_palette_is_distinct() {
        let palette = generate_palette(4);
        assert_eq!(palette.len(), 4);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_color_map_missing_is_grey() {
        let values = vec![Value::Null, Value::from("low"), Value::from("high")];
        let map = ColorMap::new(&values);
        assert_eq!(map.color_for(&Value::Null), Color32::GRAY);
        assert_ne!(map.color_for(&Value::from("low")), Color32::GRAY);
        assert_eq!(map.color_for(&Value::from("unknown")), Color32::GRAY);
    }
}
