use serde::Serialize;

use super::model::{ColumnKind, Table};

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// The eight `describe()` statistics of one numeric column.
///
/// Everything except `count` is `NaN` when the column has no values, and
/// `std` is `NaN` when it has exactly one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Per-column summaries of every numeric column, in table order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SummaryStats {
    pub columns: Vec<ColumnSummary>,
}

impl SummaryStats {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
impl SummaryStats {
    pub fn get(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }
}

/// Row labels in display order, paired with their accessor.
pub const STAT_ROWS: [(&str, fn(&ColumnSummary) -> f64); 8] = [
    ("count", |s: &ColumnSummary| s.count as f64),
    ("mean", |s: &ColumnSummary| s.mean),
    ("std", |s: &ColumnSummary| s.std),
    ("min", |s: &ColumnSummary| s.min),
    ("25%", |s: &ColumnSummary| s.p25),
    ("50%", |s: &ColumnSummary| s.p50),
    ("75%", |s: &ColumnSummary| s.p75),
    ("max", |s: &ColumnSummary| s.max),
];

/// Describe every numeric column; other kinds are skipped silently.
pub fn summarize(table: &Table) -> SummaryStats {
    let columns = table
        .columns()
        .iter()
        .filter(|col| col.kind() == ColumnKind::Numeric)
        .map(|col| {
            let mut values: Vec<f64> = col
                .values()
                .iter()
                .filter_map(|v| v.as_f64())
                .filter(|v| !v.is_nan())
                .collect();
            values.sort_by(f64::total_cmp);
            describe(col.name(), &values)
        })
        .collect();
    SummaryStats { columns }
}

fn describe(name: &str, sorted: &[f64]) -> ColumnSummary {
    let count = sorted.len();
    let mean = if count == 0 {
        f64::NAN
    } else {
        sorted.iter().sum::<f64>() / count as f64
    };
    let std = if count < 2 {
        f64::NAN
    } else {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    };

    ColumnSummary {
        name: name.to_string(),
        count,
        mean,
        std,
        min: sorted.first().copied().unwrap_or(f64::NAN),
        p25: quantile(sorted, 0.25),
        p50: quantile(sorted, 0.5),
        p75: quantile(sorted, 0.75),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

/// Linear interpolation between closest ranks of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted {
        [] => f64::NAN,
        [only] => *only,
        _ => {
            let pos = q * (sorted.len() - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind, Value};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn vitals() -> Table {
        Table::new(vec![
            Column::inferred(
                "heart_rate",
                vec![
                    Value::Integer(60),
                    Value::Integer(70),
                    Value::Null,
                    Value::Integer(80),
                    Value::Integer(90),
                ],
            ),
            Column::inferred(
                "risk_level",
                ["low", "high", "high", "critical", "low"].map(Value::from).to_vec(),
            ),
            Column::inferred(
                "on_oxygen",
                [true, false, false, true, false].map(Value::from).to_vec(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_only_numeric_columns_are_described() {
        let table = vitals();
        let stats = summarize(&table);
        assert_eq!(stats.len(), 1);
        let hr = stats.get("heart_rate").unwrap();
        assert!(hr.count <= table.num_rows());
        assert!(stats.get("risk_level").is_none());
        assert!(stats.get("on_oxygen").is_none());
    }

    #[test]
    fn test_describe_matches_pandas() {
        let stats = summarize(&vitals());
        let hr = stats.get("heart_rate").unwrap();
        assert_eq!(hr.count, 4);
        assert!(approx(hr.mean, 75.0));
        // sample std of 60, 70, 80, 90
        assert!(approx(hr.std, 12.909944487358056));
        assert!(approx(hr.min, 60.0));
        assert!(approx(hr.p25, 67.5));
        assert!(approx(hr.p50, 75.0));
        assert!(approx(hr.p75, 82.5));
        assert!(approx(hr.max, 90.0));
    }

    #[test]
    fn test_empty_numeric_column_yields_nan() {
        let table = Table::new(vec![Column::new(
            "temperature",
            ColumnKind::Numeric,
            vec![Value::Null, Value::Null],
        )])
        .unwrap();
        let stats = summarize(&table);
        let t = stats.get("temperature").unwrap();
        assert_eq!(t.count, 0);
        assert!(t.mean.is_nan());
        assert!(t.std.is_nan());
        assert!(t.p50.is_nan());
        assert!(t.max.is_nan());
    }

    #[test]
    fn test_single_value_has_undefined_std() {
        let table =
            Table::new(vec![Column::inferred("spo2", vec![Value::Float(97.5)])]).unwrap();
        let s = summarize(&table);
        let spo2 = s.get("spo2").unwrap();
        assert!(spo2.std.is_nan());
        assert!(approx(spo2.p25, 97.5));
        assert!(approx(spo2.p75, 97.5));
    }

    #[test]
    fn test_stat_rows_cover_all_fields() {
        let stats = summarize(&vitals());
        let hr = stats.get("heart_rate").unwrap();
        let labels: Vec<&str> = STAT_ROWS.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, ["count", "mean", "std", "min", "25%", "50%", "75%", "max"]);
        assert!(approx((STAT_ROWS[0].1)(hr), 4.0));
    }
}
