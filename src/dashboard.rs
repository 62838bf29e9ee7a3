use std::path::{Path, PathBuf};

use crate::config::DashboardConfig;
use crate::data::aggregate::{cross_tab, distinct_values, value_counts, CrossTab, FrequencyTable};
use crate::data::filter::{apply, FilterPredicate};
use crate::data::loader::load_file;
use crate::data::model::{Table, Value};
use crate::data::summary::{summarize, SummaryStats};
use crate::error::{ColumnNotFoundError, DashboardError, LoadError};

// ---------------------------------------------------------------------------
// Schema capabilities
// ---------------------------------------------------------------------------

/// Which optional panels the loaded table can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub has_risk_level: bool,
    pub has_anomaly: bool,
    pub has_mask_type: bool,
}

impl Capabilities {
    /// The cross-tab needs both the mask type and the risk level.
    pub fn has_mask_by_risk(&self) -> bool {
        self.has_mask_type && self.has_risk_level
    }
}

/// The single schema query: which of the configured columns are present.
pub fn capabilities(table: &Table, config: &DashboardConfig) -> Capabilities {
    Capabilities {
        has_risk_level: table.has_column(&config.risk_column),
        has_anomaly: table.has_column(&config.anomaly_column),
        has_mask_type: table.has_column(&config.mask_type_column),
    }
}

// ---------------------------------------------------------------------------
// Render output
// ---------------------------------------------------------------------------

/// Everything the presentation layer needs for one render pass.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub capabilities: Capabilities,
    pub summary: SummaryStats,
    pub risk_counts: Option<FrequencyTable>,
    pub anomaly_counts: Option<FrequencyTable>,
    pub mask_by_risk: Option<CrossTab>,
    /// Sorted distinct risk levels offered after "All".
    pub filter_options: Vec<Value>,
    /// The honoured selection; `None` means "All".
    pub selected: Option<Value>,
    pub records: Table,
    pub total_rows: usize,
}

impl DashboardView {
    pub fn shown_rows(&self) -> usize {
        self.records.num_rows()
    }
}

/// Run the fixed pipeline over an already loaded table.
///
/// `choice` is the user's risk-level selection (`None` for "All"); it is
/// ignored when the table has no risk-level column.
pub fn build_view(
    table: &Table,
    config: &DashboardConfig,
    choice: Option<&Value>,
) -> Result<DashboardView, DashboardError> {
    let caps = capabilities(table, config);

    let summary = summarize(table);

    let risk_counts = guarded("risk level distribution", caps.has_risk_level, || {
        value_counts(table, &config.risk_column)
    });
    let anomaly_counts = guarded("anomaly breakdown", caps.has_anomaly, || {
        value_counts(table, &config.anomaly_column)
    });
    let mask_by_risk = guarded("mask type vs risk level", caps.has_mask_by_risk(), || {
        cross_tab(table, &config.mask_type_column, &config.risk_column)
    });

    let (filter_options, predicate, selected) = match (caps.has_risk_level, choice) {
        (true, Some(value)) => (
            distinct_values(table, &config.risk_column)?,
            FilterPredicate::equals(config.risk_column.as_str(), value.clone()),
            Some(value.clone()),
        ),
        (true, None) => (
            distinct_values(table, &config.risk_column)?,
            FilterPredicate::All,
            None,
        ),
        (false, _) => (Vec::new(), FilterPredicate::All, None),
    };

    let records = apply(table, &predicate)?;

    Ok(DashboardView {
        capabilities: caps,
        summary,
        risk_counts,
        anomaly_counts,
        mask_by_risk,
        filter_options,
        selected,
        records,
        total_rows: table.num_rows(),
    })
}

/// Per-feature soft skip: absent columns omit the panel instead of failing.
fn guarded<T>(
    feature: &str,
    enabled: bool,
    compute: impl FnOnce() -> Result<T, ColumnNotFoundError>,
) -> Option<T> {
    if !enabled {
        log::debug!("skipping {feature}: required column absent");
        return None;
    }
    match compute() {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("skipping {feature}: {e}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Session – table handle shared by every render pass
// ---------------------------------------------------------------------------

/// A session owns the dataset path and the table loaded from it.
///
/// The table is loaded on first use and reused by later render passes.
/// A failed load is not remembered, so rendering again retries it.
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    table: Option<Table>,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The session table, loading it if this is the first access.
    pub fn table(&mut self) -> Result<&Table, LoadError> {
        let table = match self.table.take() {
            Some(table) => table,
            None => {
                let table = load_file(&self.path)?;
                log::info!(
                    "Loaded {} rows with columns {:?} from {}",
                    table.num_rows(),
                    table.column_names().collect::<Vec<_>>(),
                    self.path.display()
                );
                table
            }
        };
        let table: &Table = self.table.insert(table);
        Ok(table)
    }

    /// One full pass: load (cached) then compute every panel.
    pub fn render(
        &mut self,
        config: &DashboardConfig,
        choice: Option<&Value>,
    ) -> Result<DashboardView, DashboardError> {
        let table = self.table()?;
        build_view(table, config, choice)
    }
}

#[cfg(test)]
impl Session {
    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;
    use crate::data::model::Column;

    fn strings(values: &[&str]) -> Vec<Value> {
        values.iter().map(|&v| Value::from(v)).collect()
    }

    fn vitals() -> Table {
        Table::new(vec![
            Column::inferred(
                "heart_rate",
                vec![
                    Value::Integer(72),
                    Value::Integer(128),
                    Value::Integer(121),
                    Value::Integer(140),
                    Value::Integer(66),
                ],
            ),
            Column::inferred("risk_level", strings(&["low", "high", "high", "critical", "low"])),
            Column::inferred("anomaly", [0, 1, 1, 1, 0].map(Value::Integer).to_vec()),
            Column::inferred(
                "masktype_label",
                strings(&["N95", "cloth", "N95", "surgical", "cloth"]),
            ),
        ])
        .unwrap()
    }

    fn write_csv(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("vitals.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_capabilities() {
        let config = DashboardConfig::default();
        let caps = capabilities(&vitals(), &config);
        assert_eq!(
            caps,
            Capabilities {
                has_risk_level: true,
                has_anomaly: true,
                has_mask_type: true
            }
        );

        let bare = Table::new(vec![Column::inferred("masktype_label", strings(&["N95"]))]).unwrap();
        let caps = capabilities(&bare, &config);
        assert!(caps.has_mask_type);
        assert!(!caps.has_mask_by_risk());
    }

    #[test]
    fn test_full_view() {
        let view = build_view(&vitals(), &DashboardConfig::default(), None).unwrap();

        assert_eq!(view.summary.len(), 2);
        assert!(view.summary.get("heart_rate").is_some());
        let risk = view.risk_counts.as_ref().unwrap();
        assert_eq!(risk.get(&Value::from("high")), 2);
        let anomaly = view.anomaly_counts.as_ref().unwrap();
        assert_eq!(anomaly.get(&Value::Integer(1)), 3);
        assert_eq!(view.mask_by_risk.as_ref().unwrap().total(), 5);
        assert_eq!(
            view.filter_options,
            strings(&["critical", "high", "low"])
        );
        assert_eq!(view.selected, None);
        assert_eq!(view.shown_rows(), 5);
        assert_eq!(view.total_rows, 5);
    }

    #[test]
    fn test_filtered_view() {
        let high = Value::from("high");
        let view = build_view(&vitals(), &DashboardConfig::default(), Some(&high)).unwrap();

        assert_eq!(view.shown_rows(), 2);
        assert_eq!(view.total_rows, 5);
        assert_eq!(view.selected, Some(high));
        // panels still describe the whole table
        assert_eq!(view.risk_counts.unwrap().total(), 5);
    }

    #[test]
    fn test_absent_columns_skip_panels_independently() {
        let table = Table::new(vec![
            Column::inferred("spo2", vec![Value::Float(97.0), Value::Float(91.0)]),
            Column::inferred("anomaly", vec![Value::Integer(0), Value::Integer(1)]),
        ])
        .unwrap();

        let view = build_view(&table, &DashboardConfig::default(), Some(&Value::from("high"))).unwrap();

        assert!(view.risk_counts.is_none());
        assert!(view.mask_by_risk.is_none());
        assert!(view.anomaly_counts.is_some());
        assert!(view.filter_options.is_empty());
        // without a risk column the selection cannot apply
        assert_eq!(view.selected, None);
        assert_eq!(view.shown_rows(), 2);
    }

    #[test]
    fn test_missing_file_fails_render() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(dir.path().join("vitals_transformed.parquet"));

        let err = session.render(&DashboardConfig::default(), None).unwrap_err();
        assert!(matches!(err, DashboardError::Load(LoadError::Io { .. })), "got {err}");
        assert!(!session.is_loaded());
    }

    #[test]
    fn test_session_loads_once() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "heart_rate,risk_level\n72,low\n128,high\n140,critical\n",
        );
        let config = DashboardConfig::default();
        let mut session = Session::new(&path);

        let first = session.render(&config, None).unwrap();
        assert_eq!(first.shown_rows(), 3);

        // The cached table keeps serving filter changes.
        std::fs::remove_file(&path).unwrap();
        let second = session.render(&config, Some(&Value::from("critical"))).unwrap();
        assert_eq!(second.shown_rows(), 1);
        assert_eq!(second.total_rows, 3);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vitals.csv");
        let mut session = Session::new(&path);
        let config = DashboardConfig::default();

        assert!(session.render(&config, None).is_err());

        write_csv(&dir, "risk_level\nlow\n");
        let view = session.render(&config, None).unwrap();
        assert_eq!(view.total_rows, 1);
    }
}
