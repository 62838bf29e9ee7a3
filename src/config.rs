use std::path::PathBuf;

/// File loaded when the application starts.
pub const DEFAULT_DATASET: &str = "vitals_transformed.parquet";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Compiled-in settings for the dashboard.  The dataset schema is only
/// loosely constrained: these are the column names the optional panels look for.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub dataset_path: PathBuf,
    pub window_title: String,
    pub risk_column: String,
    pub anomaly_column: String,
    pub mask_type_column: String,
    /// Risk levels whose records are highlighted, matched case-insensitively.
    pub alert_levels: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            window_title: "HealthyPulse – Patient Vitals Dashboard".to_string(),
            risk_column: "risk_level".to_string(),
            anomaly_column: "anomaly".to_string(),
            mask_type_column: "masktype_label".to_string(),
            alert_levels: vec!["high".to_string(), "critical".to_string()],
        }
    }
}
