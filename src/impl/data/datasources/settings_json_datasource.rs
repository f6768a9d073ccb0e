use std::path::Path;

use crate::{domain::entities::settings::Settings, errors::PipelineError};

/// Loads the JSON settings file. Field-level validation is handled by the
/// deserializer; cross-field checks live here.
pub(crate) struct SettingsJsonDatasource;

impl SettingsJsonDatasource {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn from_string(&self, path: &Path, s: &str) -> Result<Settings, PipelineError> {
        // Tolerate a UTF-8 BOM, which spreadsheet tooling likes to add.
        let s = s.strip_prefix('\u{feff}').unwrap_or(s);
        let settings: Settings =
            serde_json::from_str(s).map_err(|e| PipelineError::InvalidSettings {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        if settings.files.input_extension.is_empty() {
            return Err(PipelineError::InvalidSettings {
                path: path.to_path_buf(),
                detail: "files.input_extension must not be empty".to_owned(),
            });
        }
        Ok(settings)
    }

    pub(crate) async fn from_file(&self, path: &Path) -> Result<Settings, PipelineError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PipelineError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
        self.from_string(path, &contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"{
        "paths": {"input_dir": "input_data", "output_dir": "output_data"},
        "files": {
            "input_extension": ".csv",
            "cleaned_output": "cleaned_master.csv",
            "report_output": "summary_report.xlsx"
        },
        "columns": {
            "quantity": "Quantity",
            "unit_price": "UnitPrice",
            "status": "Status",
            "category": "Category",
            "region": "Region",
            "expense": "Expense",
            "order_id": "OrderID"
        },
        "filters": {"completed_statuses": ["Completed", "Shipped"]}
    }"#;

    #[test]
    fn parses_a_full_settings_file() {
        let settings = SettingsJsonDatasource::new()
            .from_string(&PathBuf::from("config.json"), SAMPLE)
            .unwrap();
        assert_eq!(settings.files.input_extension, ".csv");
        assert_eq!(settings.columns.order_id.as_deref(), Some("OrderID"));
        assert_eq!(settings.filters.completed_statuses.len(), 2);
        // Defaults.
        assert!(!settings.strict_email);
        assert!(settings.notifications.is_none());
        assert_eq!(settings.files.diagnostics_output, "data_quality_issues.csv");
        assert_eq!(settings.files.benchmark_output, "benchmark_summary.csv");
    }

    #[test]
    fn missing_required_section_is_an_error() {
        let err = SettingsJsonDatasource::new()
            .from_string(&PathBuf::from("config.json"), r#"{"paths": {}}"#)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSettings { .. }));
    }

    #[test]
    fn tolerates_a_byte_order_mark() {
        let with_bom = format!("\u{feff}{}", SAMPLE);
        assert!(SettingsJsonDatasource::new()
            .from_string(&PathBuf::from("config.json"), &with_bom)
            .is_ok());
    }
}
