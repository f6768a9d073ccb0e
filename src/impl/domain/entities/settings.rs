use std::path::PathBuf;

/// Pipeline configuration, constructed once at startup and passed by
/// reference into each component. No component reads process environment
/// state directly; environment indirection is resolved by the caller.
#[derive(Debug, Clone, serde_derive::Deserialize)]
pub struct Settings {
    pub paths: PathsSettings,
    pub files: FilesSettings,
    pub columns: ColumnsSettings,
    #[serde(default)]
    pub filters: FiltersSettings,
    #[serde(default)]
    pub notifications: Option<SmtpSettings>,
    #[serde(default)]
    pub strict_email: bool,
    /// Email of the user running the pipeline; authorization is checked
    /// against the users file when set.
    #[serde(default)]
    pub operator: Option<String>,
    /// Append-only event log destination. Defaults to `logs/events.jsonl`
    /// under the working directory.
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, serde_derive::Deserialize)]
pub struct PathsSettings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, serde_derive::Deserialize)]
pub struct FilesSettings {
    pub input_extension: String,
    pub cleaned_output: String,
    pub report_output: String,
    #[serde(default = "default_diagnostics_output")]
    pub diagnostics_output: String,
    #[serde(default = "default_benchmark_output")]
    pub benchmark_output: String,
}

#[derive(Debug, Clone, serde_derive::Deserialize)]
pub struct ColumnsSettings {
    pub quantity: String,
    pub unit_price: String,
    pub status: String,
    pub category: String,
    pub region: String,
    #[serde(default)]
    pub expense: Option<String>,
    /// Identity column used as the dedup key. When unset (or blank in a
    /// given row), dedup falls back to full-row identity.
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, Default, serde_derive::Deserialize)]
pub struct FiltersSettings {
    /// Status values counted as completed transactions when summing
    /// Total Earning. Empty means no filtering.
    #[serde(default)]
    pub completed_statuses: Vec<String>,
}

#[derive(Debug, Clone, serde_derive::Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

fn default_diagnostics_output() -> String {
    "data_quality_issues.csv".to_owned()
}

fn default_benchmark_output() -> String {
    "benchmark_summary.csv".to_owned()
}

fn default_send_timeout_secs() -> u64 {
    30
}

impl Settings {
    pub fn cleaned_output_path(&self) -> PathBuf {
        self.paths.output_dir.join(&self.files.cleaned_output)
    }

    pub fn report_output_path(&self) -> PathBuf {
        self.paths.output_dir.join(&self.files.report_output)
    }

    pub fn diagnostics_output_path(&self) -> PathBuf {
        self.paths.output_dir.join(&self.files.diagnostics_output)
    }

    pub fn benchmark_output_path(&self) -> PathBuf {
        self.paths.output_dir.join(&self.files.benchmark_output)
    }
}

/// Per-invocation options from the CLI surface, kept separate from the
/// settings file so a single installation can run in either mode.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Never perform a real email send; log a simulated send instead.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        // Dry-run by default, matching the CLI.
        Self { dry_run: true }
    }
}
