use std::path::PathBuf;

/// Final disposition of one pipeline run, returned to the caller. The exit
/// code follows the taxonomy in `crate::errors`.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub exit_code: i32,
    pub report_path: Option<PathBuf>,
    pub cleaned_path: Option<PathBuf>,
    pub reject_count: usize,
    pub cleaned_rows: usize,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == crate::errors::EXIT_OK
    }
}
