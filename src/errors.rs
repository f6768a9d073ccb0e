use std::path::PathBuf;

use thiserror::Error;

/// Process exit codes decided by the pipeline orchestrator.
pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_NO_VALID_ROWS: i32 = 2;
pub const EXIT_EMAIL_FAILED: i32 = 3;

#[derive(Debug, Error)]
pub enum PipelineError {
    // IO-related.
    #[error("error reading '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error writing '{path}': {detail}")]
    Write { path: PathBuf, detail: String },

    // Parsing-related.
    #[error("invalid CSV in '{file}': {detail}")]
    InvalidCsv { file: String, detail: String },
    #[error("invalid numeric value: '{value}'")]
    InvalidNumeric { value: String },
    #[error("invalid settings file '{path}': {detail}")]
    InvalidSettings { path: PathBuf, detail: String },
    #[error("invalid users file '{path}': {detail}")]
    InvalidUsers { path: PathBuf, detail: String },

    // Authorization-related.
    #[error("user '{email}' not found")]
    UnknownUser { email: String },
    #[error("user '{email}' with role '{role}' cannot perform '{action}'")]
    NotAuthorized {
        email: String,
        role: String,
        action: String,
    },

    // Pipeline-related.
    #[error("no valid input rows after validation")]
    NoValidRows,
    #[error("report generation failed: {detail}")]
    Report { detail: String },
    #[error("notification target unreachable: {detail}")]
    NotificationUnavailable { detail: String },
    #[error("notification failed: {detail}")]
    NotificationFailed { detail: String },
}

impl PipelineError {
    /// Maps the error to the orchestrator's exit-code taxonomy.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::NoValidRows => EXIT_NO_VALID_ROWS,
            PipelineError::NotificationFailed { .. }
            | PipelineError::NotificationUnavailable { .. } => EXIT_EMAIL_FAILED,
            _ => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_taxonomy() {
        assert_eq!(PipelineError::NoValidRows.exit_code(), EXIT_NO_VALID_ROWS);
        assert_eq!(
            PipelineError::NotificationFailed {
                detail: "smtp down".into()
            }
            .exit_code(),
            EXIT_EMAIL_FAILED
        );
        assert_eq!(
            PipelineError::Report {
                detail: "disk full".into()
            }
            .exit_code(),
            EXIT_FAILURE
        );
    }
}
