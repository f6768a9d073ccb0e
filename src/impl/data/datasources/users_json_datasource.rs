use std::path::Path;

use crate::{domain::entities::user::User, errors::PipelineError};

/// Loads the users/admins list used for notification routing and the
/// run-pipeline authorization check.
pub(crate) struct UsersJsonDatasource;

impl UsersJsonDatasource {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn from_string(&self, path: &Path, s: &str) -> Result<Vec<User>, PipelineError> {
        let s = s.strip_prefix('\u{feff}').unwrap_or(s);
        serde_json::from_str(s).map_err(|e| PipelineError::InvalidUsers {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    pub(crate) async fn from_file(&self, path: &Path) -> Result<Vec<User>, PipelineError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PipelineError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
        self.from_string(path, &contents)
    }
}
