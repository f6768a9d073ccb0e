use std::path::Path;

use async_trait::async_trait;

use crate::{domain::entities::raw_table::InputBatch, errors::PipelineError};

#[async_trait]
pub(crate) trait BatchRepository: Send + Sync {
    /// Loads every matching input file under `input_dir`. Unreadable files
    /// become file-level rejects; only a missing/unreadable directory is a
    /// hard error.
    async fn load_batch(
        &self,
        input_dir: &Path,
        input_extension: &str,
    ) -> Result<InputBatch, PipelineError>;
}
