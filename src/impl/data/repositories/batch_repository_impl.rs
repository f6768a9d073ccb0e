use std::path::Path;

use async_trait::async_trait;

use crate::{
    data::datasources::input_csv_datasource::{InputCsvDatasource, InputCsvDatasourceImpl},
    domain::{
        entities::{raw_table::InputBatch, reject::RejectRecord},
        repositories::batch_repository::BatchRepository,
    },
    errors::PipelineError,
};

pub(crate) struct BatchRepositoryImpl<DS = InputCsvDatasourceImpl>
where
    DS: InputCsvDatasource,
{
    input_datasource: DS,
}

impl BatchRepositoryImpl {
    pub(crate) fn new() -> Self {
        BatchRepositoryImpl {
            input_datasource: InputCsvDatasourceImpl::new(),
        }
    }
}

#[async_trait]
impl<DS> BatchRepository for BatchRepositoryImpl<DS>
where
    DS: InputCsvDatasource,
{
    async fn load_batch(
        &self,
        input_dir: &Path,
        input_extension: &str,
    ) -> Result<InputBatch, PipelineError> {
        let mut dir = tokio::fs::read_dir(input_dir)
            .await
            .map_err(|e| PipelineError::Read {
                path: input_dir.to_path_buf(),
                source: e,
            })?;

        let mut paths = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| PipelineError::Read {
            path: input_dir.to_path_buf(),
            source: e,
        })? {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            // Skip spreadsheet lock files ("~$...") and non-files.
            if !name.ends_with(input_extension) || name.starts_with("~$") {
                continue;
            }
            if !path.is_file() {
                continue;
            }
            paths.push(path);
        }
        // Filename-sorted for deterministic reject and dedup ordering.
        paths.sort();

        let reads = futures::future::join_all(
            paths.iter().map(|path| self.input_datasource.from_file(path)),
        )
        .await;

        let mut batch = InputBatch::default();
        for (path, result) in paths.iter().zip(reads) {
            match result {
                Ok(table) => batch.tables.push(table),
                Err(e) => {
                    let file = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    tracing::warn!(file = %file, error = %e, "skipping unreadable input file");
                    batch
                        .rejects
                        .push(RejectRecord::file_level(file, format!("read_error: {}", e)));
                }
            }
        }
        Ok(batch)
    }
}
