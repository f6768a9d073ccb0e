use std::{path::Path, time::Duration};

use async_trait::async_trait;

use crate::{domain::entities::raw_table::RawTable, errors::PipelineError};

/// Upper bound per input-file read; a stalled mount must not hang the run.
pub(crate) const READ_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub(crate) trait InputCsvDatasource: Send + Sync {
    fn from_string(&self, file_name: &str, s: &str) -> Result<RawTable, PipelineError>;

    async fn from_file(&self, path: &Path) -> Result<RawTable, PipelineError>;
}

pub(crate) struct InputCsvDatasourceImpl;

impl InputCsvDatasourceImpl {
    pub(crate) fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InputCsvDatasource for InputCsvDatasourceImpl {
    fn from_string(&self, file_name: &str, s: &str) -> Result<RawTable, PipelineError> {
        let mut reader = csv::ReaderBuilder::new()
            // Short rows are handled as blank cells during validation.
            .flexible(true)
            .from_reader(s.as_bytes());
        let headers = reader
            .headers()
            .map_err(|e| PipelineError::InvalidCsv {
                file: file_name.to_owned(),
                detail: e.to_string(),
            })?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();
        let records = reader
            .records()
            .map(|r| {
                r.map(|record| record.iter().map(str::to_owned).collect())
                    .map_err(|e| PipelineError::InvalidCsv {
                        file: file_name.to_owned(),
                        detail: e.to_string(),
                    })
            })
            .collect::<Result<Vec<Vec<String>>, _>>()?;
        Ok(RawTable {
            file_name: file_name.to_owned(),
            headers,
            records,
        })
    }

    async fn from_file(&self, path: &Path) -> Result<RawTable, PipelineError> {
        let contents = tokio::time::timeout(READ_TIMEOUT, tokio::fs::read_to_string(path))
            .await
            .map_err(|_| PipelineError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out"),
            })?
            .map_err(|e| PipelineError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.from_string(&file_name, &contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_records() {
        let table = InputCsvDatasourceImpl::new()
            .from_string(
                "sales.csv",
                "Quantity,UnitPrice,Status\n2,10.5,Completed\n1,3,Pending\n",
            )
            .unwrap();
        assert_eq!(table.headers, vec!["Quantity", "UnitPrice", "Status"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_index("UnitPrice"), Some(1));
        assert_eq!(table.column_index("Missing"), None);
    }

    #[test]
    fn tolerates_short_rows() {
        let table = InputCsvDatasourceImpl::new()
            .from_string("sales.csv", "A,B,C\n1,2\n")
            .unwrap();
        assert_eq!(table.records[0], vec!["1", "2"]);
    }
}
