/// A row or file excluded from the cleaned dataset, always paired with the
/// reason. Immutable once created; accumulated into the diagnostics set.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectRecord {
    pub file: String,
    /// 1-based data row within the file; `None` for file-level rejects.
    pub row: Option<usize>,
    pub reason: String,
}

impl RejectRecord {
    pub fn file_level(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            row: None,
            reason: reason.into(),
        }
    }

    pub fn row_level(file: impl Into<String>, row: usize, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            row: Some(row),
            reason: reason.into(),
        }
    }

    /// Diagnostics-file rendering of the issue column.
    pub fn issue(&self) -> String {
        match self.row {
            Some(row) => format!("row {}: {}", row, self.reason),
            None => self.reason.clone(),
        }
    }
}
