use super::reject::RejectRecord;

/// One input file as read from disk, before any validation. Cells are kept
/// as raw strings; header lookup happens in the validator.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub file_name: String,
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    /// Index of a column by (trimmed) header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name.trim())
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }
}

/// Result of loading one input directory: tables that could be read, plus
/// file-level rejects for the ones that could not.
#[derive(Debug, Default)]
pub struct InputBatch {
    pub tables: Vec<RawTable>,
    pub rejects: Vec<RejectRecord>,
}
