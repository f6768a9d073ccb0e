/// One input row after type coercion and rule checks. All required fields
/// are present, numeric fields are non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    pub order_id: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    pub status: String,
    pub category: String,
    pub region: String,
    /// Defaults to 0 when the column is absent or the cell is blank.
    pub expense: f64,
}

impl ValidatedRow {
    pub fn total_earning(&self) -> f64 {
        self.quantity * self.unit_price
    }

    pub fn savings(&self) -> f64 {
        self.total_earning() - self.expense
    }
}

/// Deduplicated set of validated rows. Uniqueness key is the configured
/// identity column when present and non-blank; otherwise full-row identity.
///
/// The full-row fallback is a pragmatic re-run safety mechanism, not a true
/// record identity: two genuinely distinct orders with identical field
/// values collapse into one row. Configure an identity column to avoid this.
#[derive(Debug, Clone, Default)]
pub struct CleanedDataset {
    pub rows: Vec<ValidatedRow>,
    /// Duplicates dropped while building the set (not data-quality rejects).
    pub duplicates_dropped: usize,
}

impl CleanedDataset {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
