/// Derived aggregates for one partition (overall, one category, or one
/// region). Recomputed each run; no cross-run state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryMetrics {
    pub orders: usize,
    pub total_quantity: f64,
    pub total_earning: f64,
    pub expenses: f64,
    pub savings: f64,
    /// Savings / Total Earning, or 0 when Total Earning is 0.
    pub savings_rate: f64,
    pub average_order_value: f64,
}

/// All summaries for one run. Partition keys are sorted lexicographically
/// for stable report ordering.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkReport {
    pub overall: SummaryMetrics,
    pub by_category: Vec<(String, SummaryMetrics)>,
    pub by_region: Vec<(String, SummaryMetrics)>,
}
