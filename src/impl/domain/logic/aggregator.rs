use std::collections::{BTreeMap, HashSet};

use crate::domain::entities::{
    summary::{BenchmarkReport, SummaryMetrics},
    validated_row::{CleanedDataset, ValidatedRow},
};

pub(crate) struct Aggregator<'a> {
    /// Status values counted into Total Earning; empty means all rows.
    completed_statuses: &'a [String],
}

impl<'a> Aggregator<'a> {
    pub(crate) fn new(completed_statuses: &'a [String]) -> Self {
        Self { completed_statuses }
    }

    /// Computes one `SummaryMetrics` per partition (overall, each category,
    /// each region). Partition keys come out sorted lexicographically via
    /// the BTreeMap, for stable report ordering.
    pub(crate) fn process(&self, dataset: &CleanedDataset) -> BenchmarkReport {
        let rows: Vec<&ValidatedRow> = dataset.rows.iter().collect();
        BenchmarkReport {
            overall: self.summarize(&rows),
            by_category: self.partition(&rows, |r| &r.category),
            by_region: self.partition(&rows, |r| &r.region),
        }
    }

    fn partition(
        &self,
        rows: &[&ValidatedRow],
        key: impl Fn(&ValidatedRow) -> &String,
    ) -> Vec<(String, SummaryMetrics)> {
        let mut groups: BTreeMap<String, Vec<&ValidatedRow>> = BTreeMap::new();
        for row in rows {
            groups.entry(key(row).clone()).or_default().push(row);
        }
        groups
            .into_iter()
            .map(|(name, group)| (name, self.summarize(&group)))
            .collect()
    }

    fn summarize(&self, rows: &[&ValidatedRow]) -> SummaryMetrics {
        let orders = order_count(rows);
        let total_quantity = rows.iter().map(|r| r.quantity).sum();
        let total_earning: f64 = rows
            .iter()
            .filter(|r| self.is_completed(&r.status))
            .map(|r| r.total_earning())
            .sum();
        let expenses: f64 = rows.iter().map(|r| r.expense).sum();
        let savings = total_earning - expenses;
        // Guarded divisions; a zero-earning or zero-order partition must
        // never fault.
        let savings_rate = if total_earning > 0.0 {
            savings / total_earning
        } else {
            0.0
        };
        let average_order_value = if orders > 0 {
            total_earning / orders as f64
        } else {
            0.0
        };
        SummaryMetrics {
            orders,
            total_quantity,
            total_earning,
            expenses,
            savings,
            savings_rate,
            average_order_value,
        }
    }

    fn is_completed(&self, status: &str) -> bool {
        self.completed_statuses.is_empty()
            || self.completed_statuses.iter().any(|s| s == status)
    }
}

/// Distinct identity keys when any row carries one, else plain row count.
fn order_count(rows: &[&ValidatedRow]) -> usize {
    let ids: HashSet<&str> = rows
        .iter()
        .filter_map(|r| r.order_id.as_deref())
        .collect();
    if ids.is_empty() {
        rows.len()
    } else {
        ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: &str, region: &str, qty: f64, price: f64, expense: f64, status: &str) -> ValidatedRow {
        ValidatedRow {
            order_id: None,
            quantity: qty,
            unit_price: price,
            status: status.to_owned(),
            category: category.to_owned(),
            region: region.to_owned(),
            expense,
        }
    }

    fn dataset(rows: Vec<ValidatedRow>) -> CleanedDataset {
        CleanedDataset {
            rows,
            duplicates_dropped: 0,
        }
    }

    #[test]
    fn savings_equal_earning_minus_expenses_per_partition() {
        let report = Aggregator::new(&[]).process(&dataset(vec![
            row("Widgets", "North", 2.0, 10.0, 6.0, "Completed"),
            row("Gadgets", "South", 1.0, 5.0, 1.5, "Completed"),
        ]));

        assert_eq!(report.overall.total_earning, 25.0);
        assert_eq!(report.overall.expenses, 7.5);
        assert_eq!(report.overall.savings, 17.5);
        for (_, metrics) in report.by_category.iter().chain(&report.by_region) {
            assert_eq!(metrics.savings, metrics.total_earning - metrics.expenses);
        }
    }

    #[test]
    fn zero_earning_partition_has_zero_savings_rate() {
        let report = Aggregator::new(&[]).process(&dataset(vec![row(
            "Widgets", "North", 0.0, 0.0, 3.0, "Completed",
        )]));
        assert_eq!(report.overall.total_earning, 0.0);
        assert_eq!(report.overall.savings_rate, 0.0);
        assert_eq!(report.overall.savings, -3.0);
    }

    #[test]
    fn empty_dataset_produces_empty_partitions_without_faulting() {
        let report = Aggregator::new(&[]).process(&dataset(vec![]));
        assert_eq!(report.overall.orders, 0);
        assert_eq!(report.overall.average_order_value, 0.0);
        assert!(report.by_category.is_empty());
        assert!(report.by_region.is_empty());
    }

    #[test]
    fn partitions_are_sorted_lexicographically() {
        let report = Aggregator::new(&[]).process(&dataset(vec![
            row("Widgets", "South", 1.0, 1.0, 0.0, "Completed"),
            row("Gadgets", "North", 1.0, 1.0, 0.0, "Completed"),
            row("Anvils", "East", 1.0, 1.0, 0.0, "Completed"),
        ]));
        let categories: Vec<&str> = report.by_category.iter().map(|(c, _)| c.as_str()).collect();
        let regions: Vec<&str> = report.by_region.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(categories, vec!["Anvils", "Gadgets", "Widgets"]);
        assert_eq!(regions, vec!["East", "North", "South"]);
    }

    #[test]
    fn completed_statuses_restrict_total_earning_only() {
        let statuses = vec!["Completed".to_owned()];
        let report = Aggregator::new(&statuses).process(&dataset(vec![
            row("Widgets", "North", 2.0, 10.0, 1.0, "Completed"),
            row("Widgets", "North", 3.0, 10.0, 1.0, "Cancelled"),
        ]));
        assert_eq!(report.overall.total_earning, 20.0);
        // Row count and expenses still cover every row.
        assert_eq!(report.overall.orders, 2);
        assert_eq!(report.overall.expenses, 2.0);
        assert_eq!(report.overall.total_quantity, 5.0);
    }

    #[test]
    fn orders_count_distinct_identity_keys_when_present() {
        let mut a = row("W", "N", 1.0, 10.0, 0.0, "Completed");
        let mut b = row("W", "N", 1.0, 10.0, 0.0, "Completed");
        let c = row("W", "N", 1.0, 10.0, 0.0, "Completed");
        a.order_id = Some("A1".to_owned());
        b.order_id = Some("A1".to_owned());
        let report = Aggregator::new(&[]).process(&dataset(vec![a, b, c]));
        assert_eq!(report.overall.orders, 1);
        assert_eq!(report.overall.average_order_value, 30.0);
    }
}
