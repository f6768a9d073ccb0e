use std::collections::HashSet;

use crate::domain::entities::validated_row::{CleanedDataset, ValidatedRow};

/// Identity used to detect duplicate rows across repeated runs. Identity
/// and full-row keys live in separate spaces, so a row with a real order id
/// never collides with one that fell back to full-row identity.
#[derive(Debug, PartialEq, Eq, Hash)]
enum DedupKey {
    Identity(String),
    FullRow(String),
}

pub(crate) struct Cleaner;

impl Cleaner {
    pub(crate) fn new() -> Self {
        Self
    }

    /// Merges rows from a previous run's cleaned output (first) with the
    /// current batch, normalizes them, and keeps the first occurrence per
    /// dedup key in encounter order. Dropped duplicates are a re-run safety
    /// mechanism, not data-quality rejects.
    pub(crate) fn process(
        &self,
        previous_rows: Vec<ValidatedRow>,
        new_rows: Vec<ValidatedRow>,
    ) -> CleanedDataset {
        let mut seen: HashSet<DedupKey> = HashSet::new();
        let mut dataset = CleanedDataset::default();
        for row in previous_rows.into_iter().chain(new_rows) {
            let row = normalize(row);
            if seen.insert(dedup_key(&row)) {
                dataset.rows.push(row);
            } else {
                dataset.duplicates_dropped += 1;
            }
        }
        dataset
    }
}

fn normalize(mut row: ValidatedRow) -> ValidatedRow {
    row.status = row.status.trim().to_owned();
    row.category = row.category.trim().to_owned();
    row.region = row.region.trim().to_owned();
    row.order_id = row
        .order_id
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty());
    row
}

fn dedup_key(row: &ValidatedRow) -> DedupKey {
    match &row.order_id {
        Some(id) => DedupKey::Identity(id.clone()),
        // Float bits keep the key exact without relying on formatting.
        None => DedupKey::FullRow(format!(
            "{:x}\u{1f}{:x}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{:x}",
            row.quantity.to_bits(),
            row.unit_price.to_bits(),
            row.status,
            row.category,
            row.region,
            row.expense.to_bits(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(order_id: Option<&str>, quantity: f64, status: &str) -> ValidatedRow {
        ValidatedRow {
            order_id: order_id.map(str::to_owned),
            quantity,
            unit_price: 10.0,
            status: status.to_owned(),
            category: "Widgets".to_owned(),
            region: "North".to_owned(),
            expense: 0.0,
        }
    }

    #[test]
    fn first_occurrence_wins_per_order_id() {
        let dataset = Cleaner::new().process(
            vec![],
            vec![
                row(Some("A1"), 1.0, "Completed"),
                row(Some("A1"), 99.0, "Pending"),
                row(Some("A2"), 2.0, "Completed"),
            ],
        );
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.duplicates_dropped, 1);
        assert_eq!(dataset.rows[0].quantity, 1.0);
    }

    #[test]
    fn rows_without_order_id_never_collide_with_keyed_rows() {
        // Identical fields, but only one carries a true identity key.
        let keyed = row(Some("A1"), 1.0, "Completed");
        let unkeyed = row(None, 1.0, "Completed");
        let dataset = Cleaner::new().process(vec![], vec![keyed, unkeyed]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.duplicates_dropped, 0);
    }

    #[test]
    fn full_row_fallback_drops_exact_duplicates() {
        let dataset = Cleaner::new().process(
            vec![],
            vec![row(None, 1.0, "Completed"), row(None, 1.0, "Completed")],
        );
        assert_eq!(dataset.row_count(), 1);
        assert_eq!(dataset.duplicates_dropped, 1);
    }

    #[test]
    fn previous_run_rows_take_precedence() {
        let dataset = Cleaner::new().process(
            vec![row(Some("A1"), 5.0, "Completed")],
            vec![row(Some("A1"), 1.0, "Pending")],
        );
        assert_eq!(dataset.row_count(), 1);
        assert_eq!(dataset.rows[0].quantity, 5.0);
    }

    #[test]
    fn rerunning_the_same_batch_is_idempotent() {
        let batch = vec![
            row(Some("A1"), 1.0, "Completed"),
            row(None, 2.0, "Pending"),
        ];
        let first = Cleaner::new().process(vec![], batch.clone());
        let second = Cleaner::new().process(first.rows.clone(), batch);
        assert_eq!(first.row_count(), second.row_count());
        assert_eq!(first.rows, second.rows);
    }

    #[test]
    fn whitespace_is_normalized_before_keying() {
        let mut padded = row(None, 1.0, " Completed ");
        padded.category = " Widgets ".to_owned();
        let dataset = Cleaner::new().process(vec![padded], vec![row(None, 1.0, "Completed")]);
        assert_eq!(dataset.row_count(), 1);
    }
}
