use std::str::FromStr as _;

use crate::{
    data::models::numeric_field_model::NumericFieldModel,
    domain::entities::{
        raw_table::{InputBatch, RawTable},
        reject::RejectRecord,
        settings::ColumnsSettings,
        validated_row::ValidatedRow,
    },
};

/// Outcome of validating one input batch. For accepted files,
/// `rows.len() + row rejects == data_rows` — no row is lost or
/// double-counted.
#[derive(Debug, Default)]
pub(crate) struct ValidationOutcome {
    pub rows: Vec<ValidatedRow>,
    pub rejects: Vec<RejectRecord>,
    /// Total data rows across files that passed the column check.
    pub data_rows: usize,
    pub files_accepted: usize,
}

pub(crate) struct Validator<'a> {
    columns: &'a ColumnsSettings,
}

struct ColumnIndexes {
    quantity: usize,
    unit_price: usize,
    status: usize,
    category: usize,
    region: usize,
    expense: Option<usize>,
    order_id: Option<usize>,
}

impl<'a> Validator<'a> {
    pub(crate) fn new(columns: &'a ColumnsSettings) -> Self {
        Self { columns }
    }

    /// Checks every file and row. No file or row halts the batch; rejects
    /// accumulate and processing continues with whatever remains.
    pub(crate) fn process(&self, batch: InputBatch) -> ValidationOutcome {
        let mut outcome = ValidationOutcome {
            rejects: batch.rejects,
            ..Default::default()
        };

        for table in &batch.tables {
            let indexes = match self.resolve_columns(table) {
                Ok(indexes) => indexes,
                Err(missing) => {
                    outcome.rejects.push(RejectRecord::file_level(
                        &table.file_name,
                        format!("missing_columns: {}", missing.join(", ")),
                    ));
                    continue;
                }
            };
            outcome.files_accepted += 1;
            outcome.data_rows += table.row_count();
            for (i, record) in table.records.iter().enumerate() {
                // 1-based data row, matching what users see under the header.
                let row_number = i + 1;
                match self.validate_row(&indexes, record) {
                    Ok(row) => outcome.rows.push(row),
                    Err(reason) => outcome.rejects.push(RejectRecord::row_level(
                        &table.file_name,
                        row_number,
                        reason,
                    )),
                }
            }
        }
        outcome
    }

    fn resolve_columns(&self, table: &RawTable) -> Result<ColumnIndexes, Vec<String>> {
        let required = [
            &self.columns.quantity,
            &self.columns.unit_price,
            &self.columns.status,
            &self.columns.category,
            &self.columns.region,
        ];
        let missing: Vec<String> = required
            .iter()
            .filter(|name| table.column_index(name).is_none())
            .map(|name| (*name).clone())
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }
        let index = |name: &str| table.column_index(name);
        Ok(ColumnIndexes {
            // Required indexes were just checked.
            quantity: index(&self.columns.quantity).unwrap_or(0),
            unit_price: index(&self.columns.unit_price).unwrap_or(0),
            status: index(&self.columns.status).unwrap_or(0),
            category: index(&self.columns.category).unwrap_or(0),
            region: index(&self.columns.region).unwrap_or(0),
            expense: self.columns.expense.as_deref().and_then(index),
            order_id: self.columns.order_id.as_deref().and_then(index),
        })
    }

    fn validate_row(
        &self,
        indexes: &ColumnIndexes,
        record: &[String],
    ) -> Result<ValidatedRow, String> {
        let cell = |i: usize| record.get(i).map(String::as_str).unwrap_or("").trim();

        let quantity = parse_non_negative(cell(indexes.quantity), &self.columns.quantity)?;
        let unit_price = parse_non_negative(cell(indexes.unit_price), &self.columns.unit_price)?;
        let status = required_text(cell(indexes.status), &self.columns.status)?;
        let category = required_text(cell(indexes.category), &self.columns.category)?;
        let region = required_text(cell(indexes.region), &self.columns.region)?;

        let expense = match indexes.expense.map(cell) {
            None | Some("") => 0.0,
            Some(raw) => parse_non_negative(raw, self.columns.expense.as_deref().unwrap_or(""))?,
        };
        let order_id = indexes
            .order_id
            .map(cell)
            .filter(|v| !v.is_empty())
            .map(str::to_owned);

        Ok(ValidatedRow {
            order_id,
            quantity,
            unit_price,
            status,
            category,
            region,
            expense,
        })
    }
}

fn parse_non_negative(raw: &str, column: &str) -> Result<f64, String> {
    let value: f64 = NumericFieldModel::from_str(raw)
        .map_err(|_| format!("non-numeric {}: '{}'", column, raw))?
        .into();
    if value < 0.0 {
        return Err(format!("negative {}: {}", column, value));
    }
    Ok(value)
}

fn required_text(raw: &str, column: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Err(format!("empty {}", column));
    }
    Ok(raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ColumnsSettings {
        ColumnsSettings {
            quantity: "Quantity".into(),
            unit_price: "UnitPrice".into(),
            status: "Status".into(),
            category: "Category".into(),
            region: "Region".into(),
            expense: Some("Expense".into()),
            order_id: Some("OrderID".into()),
        }
    }

    fn table(headers: &[&str], records: &[&[&str]]) -> RawTable {
        RawTable {
            file_name: "sales.csv".into(),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            records: records
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn batch(tables: Vec<RawTable>) -> InputBatch {
        InputBatch {
            tables,
            rejects: Vec::new(),
        }
    }

    #[test]
    fn splits_valid_rows_from_rejects_with_reasons() {
        let headers = ["Quantity", "UnitPrice", "Status", "Category", "Region"];
        let records: Vec<&[&str]> = vec![
            &["2", "10", "Completed", "Widgets", "North"],
            &["1", "-5", "Completed", "Widgets", "North"],
            &["3", "-1", "Pending", "Gadgets", "South"],
            &["x", "4", "Completed", "", "South"],
            &["1", "4", "Completed", "", "South"],
            &["1", "4", "Completed", "Gadgets", "South"],
            &["2", "6", "Shipped", "Widgets", "East"],
            &["2", "6", "Shipped", "Widgets", "West"],
            &["5", "2", "Completed", "Gadgets", "East"],
            &["1", "1", "Completed", "Widgets", "South"],
        ];
        let columns = columns();
        let outcome =
            Validator::new(&columns).process(batch(vec![table(&headers, &records)]));

        // 10 rows in, 2 negative UnitPrice, 1 non-numeric Quantity
        // (masking its empty Category), 1 empty Category.
        assert_eq!(outcome.data_rows, 10);
        assert_eq!(outcome.rows.len(), 6);
        assert_eq!(outcome.rejects.len(), 4);
        assert_eq!(outcome.rows.len() + outcome.rejects.len(), outcome.data_rows);
        assert_eq!(outcome.rejects[0].reason, "negative UnitPrice: -5");
        assert_eq!(outcome.rejects[1].reason, "negative UnitPrice: -1");
        assert_eq!(outcome.rejects[2].reason, "non-numeric Quantity: 'x'");
        assert_eq!(outcome.rejects[3].reason, "empty Category");
        assert_eq!(outcome.rejects[3].row, Some(5));
    }

    #[test]
    fn file_missing_required_columns_is_rejected_whole() {
        let bad = table(&["Quantity", "Status"], &[&["1", "Completed"]]);
        let good = table(
            &["Quantity", "UnitPrice", "Status", "Category", "Region"],
            &[&["1", "2", "Completed", "W", "N"]],
        );
        let columns = columns();
        let outcome = Validator::new(&columns).process(batch(vec![bad, good]));

        assert_eq!(outcome.files_accepted, 1);
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rejects.len(), 1);
        assert_eq!(outcome.rejects[0].row, None);
        assert_eq!(
            outcome.rejects[0].reason,
            "missing_columns: UnitPrice, Category, Region"
        );
        // File-level rejects do not count into data_rows.
        assert_eq!(outcome.data_rows, 1);
    }

    #[test]
    fn expense_defaults_to_zero_when_blank_or_column_absent() {
        let with_expense = table(
            &["Quantity", "UnitPrice", "Status", "Category", "Region", "Expense"],
            &[
                &["2", "10", "Completed", "W", "N", "3.5"],
                &["2", "10", "Completed", "W", "N", ""],
                &["2", "10", "Completed", "W", "N", "oops"],
            ],
        );
        let without_expense = table(
            &["Quantity", "UnitPrice", "Status", "Category", "Region"],
            &[&["1", "5", "Completed", "W", "N"]],
        );
        let columns = columns();
        let outcome =
            Validator::new(&columns).process(batch(vec![with_expense, without_expense]));

        assert_eq!(outcome.rows.len(), 3);
        assert_eq!(outcome.rows[0].expense, 3.5);
        assert_eq!(outcome.rows[1].expense, 0.0);
        assert_eq!(outcome.rows[2].expense, 0.0);
        assert_eq!(outcome.rejects.len(), 1);
        assert_eq!(outcome.rejects[0].reason, "non-numeric Expense: 'oops'");
    }

    #[test]
    fn blank_order_id_becomes_none() {
        let t = table(
            &["OrderID", "Quantity", "UnitPrice", "Status", "Category", "Region"],
            &[
                &["A1", "1", "2", "Completed", "W", "N"],
                &["  ", "1", "2", "Completed", "W", "N"],
            ],
        );
        let columns = columns();
        let outcome = Validator::new(&columns).process(batch(vec![t]));
        assert_eq!(outcome.rows[0].order_id.as_deref(), Some("A1"));
        assert_eq!(outcome.rows[1].order_id, None);
    }
}
