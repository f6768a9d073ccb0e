use std::{path::Path, str::FromStr as _};

use crate::{
    data::datasources::input_csv_datasource::READ_TIMEOUT,
    data::models::numeric_field_model::NumericFieldModel,
    domain::entities::validated_row::ValidatedRow, errors::PipelineError,
};

/// Reads a previously written cleaned-dataset file back into rows, so a
/// re-run can deduplicate against earlier output. Derived columns
/// (TotalRevenue, Savings) are recomputed, not read.
pub(crate) struct CleanedCsvDatasource;

impl CleanedCsvDatasource {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn from_string(&self, s: &str) -> Result<Vec<ValidatedRow>, PipelineError> {
        let mut reader = csv::Reader::from_reader(s.as_bytes());
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| invalid(&e))?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();
        let index = |name: &str| headers.iter().position(|h| h == name);
        let (qty, price, status, category, region) = match (
            index("Quantity"),
            index("UnitPrice"),
            index("Status"),
            index("Category"),
            index("Region"),
        ) {
            (Some(q), Some(p), Some(s), Some(c), Some(r)) => (q, p, s, c, r),
            _ => {
                return Err(PipelineError::InvalidCsv {
                    file: "cleaned dataset".to_owned(),
                    detail: "missing expected columns".to_owned(),
                })
            }
        };
        let order_id = index("OrderID");
        let expense = index("Expense");

        reader
            .records()
            .map(|r| {
                let record = r.map_err(|e| invalid(&e))?;
                let cell = |i: usize| record.get(i).unwrap_or("").trim().to_owned();
                Ok(ValidatedRow {
                    order_id: order_id.map(cell).filter(|v| !v.is_empty()),
                    quantity: NumericFieldModel::from_str(&cell(qty))?.into(),
                    unit_price: NumericFieldModel::from_str(&cell(price))?.into(),
                    status: cell(status),
                    category: cell(category),
                    region: cell(region),
                    expense: expense
                        .map(cell)
                        .filter(|v| !v.is_empty())
                        .map(|v| NumericFieldModel::from_str(&v).map(f64::from))
                        .transpose()?
                        .unwrap_or(0.0),
                })
            })
            .collect()
    }

    pub(crate) async fn from_file(&self, path: &Path) -> Result<Vec<ValidatedRow>, PipelineError> {
        let read = tokio::fs::read_to_string(path);
        let contents = tokio::time::timeout(READ_TIMEOUT, read)
            .await
            .map_err(|_| PipelineError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out"),
            })?
            .map_err(|e| PipelineError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
        self.from_string(&contents)
    }
}

fn invalid(e: &csv::Error) -> PipelineError {
    PipelineError::InvalidCsv {
        file: "cleaned dataset".to_owned(),
        detail: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_rows_written_by_the_flat_writer() {
        let csv = "OrderID,Quantity,UnitPrice,Status,Category,Region,Expense,TotalRevenue,Savings\n\
                   A1,2,10,Completed,Widgets,North,3,20,17\n\
                   ,1,5,Pending,Gadgets,South,,5,5\n";
        let rows = CleanedCsvDatasource::new().from_string(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].order_id.as_deref(), Some("A1"));
        assert_eq!(rows[0].expense, 3.0);
        assert_eq!(rows[1].order_id, None);
        assert_eq!(rows[1].expense, 0.0);
    }

    #[test]
    fn rejects_files_without_expected_columns() {
        assert!(CleanedCsvDatasource::new()
            .from_string("A,B\n1,2\n")
            .is_err());
    }
}
