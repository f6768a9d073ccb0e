use std::path::{Path, PathBuf};

use crate::{
    domain::entities::{
        reject::RejectRecord,
        summary::{BenchmarkReport, SummaryMetrics},
        validated_row::CleanedDataset,
    },
    errors::PipelineError,
};

/// Writes the flat artifacts (cleaned dataset, reject diagnostics,
/// benchmark summary) so downstream tooling can consume them without
/// opening the workbook. Each file is written to a temporary path and
/// renamed into place, so a failure never leaves a partial canonical file.
pub(crate) struct FlatWriter;

impl FlatWriter {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn write_cleaned(
        &self,
        path: &Path,
        dataset: &CleanedDataset,
    ) -> Result<(), PipelineError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_record(
            &mut writer,
            path,
            &[
                "OrderID",
                "Quantity",
                "UnitPrice",
                "Status",
                "Category",
                "Region",
                "Expense",
                "TotalRevenue",
                "Savings",
            ],
        )?;
        for row in &dataset.rows {
            let record = [
                row.order_id.clone().unwrap_or_default(),
                fmt_num(row.quantity),
                fmt_num(row.unit_price),
                row.status.clone(),
                row.category.clone(),
                row.region.clone(),
                fmt_num(row.expense),
                fmt_num(row.total_earning()),
                fmt_num(row.savings()),
            ];
            write_record(&mut writer, path, &record)?;
        }
        commit(writer, path)
    }

    /// Diagnostics columns: File, Issue.
    pub(crate) fn write_diagnostics(
        &self,
        path: &Path,
        rejects: &[RejectRecord],
    ) -> Result<(), PipelineError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_record(&mut writer, path, &["File", "Issue"])?;
        for reject in rejects {
            write_record(&mut writer, path, &[reject.file.clone(), reject.issue()])?;
        }
        commit(writer, path)
    }

    pub(crate) fn write_benchmark(
        &self,
        path: &Path,
        report: &BenchmarkReport,
    ) -> Result<(), PipelineError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_record(&mut writer, path, &["Scope", "Partition", "Metric", "Value"])?;
        write_metrics(&mut writer, path, "overall", "", &report.overall)?;
        for (category, metrics) in &report.by_category {
            write_metrics(&mut writer, path, "category", category, metrics)?;
        }
        for (region, metrics) in &report.by_region {
            write_metrics(&mut writer, path, "region", region, metrics)?;
        }
        commit(writer, path)
    }
}

fn write_metrics(
    writer: &mut csv::Writer<Vec<u8>>,
    path: &Path,
    scope: &str,
    partition: &str,
    metrics: &SummaryMetrics,
) -> Result<(), PipelineError> {
    let rows: [(&str, String); 7] = [
        ("TotalOrders", metrics.orders.to_string()),
        ("TotalQuantity", fmt_num(metrics.total_quantity)),
        ("TotalEarning", fmt_num(metrics.total_earning)),
        ("Expenses", fmt_num(metrics.expenses)),
        ("Savings", fmt_num(metrics.savings)),
        ("SavingsRate", fmt_num(metrics.savings_rate)),
        ("AverageOrderValue", fmt_num(metrics.average_order_value)),
    ];
    for (metric, value) in rows {
        write_record(
            writer,
            path,
            &[scope.to_owned(), partition.to_owned(), metric.to_owned(), value],
        )?;
    }
    Ok(())
}

fn write_record<T: AsRef<[u8]>>(
    writer: &mut csv::Writer<Vec<u8>>,
    path: &Path,
    record: &[T],
) -> Result<(), PipelineError> {
    writer.write_record(record).map_err(|e| PipelineError::Write {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Flushes the buffered CSV and atomically replaces the canonical file.
fn commit(writer: csv::Writer<Vec<u8>>, path: &Path) -> Result<(), PipelineError> {
    let buffer = writer
        .into_inner()
        .map_err(|e| PipelineError::Write {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, buffer).map_err(|e| PipelineError::Write {
        path: tmp.clone(),
        detail: e.to_string(),
    })?;
    std::fs::rename(&tmp, path).map_err(|e| {
        // Leave nothing misleading behind.
        let _ = std::fs::remove_file(&tmp);
        PipelineError::Write {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }
    })
}

pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_owned());
    name.push_str(".tmp");
    path.with_file_name(name)
}

/// Trims the float to a plain decimal representation (no exponent for the
/// magnitudes this pipeline sees, integers without a trailing ".0").
fn fmt_num(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
