use std::path::Path;

use rust_xlsxwriter::{Chart, ChartType, Format, Workbook, XlsxError};

use crate::{
    domain::entities::{
        reject::RejectRecord,
        summary::{BenchmarkReport, SummaryMetrics},
        validated_row::CleanedDataset,
    },
    errors::PipelineError,
    presentation::flat_writer::temp_path,
};

const SHEET_CLEANED: &str = "Cleaned_Data";
const SHEET_OVERALL: &str = "Benchmark_Overall";
const SHEET_CATEGORY: &str = "Benchmark_Category";
const SHEET_REGION: &str = "Benchmark_Region";
const SHEET_METRICS: &str = "Benchmark_Metrics";
const SHEET_DASHBOARD: &str = "Executive_Dashboard";
const SHEET_DATA_QUALITY: &str = "Data_Quality";

/// Renders the full multi-sheet report workbook: cleaned data, benchmark
/// sheets, a metric/value sheet, an executive dashboard with KPI cards and
/// charts, and (only when rejects exist) a data-quality sheet. The file is
/// written to a temporary path and renamed on success.
pub(crate) struct WorkbookWriter {
    money: Format,
    percent: Format,
    integer: Format,
    header: Format,
    title: Format,
    kpi_label: Format,
}

impl WorkbookWriter {
    pub(crate) fn new() -> Self {
        Self {
            money: Format::new().set_num_format("$#,##0.00"),
            percent: Format::new().set_num_format("0.00%"),
            integer: Format::new().set_num_format("#,##0"),
            header: Format::new().set_bold(),
            title: Format::new().set_bold().set_font_size(14),
            kpi_label: Format::new().set_bold().set_font_size(11),
        }
    }

    pub(crate) fn write(
        &self,
        path: &Path,
        dataset: &CleanedDataset,
        report: &BenchmarkReport,
        rejects: &[RejectRecord],
    ) -> Result<(), PipelineError> {
        let mut workbook = self
            .build(dataset, report, rejects)
            .map_err(|e| PipelineError::Report {
                detail: e.to_string(),
            })?;
        let tmp = temp_path(path);
        workbook.save(&tmp).map_err(|e| PipelineError::Write {
            path: tmp.clone(),
            detail: e.to_string(),
        })?;
        std::fs::rename(&tmp, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            PipelineError::Write {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }
        })
    }

    fn build(
        &self,
        dataset: &CleanedDataset,
        report: &BenchmarkReport,
        rejects: &[RejectRecord],
    ) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        self.cleaned_sheet(&mut workbook, dataset)?;
        self.overall_sheet(&mut workbook, &report.overall)?;
        self.category_sheet(&mut workbook, report)?;
        self.region_sheet(&mut workbook, report)?;
        self.metrics_sheet(&mut workbook, &report.overall)?;
        self.dashboard_sheet(&mut workbook, report)?;
        if !rejects.is_empty() {
            self.data_quality_sheet(&mut workbook, rejects)?;
        }
        Ok(workbook)
    }

    fn cleaned_sheet(
        &self,
        workbook: &mut Workbook,
        dataset: &CleanedDataset,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_CLEANED)?;
        let headers = [
            "OrderID",
            "Quantity",
            "UnitPrice",
            "Status",
            "Category",
            "Region",
            "Expense",
            "TotalRevenue",
            "Savings",
        ];
        for (c, name) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, c as u16, *name, &self.header)?;
        }
        for (i, row) in dataset.rows.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_string(r, 0, row.order_id.as_deref().unwrap_or(""))?;
            sheet.write_number(r, 1, row.quantity)?;
            sheet.write_number_with_format(r, 2, row.unit_price, &self.money)?;
            sheet.write_string(r, 3, &row.status)?;
            sheet.write_string(r, 4, &row.category)?;
            sheet.write_string(r, 5, &row.region)?;
            sheet.write_number_with_format(r, 6, row.expense, &self.money)?;
            sheet.write_number_with_format(r, 7, row.total_earning(), &self.money)?;
            sheet.write_number_with_format(r, 8, row.savings(), &self.money)?;
        }
        sheet.set_column_width(0, 14)?;
        sheet.set_column_width(3, 12)?;
        sheet.set_column_width(4, 14)?;
        sheet.set_column_width(5, 12)?;
        Ok(())
    }

    fn overall_sheet(
        &self,
        workbook: &mut Workbook,
        overall: &SummaryMetrics,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_OVERALL)?;
        let headers = [
            "TotalOrders",
            "TotalEarning",
            "Expenses",
            "Savings",
            "SavingsRate",
            "AverageOrderValue",
        ];
        for (c, name) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, c as u16, *name, &self.header)?;
        }
        sheet.write_number_with_format(1, 0, overall.orders as f64, &self.integer)?;
        sheet.write_number_with_format(1, 1, overall.total_earning, &self.money)?;
        sheet.write_number_with_format(1, 2, overall.expenses, &self.money)?;
        sheet.write_number_with_format(1, 3, overall.savings, &self.money)?;
        sheet.write_number_with_format(1, 4, overall.savings_rate, &self.percent)?;
        sheet.write_number_with_format(1, 5, overall.average_order_value, &self.money)?;
        Ok(())
    }

    fn category_sheet(
        &self,
        workbook: &mut Workbook,
        report: &BenchmarkReport,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_CATEGORY)?;
        let headers = [
            "Category",
            "TotalEarning",
            "Expenses",
            "Savings",
            "SavingsRate",
            "TotalQuantity",
        ];
        for (c, name) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, c as u16, *name, &self.header)?;
        }
        for (i, (category, m)) in report.by_category.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_string(r, 0, category)?;
            sheet.write_number_with_format(r, 1, m.total_earning, &self.money)?;
            sheet.write_number_with_format(r, 2, m.expenses, &self.money)?;
            sheet.write_number_with_format(r, 3, m.savings, &self.money)?;
            sheet.write_number_with_format(r, 4, m.savings_rate, &self.percent)?;
            sheet.write_number_with_format(r, 5, m.total_quantity, &self.integer)?;
        }
        sheet.set_column_width(0, 16)?;
        Ok(())
    }

    fn region_sheet(
        &self,
        workbook: &mut Workbook,
        report: &BenchmarkReport,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_REGION)?;
        let headers = [
            "Region",
            "TotalOrders",
            "TotalEarning",
            "Expenses",
            "Savings",
            "SavingsRate",
        ];
        for (c, name) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, c as u16, *name, &self.header)?;
        }
        for (i, (region, m)) in report.by_region.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_string(r, 0, region)?;
            sheet.write_number_with_format(r, 1, m.orders as f64, &self.integer)?;
            sheet.write_number_with_format(r, 2, m.total_earning, &self.money)?;
            sheet.write_number_with_format(r, 3, m.expenses, &self.money)?;
            sheet.write_number_with_format(r, 4, m.savings, &self.money)?;
            sheet.write_number_with_format(r, 5, m.savings_rate, &self.percent)?;
        }
        sheet.set_column_width(0, 16)?;
        Ok(())
    }

    fn metrics_sheet(
        &self,
        workbook: &mut Workbook,
        overall: &SummaryMetrics,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_METRICS)?;
        sheet.write_string_with_format(0, 0, "Metric", &self.header)?;
        sheet.write_string_with_format(0, 1, "Value", &self.header)?;
        let rows: [(&str, f64, &Format); 6] = [
            ("TotalOrders", overall.orders as f64, &self.integer),
            ("TotalEarning", overall.total_earning, &self.money),
            ("Expenses", overall.expenses, &self.money),
            ("Savings", overall.savings, &self.money),
            ("SavingsRate", overall.savings_rate, &self.percent),
            (
                "AverageOrderValue",
                overall.average_order_value,
                &self.money,
            ),
        ];
        for (i, (metric, value, format)) in rows.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_string(r, 0, *metric)?;
            sheet.write_number_with_format(r, 1, *value, format)?;
        }
        sheet.set_column_width(0, 20)?;
        sheet.set_column_width(1, 14)?;
        Ok(())
    }

    /// KPI cards plus three charts, all derived purely from the summary
    /// sheets so the dashboard stays consistent with the numbers.
    fn dashboard_sheet(
        &self,
        workbook: &mut Workbook,
        report: &BenchmarkReport,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_DASHBOARD)?;
        sheet.write_string_with_format(0, 1, "Executive Financial Dashboard", &self.title)?;

        let overall = &report.overall;
        let cards: [(&str, f64, &Format); 4] = [
            ("Total Earning", overall.total_earning, &self.money),
            ("Savings", overall.savings, &self.money),
            ("Savings Rate", overall.savings_rate, &self.percent),
            ("Total Orders", overall.orders as f64, &self.integer),
        ];
        for (i, (label, value, format)) in cards.iter().enumerate() {
            let c = (1 + i * 2) as u16;
            sheet.write_string_with_format(2, c, *label, &self.kpi_label)?;
            sheet.write_number_with_format(3, c, *value, format)?;
            sheet.set_column_width(c, 16)?;
        }

        if !report.by_category.is_empty() {
            let last = report.by_category.len() as u32;
            let mut chart = Chart::new(ChartType::Column);
            chart
                .add_series()
                .set_categories((SHEET_CATEGORY, 1, 0, last, 0))
                .set_values((SHEET_CATEGORY, 1, 1, last, 1))
                .set_name("Total Earning");
            chart.title().set_name("Earning by Category");
            sheet.insert_chart(6, 1, &chart)?;
        }
        if !report.by_region.is_empty() {
            let last = report.by_region.len() as u32;
            let mut chart = Chart::new(ChartType::Column);
            chart
                .add_series()
                .set_categories((SHEET_REGION, 1, 0, last, 0))
                .set_values((SHEET_REGION, 1, 2, last, 2))
                .set_name("Total Earning");
            chart.title().set_name("Earning by Region");
            sheet.insert_chart(6, 9, &chart)?;

            let mut trend = Chart::new(ChartType::Line);
            trend
                .add_series()
                .set_categories((SHEET_REGION, 1, 0, last, 0))
                .set_values((SHEET_REGION, 1, 5, last, 5))
                .set_name("Savings Rate");
            trend.title().set_name("Savings Rate Trend");
            sheet.insert_chart(22, 1, &trend)?;
        }
        Ok(())
    }

    fn data_quality_sheet(
        &self,
        workbook: &mut Workbook,
        rejects: &[RejectRecord],
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_DATA_QUALITY)?;
        sheet.write_string_with_format(0, 0, "File", &self.header)?;
        sheet.write_string_with_format(0, 1, "Issue", &self.header)?;
        for (i, reject) in rejects.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_string(r, 0, &reject.file)?;
            sheet.write_string(r, 1, &reject.issue())?;
        }
        sheet.set_column_width(0, 24)?;
        sheet.set_column_width(1, 48)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::validated_row::ValidatedRow;

    fn sample() -> (CleanedDataset, BenchmarkReport) {
        let dataset = CleanedDataset {
            rows: vec![ValidatedRow {
                order_id: Some("A1".into()),
                quantity: 2.0,
                unit_price: 10.0,
                status: "Completed".into(),
                category: "Widgets".into(),
                region: "North".into(),
                expense: 3.0,
            }],
            duplicates_dropped: 0,
        };
        let metrics = SummaryMetrics {
            orders: 1,
            total_quantity: 2.0,
            total_earning: 20.0,
            expenses: 3.0,
            savings: 17.0,
            savings_rate: 0.85,
            average_order_value: 20.0,
        };
        let report = BenchmarkReport {
            overall: metrics.clone(),
            by_category: vec![("Widgets".into(), metrics.clone())],
            by_region: vec![("North".into(), metrics)],
        };
        (dataset, report)
    }

    #[test]
    fn writes_the_workbook_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary_report.xlsx");
        let (dataset, report) = sample();
        WorkbookWriter::new()
            .write(&path, &dataset, &report, &[])
            .unwrap();
        assert!(path.exists());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn handles_rejects_and_empty_partitions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary_report.xlsx");
        let dataset = CleanedDataset::default();
        let report = BenchmarkReport::default();
        let rejects = vec![RejectRecord::file_level("bad.csv", "read_error: boom")];
        WorkbookWriter::new()
            .write(&path, &dataset, &report, &rejects)
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unwritable_directory_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("summary_report.xlsx");
        let (dataset, report) = sample();
        let result = WorkbookWriter::new().write(&path, &dataset, &report, &[]);
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
