use async_trait::async_trait;

use crate::{
    data::{
        datasources::{
            cleaned_csv_datasource::CleanedCsvDatasource,
            event_log_datasource::EventLogDatasource, smtp_mailer::Mailer,
        },
        repositories::batch_repository_impl::BatchRepositoryImpl,
    },
    domain::{
        entities::{
            pipeline_event::{EventStatus, PipelineEvent, Stage},
            run_result::RunResult,
            settings::{RunOptions, Settings},
            user::User,
            validated_row::ValidatedRow,
        },
        logic::{aggregator::Aggregator, cleaner::Cleaner, notifier::Notifier, validator::Validator},
        repositories::batch_repository::BatchRepository,
    },
    errors::{PipelineError, EXIT_OK},
    presentation::{flat_writer::FlatWriter, workbook_writer::WorkbookWriter},
};

/// The pipeline orchestrator. Stages run strictly in sequence
/// (Validate → Clean → Aggregate → Report → Notify); any unrecoverable
/// error routes through the single failure path, which flushes a final
/// event and attempts the fail-safe notification before returning.
#[async_trait]
pub(crate) trait RunPipelineUsecase: Send + Sync {
    async fn run(
        &self,
        settings: &Settings,
        options: &RunOptions,
        users: &[User],
        mailer: Option<&dyn Mailer>,
        events: &EventLogDatasource,
    ) -> RunResult;
}

pub(crate) struct RunPipelineUsecaseImpl<
    R = BatchRepositoryImpl, // Default.
> where
    R: BatchRepository,
{
    repository: R,
    cleaned_datasource: CleanedCsvDatasource,
    flat_writer: FlatWriter,
    workbook_writer: WorkbookWriter,
}

impl RunPipelineUsecaseImpl {
    pub(crate) fn new() -> Self {
        RunPipelineUsecaseImpl {
            repository: BatchRepositoryImpl::new(),
            cleaned_datasource: CleanedCsvDatasource::new(),
            flat_writer: FlatWriter::new(),
            workbook_writer: WorkbookWriter::new(),
        }
    }
}

#[async_trait]
impl<R> RunPipelineUsecase for RunPipelineUsecaseImpl<R>
where
    R: BatchRepository,
{
    async fn run(
        &self,
        settings: &Settings,
        options: &RunOptions,
        users: &[User],
        mailer: Option<&dyn Mailer>,
        events: &EventLogDatasource,
    ) -> RunResult {
        let notifier = Notifier::new(mailer, users, settings.strict_email, options.dry_run);

        // The output directory is owned by the pipeline, not the caller;
        // every artifact write below assumes it exists. The event-log parent
        // is handled by the datasource itself.
        if let Err(e) = tokio::fs::create_dir_all(&settings.paths.output_dir).await {
            return fail(
                Stage::Validate,
                PipelineError::Write {
                    path: settings.paths.output_dir.clone(),
                    detail: e.to_string(),
                },
                0,
                events,
                &notifier,
            )
            .await;
        }

        // Validate.
        // ---
        let batch = match self
            .repository
            .load_batch(&settings.paths.input_dir, &settings.files.input_extension)
            .await
        {
            Ok(batch) => batch,
            Err(e) => return fail(Stage::Validate, e, 0, events, &notifier).await,
        };
        let files_found = batch.tables.len() + batch.rejects.len();
        let outcome = Validator::new(&settings.columns).process(batch);
        let reject_count = outcome.rejects.len();

        // The diagnostics file mirrors the current run only: written
        // whenever rejects exist (even when the run aborts before the
        // workbook), removed when a clean run would otherwise leave a stale
        // one behind.
        if !outcome.rejects.is_empty() {
            if let Err(e) = self
                .flat_writer
                .write_diagnostics(&settings.diagnostics_output_path(), &outcome.rejects)
            {
                return fail(Stage::Validate, e, reject_count, events, &notifier).await;
            }
        } else if let Err(e) = std::fs::remove_file(settings.diagnostics_output_path()) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, "failed to remove stale diagnostics file");
            }
        }
        if outcome.rows.is_empty() {
            return fail(
                Stage::Validate,
                PipelineError::NoValidRows,
                reject_count,
                events,
                &notifier,
            )
            .await;
        }
        events.append(&PipelineEvent::new(
            Stage::Validate,
            EventStatus::Ok,
            format!(
                "files={} accepted={} rows={} valid={} rejects={}",
                files_found,
                outcome.files_accepted,
                outcome.data_rows,
                outcome.rows.len(),
                reject_count
            ),
        ));

        // Clean.
        // ---
        let previous_rows = self.load_previous_rows(settings).await;
        let dataset = Cleaner::new().process(previous_rows, outcome.rows);
        events.append(&PipelineEvent::new(
            Stage::Clean,
            EventStatus::Ok,
            format!(
                "rows={} duplicates_dropped={}",
                dataset.row_count(),
                dataset.duplicates_dropped
            ),
        ));

        // Aggregate.
        // ---
        let report = Aggregator::new(&settings.filters.completed_statuses).process(&dataset);
        events.append(&PipelineEvent::new(
            Stage::Aggregate,
            EventStatus::Ok,
            format!(
                "categories={} regions={} total_earning={:.2}",
                report.by_category.len(),
                report.by_region.len(),
                report.overall.total_earning
            ),
        ));

        // Report.
        // ---
        let cleaned_path = settings.cleaned_output_path();
        let report_path = settings.report_output_path();
        let write_result = self
            .flat_writer
            .write_cleaned(&cleaned_path, &dataset)
            .and_then(|()| {
                self.workbook_writer
                    .write(&report_path, &dataset, &report, &outcome.rejects)
            })
            .and_then(|()| {
                self.flat_writer
                    .write_benchmark(&settings.benchmark_output_path(), &report)
            });
        if let Err(e) = write_result {
            return fail(Stage::Report, e, reject_count, events, &notifier).await;
        }
        events.append(&PipelineEvent::new(
            Stage::Report,
            EventStatus::Ok,
            format!("report={}", report_path.display()),
        ));

        // Notify.
        // ---
        let notify = notifier.notify_completed(&cleaned_path, &report_path).await;
        events.append(&PipelineEvent::new(
            Stage::Notify,
            notify.status,
            notify.detail,
        ));
        if let Some(e) = notify.fatal {
            return RunResult {
                exit_code: e.exit_code(),
                report_path: Some(report_path),
                cleaned_path: Some(cleaned_path),
                reject_count,
                cleaned_rows: dataset.row_count(),
            };
        }

        RunResult {
            exit_code: EXIT_OK,
            report_path: Some(report_path),
            cleaned_path: Some(cleaned_path),
            reject_count,
            cleaned_rows: dataset.row_count(),
        }
    }
}

impl<R: BatchRepository> RunPipelineUsecaseImpl<R> {
    /// Rows from a previous run's cleaned output, for cross-run dedup. An
    /// unreadable previous file is logged and ignored rather than failing
    /// the run.
    async fn load_previous_rows(&self, settings: &Settings) -> Vec<ValidatedRow> {
        let path = settings.cleaned_output_path();
        if !path.exists() {
            return Vec::new();
        }
        match self.cleaned_datasource.from_file(&path).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed reading existing cleaned output; starting fresh"
                );
                Vec::new()
            }
        }
    }
}

/// Single terminal-failure path: flush a final event for the failing stage,
/// attempt the fail-safe notification, and map the error to an exit code.
async fn fail(
    stage: Stage,
    error: PipelineError,
    reject_count: usize,
    events: &EventLogDatasource,
    notifier: &Notifier<'_>,
) -> RunResult {
    tracing::error!(stage = %stage, error = %error, "pipeline failed");
    events.append(&PipelineEvent::new(
        stage,
        EventStatus::Failed,
        error.to_string(),
    ));
    let notice = notifier.notify_failed(&error.to_string()).await;
    events.append(&PipelineEvent::new(
        Stage::Notify,
        notice.status,
        notice.detail,
    ));
    RunResult {
        exit_code: error.exit_code(),
        report_path: None,
        cleaned_path: None,
        reject_count,
        cleaned_rows: 0,
    }
}
