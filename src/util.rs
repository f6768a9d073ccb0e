use std::path::{Path, PathBuf};

use crate::{
    data::datasources::{
        event_log_datasource::EventLogDatasource, settings_json_datasource::SettingsJsonDatasource,
        smtp_mailer::{Mailer, SmtpMailer},
        users_json_datasource::UsersJsonDatasource,
    },
    domain::usecases::run_pipeline_usecase::{RunPipelineUsecase as _, RunPipelineUsecaseImpl},
    entities::{Permission, PipelineEvent, RunOptions, RunResult, Settings, User},
    errors::PipelineError,
};

/// Default event-log location under the working directory.
pub const DEFAULT_LOG_PATH: &str = "logs/events.jsonl";

/// Public entry point: owns the configuration for one run and wires the
/// orchestrator, event log and mail transport together.
pub struct SheetbotUtil {
    settings: Settings,
    users: Vec<User>,
    options: RunOptions,
    log_path: PathBuf,
}

impl SheetbotUtil {
    pub fn new(settings: Settings, users: Vec<User>, options: RunOptions) -> Self {
        let log_path = settings
            .log_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH));
        Self {
            settings,
            users,
            options,
            log_path,
        }
    }

    pub async fn load_settings(path: &Path) -> Result<Settings, PipelineError> {
        SettingsJsonDatasource::new().from_file(path).await
    }

    pub async fn load_users(path: &Path) -> Result<Vec<User>, PipelineError> {
        UsersJsonDatasource::new().from_file(path).await
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Last record in the event log, if any.
    pub fn last_event(&self) -> Option<PipelineEvent> {
        EventLogDatasource::new(&self.log_path).last_event()
    }

    /// Checks that the configured operator may run the pipeline. A missing
    /// operator setting skips the check.
    pub fn authorize_operator(&self) -> Result<(), PipelineError> {
        let Some(email) = &self.settings.operator else {
            return Ok(());
        };
        let user = self
            .users
            .iter()
            .find(|u| u.email.as_deref() == Some(email.as_str()))
            .ok_or_else(|| PipelineError::UnknownUser {
                email: email.clone(),
            })?;
        if !user.can(Permission::RunPipeline) {
            return Err(PipelineError::NotAuthorized {
                email: email.clone(),
                role: user.role.name().to_owned(),
                action: "run_pipeline".to_owned(),
            });
        }
        Ok(())
    }

    /// Runs the whole pipeline once and returns its final disposition.
    /// Never panics and never returns `Err`: every failure is mapped to an
    /// exit code and logged.
    pub async fn run(&self) -> RunResult {
        if let Err(e) = self.authorize_operator() {
            tracing::error!(error = %e, "operator not authorized");
            return RunResult {
                exit_code: e.exit_code(),
                report_path: None,
                cleaned_path: None,
                reject_count: 0,
                cleaned_rows: 0,
            };
        }

        let events = EventLogDatasource::new(&self.log_path);
        let mailer: Option<SmtpMailer> = self
            .settings
            .notifications
            .clone()
            .map(SmtpMailer::new);
        let usecase = RunPipelineUsecaseImpl::new();
        usecase
            .run(
                &self.settings,
                &self.options,
                &self.users,
                mailer.as_ref().map(|m| m as &dyn Mailer),
                &events,
            )
            .await
    }
}
