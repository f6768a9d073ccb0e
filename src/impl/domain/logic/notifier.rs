use std::path::{Path, PathBuf};

use crate::{
    data::datasources::smtp_mailer::{EmailMessage, Mailer},
    domain::{
        entities::{
            pipeline_event::EventStatus,
            user::{admin_recipients, User},
        },
        logic::notification_policy::{decide, NotifyAction},
    },
    errors::PipelineError,
};

/// Outcome of the notifier stage: what to log, and whether the failure is
/// fatal for the run (strict mode only).
#[derive(Debug)]
pub(crate) struct NotifyOutcome {
    pub status: EventStatus,
    pub detail: String,
    pub fatal: Option<PipelineError>,
}

pub(crate) struct Notifier<'a> {
    mailer: Option<&'a dyn Mailer>,
    users: &'a [User],
    strict: bool,
    dry_run: bool,
}

impl<'a> Notifier<'a> {
    pub(crate) fn new(
        mailer: Option<&'a dyn Mailer>,
        users: &'a [User],
        strict: bool,
        dry_run: bool,
    ) -> Self {
        Self {
            mailer,
            users,
            strict,
            dry_run,
        }
    }

    /// Success notification with the generated artifacts attached.
    pub(crate) async fn notify_completed(
        &self,
        cleaned_path: &Path,
        report_path: &Path,
    ) -> NotifyOutcome {
        let body = format!(
            "The data pipeline has completed successfully.\n\n\
             Cleaned file: {}\nReport file: {}",
            cleaned_path.display(),
            report_path.display()
        );
        let attachments = [cleaned_path, report_path]
            .iter()
            .filter(|p| p.exists())
            .map(|p| p.to_path_buf())
            .collect();
        self.notify("Pipeline Completed", body, attachments, false)
            .await
    }

    /// Fail-safe notification on a pipeline failure. Always fail-open: a
    /// broken mail target must not mask the original failure.
    pub(crate) async fn notify_failed(&self, error_summary: &str) -> NotifyOutcome {
        let body = format!(
            "The data pipeline encountered an error:\n{}",
            error_summary
        );
        self.notify("Pipeline Failed", body, Vec::new(), true).await
    }

    async fn notify(
        &self,
        subject: &str,
        body: String,
        attachments: Vec<PathBuf>,
        fail_open: bool,
    ) -> NotifyOutcome {
        let recipients = admin_recipients(self.users);

        if self.dry_run {
            // Never a real send in dry-run mode, regardless of strictness.
            let message = EmailMessage {
                subject: format!("[DRY RUN] {}", subject),
                body: format!(
                    "{}\n\nNOTE: This is a dry run. No email was actually sent.",
                    body
                ),
                recipients,
                attachments,
            };
            tracing::info!(
                subject = %message.subject,
                recipients = ?message.recipients,
                attachments = ?message.attachment_names(),
                "dry run: simulated email send"
            );
            return NotifyOutcome {
                status: EventStatus::Ok,
                detail: format!(
                    "EMAIL_SENT dry_run=true subject='{}' recipients={}",
                    message.subject,
                    message.recipients.len()
                ),
                fatal: None,
            };
        }

        let strict = self.strict && !fail_open;
        let decision = decide(self.mailer.is_some(), strict);
        let mailer = match (decision.action, self.mailer) {
            (NotifyAction::Send, Some(mailer)) => mailer,
            _ => {
                return NotifyOutcome {
                    status: if decision.fatal {
                        EventStatus::Failed
                    } else {
                        EventStatus::Skipped
                    },
                    detail: format!("{} mail target not configured", decision.logged_status),
                    fatal: decision.fatal.then(|| PipelineError::NotificationFailed {
                        detail: "mail target not configured in strict mode".to_owned(),
                    }),
                };
            }
        };

        let message = EmailMessage {
            subject: subject.to_owned(),
            body,
            recipients,
            attachments,
        };
        match mailer.send(&message).await {
            Ok(()) => NotifyOutcome {
                status: EventStatus::Ok,
                detail: format!(
                    "{} subject='{}' recipients={}",
                    decision.logged_status,
                    message.subject,
                    message.recipients.len()
                ),
                fatal: None,
            },
            // An unreachable target is handled like an absent one: skipped
            // unless strict mode makes the gap fatal.
            Err(e @ PipelineError::NotificationUnavailable { .. }) => {
                tracing::warn!(error = %e, "mail target unreachable");
                if decision.fatal {
                    NotifyOutcome {
                        status: EventStatus::Failed,
                        detail: format!("EMAIL_FAILED {}", e),
                        fatal: Some(PipelineError::NotificationUnavailable {
                            detail: e.to_string(),
                        }),
                    }
                } else {
                    NotifyOutcome {
                        status: EventStatus::Skipped,
                        detail: format!("EMAIL_SKIPPED {}", e),
                        fatal: None,
                    }
                }
            }
            // A send failure on a reachable target is always EMAIL_FAILED,
            // distinguishing "configured but broken" from "not configured".
            Err(e) => {
                tracing::warn!(error = %e, "email send failed");
                NotifyOutcome {
                    status: EventStatus::Failed,
                    detail: format!("EMAIL_FAILED {}", e),
                    fatal: decision.fatal.then(|| PipelineError::NotificationFailed {
                        detail: e.to_string(),
                    }),
                }
            }
        }
    }
}
