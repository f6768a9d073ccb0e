use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport as _, Message, Tokio1Executor,
};

use crate::{domain::entities::settings::SmtpSettings, errors::PipelineError};

/// One outbound notification. Attachment paths that no longer exist are
/// skipped rather than failing the send.
#[derive(Debug, Clone)]
pub(crate) struct EmailMessage {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
    pub attachments: Vec<PathBuf>,
}

impl EmailMessage {
    pub(crate) fn attachment_names(&self) -> Vec<String> {
        self.attachments
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }
}

#[async_trait]
pub(crate) trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), PipelineError>;
}

/// SMTP implementation over STARTTLS, bounded by the configured timeout so
/// an unreachable relay cannot stall the run indefinitely.
pub(crate) struct SmtpMailer {
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub(crate) fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    async fn build_message(&self, message: &EmailMessage) -> Result<Message, PipelineError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.settings.sender)?)
            .subject(message.subject.clone());
        for recipient in &message.recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(message.body.clone()));
        for path in &message.attachments {
            if !path.exists() {
                tracing::warn!(path = %path.display(), "skipping missing attachment");
                continue;
            }
            let content = tokio::fs::read(path).await.map_err(|e| {
                PipelineError::NotificationFailed {
                    detail: format!("cannot read attachment '{}': {}", path.display(), e),
                }
            })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_owned());
            let content_type = ContentType::parse("application/octet-stream").map_err(|e| {
                PipelineError::NotificationFailed {
                    detail: e.to_string(),
                }
            })?;
            multipart = multipart.singlepart(Attachment::new(file_name).body(content, content_type));
        }

        builder
            .multipart(multipart)
            .map_err(|e| PipelineError::NotificationFailed {
                detail: e.to_string(),
            })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), PipelineError> {
        if message.recipients.is_empty() {
            return Err(PipelineError::NotificationFailed {
                detail: "no active admin recipients configured".to_owned(),
            });
        }
        let email = self.build_message(message).await?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)
            .map_err(|e| PipelineError::NotificationFailed {
                detail: e.to_string(),
            })?
            .port(self.settings.port)
            .credentials(Credentials::new(
                self.settings.username.clone(),
                self.settings.password.clone(),
            ))
            .build();

        let timeout = Duration::from_secs(self.settings.send_timeout_secs);

        // A target we cannot even connect to is reported separately from a
        // failed send, so the caller can apply the skip-vs-fail policy.
        match tokio::time::timeout(timeout, transport.test_connection()).await {
            Err(_) => {
                return Err(PipelineError::NotificationUnavailable {
                    detail: format!("connection timed out after {}s", timeout.as_secs()),
                })
            }
            Ok(Err(e)) => {
                return Err(PipelineError::NotificationUnavailable {
                    detail: e.to_string(),
                })
            }
            Ok(Ok(false)) => {
                return Err(PipelineError::NotificationUnavailable {
                    detail: "SMTP NOOP failed".to_owned(),
                })
            }
            Ok(Ok(true)) => {}
        }

        match tokio::time::timeout(timeout, transport.send(email)).await {
            Err(_) => Err(PipelineError::NotificationFailed {
                detail: format!("SMTP send timed out after {}s", timeout.as_secs()),
            }),
            Ok(Err(e)) => Err(PipelineError::NotificationFailed {
                detail: e.to_string(),
            }),
            Ok(Ok(_)) => Ok(()),
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, PipelineError> {
    address
        .parse()
        .map_err(|e| PipelineError::NotificationFailed {
            detail: format!("invalid address '{}': {}", address, e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_names_are_file_names_only() {
        let message = EmailMessage {
            subject: "s".into(),
            body: "b".into(),
            recipients: vec!["a@example.com".into()],
            attachments: vec![
                PathBuf::from("/tmp/out/summary_report.xlsx"),
                PathBuf::from("cleaned_master.csv"),
            ],
        };
        assert_eq!(
            message.attachment_names(),
            vec!["summary_report.xlsx", "cleaned_master.csv"]
        );
    }
}
