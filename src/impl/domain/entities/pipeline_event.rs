use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One discrete phase of the pipeline. Each working stage produces exactly
/// one event-log entry per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Validate,
    Clean,
    Aggregate,
    Report,
    Notify,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Validate => "validate",
            Stage::Clean => "clean",
            Stage::Aggregate => "aggregate",
            Stage::Report => "report",
            Stage::Notify => "notify",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Ok,
    Skipped,
    Failed,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventStatus::Ok => "OK",
            EventStatus::Skipped => "SKIPPED",
            EventStatus::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Append-only record of one stage outcome; never mutated or deleted.
#[derive(Debug, Clone, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct PipelineEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub stage: Stage,
    pub status: EventStatus,
    pub detail: String,
}

impl PipelineEvent {
    pub fn new(stage: Stage, status: EventStatus, detail: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            stage,
            status,
            detail: detail.into(),
        }
    }
}
