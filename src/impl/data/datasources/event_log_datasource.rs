use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use crate::domain::entities::pipeline_event::PipelineEvent;

/// Append-only JSONL sink for pipeline events. Writes are best-effort:
/// a failed append is reported through `tracing` and swallowed, so logging
/// can never become the reason a run fails.
pub(crate) struct EventLogDatasource {
    path: PathBuf,
}

impl EventLogDatasource {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one event record. Never truncates or rewrites prior entries.
    pub(crate) fn append(&self, event: &PipelineEvent) {
        if let Err(e) = self.try_append(event) {
            tracing::warn!(
                log_path = %self.path.display(),
                stage = %event.stage,
                error = %e,
                "failed to append pipeline event"
            );
        }
    }

    fn try_append(&self, event: &PipelineEvent) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }

    /// Last event in the log, if any. Unparseable or blank lines are skipped.
    pub(crate) fn last_event(&self) -> Option<PipelineEvent> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        contents
            .lines()
            .rev()
            .filter(|l| !l.trim().is_empty())
            .find_map(|l| serde_json::from_str(l).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::pipeline_event::{EventStatus, Stage};

    #[test]
    fn appends_one_line_per_event_and_keeps_prior_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLogDatasource::new(dir.path().join("logs/events.jsonl"));

        log.append(&PipelineEvent::new(Stage::Validate, EventStatus::Ok, "rows=10"));
        log.append(&PipelineEvent::new(Stage::Clean, EventStatus::Ok, "rows=8"));

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"validate\""));
        assert!(lines[1].contains("\"clean\""));

        let last = log.last_event().unwrap();
        assert_eq!(last.stage, Stage::Clean);
        assert_eq!(last.status, EventStatus::Ok);
    }

    #[test]
    fn append_failure_is_swallowed() {
        // Path whose parent is a file, so create_dir_all fails.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let log = EventLogDatasource::new(blocker.join("events.jsonl"));
        log.append(&PipelineEvent::new(Stage::Notify, EventStatus::Failed, "x"));
        assert!(log.last_event().is_none());
    }
}
