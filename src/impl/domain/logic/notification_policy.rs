/// Fail-open vs fail-closed notification handling, written out as the full
/// `{configured, strict}` decision table so each cell is testable on its
/// own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NotifyAction {
    Send,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NotificationDecision {
    pub action: NotifyAction,
    /// Status logged when the action resolves without a send error
    /// (skips log it immediately; sends log it on success).
    pub logged_status: &'static str,
    /// Whether a skip (unconfigured) or a send failure ends the run with
    /// the notification-failure exit code.
    pub fatal: bool,
}

pub(crate) fn decide(configured: bool, strict: bool) -> NotificationDecision {
    match (configured, strict) {
        (false, false) => NotificationDecision {
            action: NotifyAction::Skip,
            logged_status: "EMAIL_SKIPPED",
            fatal: false,
        },
        (false, true) => NotificationDecision {
            action: NotifyAction::Skip,
            logged_status: "EMAIL_FAILED",
            fatal: true,
        },
        (true, false) => NotificationDecision {
            action: NotifyAction::Send,
            logged_status: "EMAIL_SENT",
            fatal: false,
        },
        (true, true) => NotificationDecision {
            action: NotifyAction::Send,
            logged_status: "EMAIL_SENT",
            fatal: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_non_strict_skips_and_continues() {
        let d = decide(false, false);
        assert_eq!(d.action, NotifyAction::Skip);
        assert_eq!(d.logged_status, "EMAIL_SKIPPED");
        assert!(!d.fatal);
    }

    #[test]
    fn unconfigured_strict_fails_the_run() {
        let d = decide(false, true);
        assert_eq!(d.action, NotifyAction::Skip);
        assert_eq!(d.logged_status, "EMAIL_FAILED");
        assert!(d.fatal);
    }

    #[test]
    fn configured_sends_and_strictness_decides_failure_fatality() {
        assert_eq!(decide(true, false).action, NotifyAction::Send);
        assert!(!decide(true, false).fatal);
        assert_eq!(decide(true, true).action, NotifyAction::Send);
        assert!(decide(true, true).fatal);
    }
}
