use cvfactory_logging::{client_debug, client_warn};
use serde_json::Value;

use crate::messages;
use crate::status::StatusReport;

/// Outcome of a task that reported SUCCESS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuccessOutcome {
    Generated(String),
    /// SUCCESS without any content field. Still a success upstream.
    Empty,
}

impl SuccessOutcome {
    pub fn display_text(&self) -> &str {
        match self {
            Self::Generated(text) => text,
            Self::Empty => messages::EMPTY_RESULT,
        }
    }
}

/// Callback surface shared by every transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    Progress { label: String },
    Succeeded { outcome: SuccessOutcome, raw: Value },
    Failed { message: String, raw: Option<Value> },
}

impl TrackerEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    Active,
    Succeeded,
    Failed,
}

/// Status transition function for one task.
///
/// Raw payloads go in, at most one terminal event comes out. After that every
/// input is ignored.
#[derive(Debug, Clone)]
pub struct Tracker {
    task_id: String,
    phase: TrackerPhase,
}

impl Tracker {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            phase: TrackerPhase::Active,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase != TrackerPhase::Active
    }

    /// Feeds one undecoded payload. A payload that is not JSON, or whose
    /// `status` is not a string, yields a transient progress event and keeps
    /// the tracker active.
    pub fn observe_raw(&mut self, raw: &str) -> Option<TrackerEvent> {
        if self.ignore_after_terminal() {
            return None;
        }
        let parsed = serde_json::from_str::<Value>(raw).and_then(|value| {
            serde_json::from_value::<StatusReport>(value.clone()).map(|report| (report, value))
        });
        match parsed {
            Ok((report, value)) => self.observe(&report, value),
            Err(err) => {
                client_warn!(
                    "Task {}: malformed status payload ({}): {:?}",
                    self.task_id,
                    err,
                    raw
                );
                Some(TrackerEvent::Progress {
                    label: messages::PROCESSING_ERROR.to_string(),
                })
            }
        }
    }

    pub fn observe(&mut self, report: &StatusReport, raw: Value) -> Option<TrackerEvent> {
        if self.ignore_after_terminal() {
            return None;
        }
        let state = report.state();
        if state.is_failure() {
            self.phase = TrackerPhase::Failed;
            return Some(TrackerEvent::Failed {
                message: report.failure_message(),
                raw: Some(raw),
            });
        }
        if state.is_terminal() {
            self.phase = TrackerPhase::Succeeded;
            let outcome = match report.success_content() {
                Some(text) => SuccessOutcome::Generated(text),
                None => {
                    client_warn!("Task {}: SUCCESS without content: {}", self.task_id, raw);
                    SuccessOutcome::Empty
                }
            };
            return Some(TrackerEvent::Succeeded { outcome, raw });
        }
        Some(TrackerEvent::Progress {
            label: report.progress_label(),
        })
    }

    /// Transport-level failure; terminal.
    pub fn fail(&mut self, message: impl Into<String>) -> Option<TrackerEvent> {
        if self.ignore_after_terminal() {
            return None;
        }
        self.phase = TrackerPhase::Failed;
        Some(TrackerEvent::Failed {
            message: message.into(),
            raw: None,
        })
    }

    fn ignore_after_terminal(&self) -> bool {
        if self.is_terminal() {
            client_debug!(
                "Task {}: ignoring input after terminal phase {:?}",
                self.task_id,
                self.phase
            );
        }
        self.is_terminal()
    }
}
