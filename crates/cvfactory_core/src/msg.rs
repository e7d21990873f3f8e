use crate::{Draft, TaskHandle, TrackerEvent, TrackerId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the job posting URL field.
    JobUrlChanged(String),
    /// User edited the free-text prompt field.
    PromptChanged(String),
    /// Restore previously saved inputs.
    RestoreDraft(Draft),
    /// Result of a notification permission request.
    NotificationPermission(bool),
    /// User clicked Generate.
    GenerateClicked,
    /// Backend answered the submission for `tracker_id`.
    /// The error side carries the human-readable detail.
    SubmissionCompleted {
        tracker_id: TrackerId,
        result: Result<TaskHandle, String>,
    },
    /// The push stream for `tracker_id` is open.
    TrackerConnected { tracker_id: TrackerId },
    /// Status update from the tracker identified by `tracker_id`.
    Tracker {
        tracker_id: TrackerId,
        event: TrackerEvent,
    },
    /// User interacted with the completion notification.
    NotificationClicked,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
