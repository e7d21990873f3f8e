use crate::{Draft, TaskHandle, TaskSubmission, TrackerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Blocking message for input the client refused to send.
    ShowAlert { message: String },
    SaveDraft { draft: Draft },
    SubmitTask {
        tracker_id: TrackerId,
        submission: TaskSubmission,
    },
    StartTracking {
        tracker_id: TrackerId,
        task: TaskHandle,
    },
    StopTracking { tracker_id: TrackerId },
    /// Fire-and-forget report of the text shown to the user.
    LogDisplayedText { text: String },
    Notify { title: String, body: String },
}
