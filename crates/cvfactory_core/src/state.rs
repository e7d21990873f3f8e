use serde::{Deserialize, Serialize};

use crate::messages;
use crate::view_model::AppViewModel;
use crate::TrackerId;

/// Where the current (or last) task is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Tracking,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Submitting | Phase::Tracking)
    }

    pub fn is_finished(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

/// User inputs saved between runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Draft {
    pub job_url: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    job_url: String,
    prompt: String,
    phase: Phase,
    /// Owner of the single "current task" slot; 0 before the first submission.
    current: TrackerId,
    task_id: Option<String>,
    notifications_granted: bool,
    status_message: String,
    generated_text: String,
    error_info: Option<String>,
    alert: Option<String>,
    focus_result: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            job_url: String::new(),
            prompt: messages::DEFAULT_PROMPT.to_string(),
            phase: Phase::Idle,
            current: 0,
            task_id: None,
            notifications_granted: false,
            status_message: String::new(),
            generated_text: String::new(),
            error_info: None,
            alert: None,
            focus_result: false,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            phase: self.phase,
            job_url: self.job_url.clone(),
            prompt: self.prompt.clone(),
            task_id: self.task_id.clone(),
            status_message: self.status_message.clone(),
            generated_text: self.generated_text.clone(),
            error_info: self.error_info.clone(),
            alert: self.alert.clone(),
            is_loading: self.phase.is_busy(),
            focus_result: self.focus_result,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_tracker(&self) -> Option<TrackerId> {
        (self.current != 0).then_some(self.current)
    }

    pub fn draft(&self) -> Draft {
        Draft {
            job_url: self.job_url.clone(),
            prompt: self.prompt.clone(),
        }
    }

    pub(crate) fn job_url(&self) -> &str {
        &self.job_url
    }

    pub(crate) fn prompt(&self) -> &str {
        &self.prompt
    }

    pub(crate) fn is_current(&self, tracker_id: TrackerId) -> bool {
        self.current != 0 && self.current == tracker_id
    }

    pub(crate) fn set_job_url(&mut self, job_url: String) {
        if self.job_url != job_url {
            self.job_url = job_url;
            self.dirty = true;
        }
    }

    pub(crate) fn set_prompt(&mut self, prompt: String) {
        if self.prompt != prompt {
            self.prompt = prompt;
            self.dirty = true;
        }
    }

    pub(crate) fn set_notifications_granted(&mut self, granted: bool) {
        self.notifications_granted = granted;
    }

    pub(crate) fn set_alert(&mut self, message: String) {
        self.alert = Some(message);
        self.dirty = true;
    }

    /// Claims the current-task slot for a new submission and resets the
    /// result area. Returns the new tracker id.
    pub(crate) fn begin_submission(&mut self, normalized_url: String) -> TrackerId {
        self.current += 1;
        self.job_url = normalized_url;
        self.phase = Phase::Submitting;
        self.task_id = None;
        self.status_message = messages::REQUESTING.to_string();
        self.generated_text.clear();
        self.error_info = None;
        self.alert = None;
        self.focus_result = false;
        self.dirty = true;
        self.current
    }

    pub(crate) fn begin_tracking(&mut self, task_id: String) {
        self.phase = Phase::Tracking;
        self.task_id = Some(task_id);
        let mut status = messages::GENERATION_STARTED.to_string();
        if !self.notifications_granted {
            status.push_str(messages::NOTIFICATION_HINT);
        }
        self.status_message = status;
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status_message = status.into();
        self.dirty = true;
    }

    pub(crate) fn succeed(&mut self, status: &str, generated_text: String, error_info: Option<String>) {
        self.phase = Phase::Succeeded;
        self.status_message = status.to_string();
        self.generated_text = generated_text;
        self.error_info = error_info;
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, status: String, generated_text: String) {
        self.phase = Phase::Failed;
        self.error_info = Some(status.clone());
        self.status_message = status;
        self.generated_text = generated_text;
        self.dirty = true;
    }

    pub(crate) fn request_result_focus(&mut self) {
        self.focus_result = true;
        self.dirty = true;
    }
}
