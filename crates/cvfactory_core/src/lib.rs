//! CV Factory core: task model, status transitions and the pure UI state machine.
mod effect;
pub mod messages;
mod msg;
mod state;
mod status;
mod task;
mod tracker;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, Draft, Phase};
pub use status::{success_content, StatusReport, TaskState, SUCCESS_CONTENT_FIELDS};
pub use task::{
    normalize_job_url, TaskHandle, TaskSubmission, TrackerId, ValidationError, DEFAULT_SCHEME,
};
pub use tracker::{SuccessOutcome, Tracker, TrackerEvent, TrackerPhase};
pub use update::update;
pub use view_model::AppViewModel;
