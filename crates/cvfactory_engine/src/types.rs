use std::time::Duration;

use cvfactory_core::{messages, TaskHandle, TrackerEvent, TrackerId};
use thiserror::Error;

use crate::config::ConfigError;

/// Transport failure of a status, stream or logging request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return RequestError::Timeout;
        }
        RequestError::Network(err.to_string())
    }
}

/// Failure of the initial job submission. Display is the user-facing detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("{detail}")]
    Rejected { status: u16, detail: String },
    #[error("missing task id")]
    MissingTaskId,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Failure that ends a tracker without a terminal status from the backend.
/// Display is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    #[error("{}", messages::status_check_failed(&.0.to_string()))]
    StatusCheck(RequestError),
    #[error("{}", messages::CONNECTION_ERROR)]
    StreamOpen(RequestError),
    #[error("{}", messages::CONNECTION_ERROR)]
    StreamBroken(String),
    #[error("{}", messages::CONNECTION_ERROR)]
    StreamEnded,
    #[error("{}", messages::TIMED_OUT)]
    TimedOut(Duration),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Client(String),
    #[error("async runtime setup failed: {0}")]
    Runtime(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    SubmissionCompleted {
        tracker_id: TrackerId,
        result: Result<TaskHandle, SubmissionError>,
    },
    TrackerConnected {
        tracker_id: TrackerId,
    },
    Tracker {
        tracker_id: TrackerId,
        event: TrackerEvent,
    },
}
