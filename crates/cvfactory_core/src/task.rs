use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages;

/// Scheme prepended to job URLs entered without one.
pub const DEFAULT_SCHEME: &str = "https://";

/// Identifies one tracker instance (and the submission that created it).
pub type TrackerId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", messages::MISSING_URL)]
    MissingUrl,
    #[error("{}", messages::INVALID_URL)]
    InvalidUrl { url: String },
}

/// Job parameters as sent to the backend. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSubmission {
    job_posting_url: String,
    user_prompt: Option<String>,
}

impl TaskSubmission {
    /// Validates raw user input and builds a submission.
    pub fn new(raw_url: &str, raw_prompt: &str) -> Result<Self, ValidationError> {
        let job_posting_url = normalize_job_url(raw_url)?;
        let prompt = raw_prompt.trim();
        let user_prompt = (!prompt.is_empty()).then(|| prompt.to_string());
        Ok(Self {
            job_posting_url,
            user_prompt,
        })
    }

    pub fn job_posting_url(&self) -> &str {
        &self.job_posting_url
    }

    pub fn user_prompt(&self) -> Option<&str> {
        self.user_prompt.as_deref()
    }
}

/// Trims the input, prepends `https://` when no scheme is present and checks
/// that the result is an absolute URL with a host.
pub fn normalize_job_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingUrl);
    }

    let lower = trimmed.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_SCHEME}{trimmed}")
    };

    match url::Url::parse(&with_scheme) {
        Ok(parsed) if parsed.host_str().is_some_and(|host| !host.is_empty()) => Ok(with_scheme),
        _ => Err(ValidationError::InvalidUrl { url: with_scheme }),
    }
}

/// Correlation key returned by the backend for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle {
    pub task_id: String,
}

impl TaskHandle {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}
