use serde::Deserialize;
use serde_json::Value;

use crate::messages;

/// Result fields that may carry the generated text, in priority order:
/// full text first, then previews, then a generic message.
pub const SUCCESS_CONTENT_FIELDS: [&str; 6] = [
    "full_cover_letter_text",
    "cover_letter_text",
    "generated_resume",
    "cover_letter_preview",
    "preview",
    "message",
];

/// Backend task state tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Started,
    Progress,
    Retry,
    Success,
    Failure,
    /// Any backend-defined `ERROR*` tag; treated like `Failure`.
    Error(String),
    Unknown(String),
}

impl TaskState {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("PENDING") => Self::Pending,
            Some("STARTED") => Self::Started,
            Some("PROGRESS") => Self::Progress,
            Some("RETRY") => Self::Retry,
            Some("SUCCESS") => Self::Success,
            Some("FAILURE") => Self::Failure,
            Some(other) if other.starts_with("ERROR") => Self::Error(other.to_string()),
            Some(other) => Self::Unknown(other.to_string()),
            None => Self::Unknown(String::new()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Error(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure | Self::Error(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Started => "STARTED",
            Self::Progress => "PROGRESS",
            Self::Retry => "RETRY",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Error(tag) | Self::Unknown(tag) => tag,
        }
    }

    fn friendly_message(&self) -> Option<&'static str> {
        match self {
            Self::Pending => Some(messages::PENDING),
            Self::Started => Some(messages::STARTED),
            Self::Retry => Some(messages::RETRY),
            Self::Progress => Some(messages::PROGRESS),
            _ => None,
        }
    }
}

/// One status payload as returned by the poll endpoint or pushed over SSE.
///
/// Only `status` has to be a string. The other fields are kept as raw values
/// so an odd `current_step` or `message` never hides a terminal state.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub current_step: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

impl StatusReport {
    pub fn state(&self) -> TaskState {
        TaskState::from_tag(self.status.as_deref())
    }

    /// Current step as display text. Numbers are rendered, other shapes ignored.
    pub fn step(&self) -> Option<String> {
        match self.current_step.as_ref()? {
            Value::String(step) if !step.is_empty() => Some(step.clone()),
            Value::Number(step) => Some(step.to_string()),
            _ => None,
        }
    }

    /// Label for a non-terminal status: step, then friendly text, then raw tag.
    pub fn progress_label(&self) -> String {
        if let Some(step) = self.step() {
            return step;
        }
        let state = self.state();
        if let Some(friendly) = state.friendly_message() {
            return friendly.to_string();
        }
        match state.as_str() {
            "" => messages::FETCHING_STATUS.to_string(),
            tag => tag.to_string(),
        }
    }

    /// Generated text of a successful task, if any content field is present.
    pub fn success_content(&self) -> Option<String> {
        success_content(self.result.as_ref())
    }

    /// Human-readable failure message including the current step.
    pub fn failure_message(&self) -> String {
        let mut message = self.failure_reason();
        if let Some(step) = self.step() {
            message.push_str(&messages::step_suffix(&step));
        }
        message
    }

    fn failure_reason(&self) -> String {
        let from_result = self.result.as_ref().and_then(|result| match result {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Object(fields) => ["error_message", "error"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(describe_error)),
            _ => None,
        });
        if let Some(reason) = from_result {
            return format!("{}{reason}", messages::FAILURE_PREFIX);
        }
        self.message
            .as_ref()
            .and_then(describe_error)
            .unwrap_or_else(|| messages::UNKNOWN_FAILURE.to_string())
    }
}

/// Picks the first non-empty content field of a success result.
pub fn success_content(result: Option<&Value>) -> Option<String> {
    match result? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Object(fields) => SUCCESS_CONTENT_FIELDS.iter().find_map(|key| {
            fields
                .get(*key)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(ToOwned::to_owned)
        }),
        _ => None,
    }
}

fn describe_error(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(value: Value) -> StatusReport {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn error_tags_are_failures() {
        for tag in ["FAILURE", "ERROR_INTERNAL", "ERROR_STREAM", "ERROR_SERIALIZATION"] {
            let state = TaskState::from_tag(Some(tag));
            assert!(state.is_terminal(), "{tag}");
            assert!(state.is_failure(), "{tag}");
        }
        assert!(!TaskState::from_tag(Some("RECEIVED")).is_terminal());
        assert!(!TaskState::from_tag(None).is_terminal());
    }

    #[test]
    fn full_text_wins_over_preview() {
        let result = json!({
            "cover_letter_preview": "short",
            "full_cover_letter_text": "long text",
            "message": "done",
        });
        assert_eq!(success_content(Some(&result)).as_deref(), Some("long text"));
    }

    #[test]
    fn empty_fields_are_skipped() {
        let result = json!({ "full_cover_letter_text": "", "message": "done" });
        assert_eq!(success_content(Some(&result)).as_deref(), Some("done"));
        assert_eq!(success_content(Some(&json!({ "other": 1 }))), None);
        assert_eq!(success_content(None), None);
    }

    #[test]
    fn failure_reason_priority() {
        let both = report(json!({
            "status": "FAILURE",
            "result": { "error": "plain", "error_message": "detailed" },
            "message": "top",
        }));
        assert_eq!(both.failure_message(), "오류: detailed");

        let object_error = report(json!({
            "status": "FAILURE",
            "result": { "error": { "code": 3 } },
        }));
        assert_eq!(object_error.failure_message(), "오류: {\"code\":3}");

        let top_level = report(json!({ "status": "ERROR_SETUP", "message": "setup broke" }));
        assert_eq!(top_level.failure_message(), "setup broke");

        let nothing = report(json!({ "status": "FAILURE" }));
        assert_eq!(nothing.failure_message(), messages::UNKNOWN_FAILURE);

        let blank = report(json!({ "status": "FAILURE", "message": "" }));
        assert_eq!(blank.failure_message(), messages::UNKNOWN_FAILURE);
    }

    #[test]
    fn non_string_side_fields_still_parse() {
        let failed = report(json!({
            "status": "FAILURE",
            "current_step": 2,
            "message": { "detail": "boom" },
        }));
        assert_eq!(failed.state(), TaskState::Failure);
        assert_eq!(
            failed.failure_message(),
            format!("{{\"detail\":\"boom\"}}{}", messages::step_suffix("2"))
        );

        let odd_step = report(json!({ "status": "PROGRESS", "current_step": ["a"] }));
        assert_eq!(odd_step.progress_label(), messages::PROGRESS);
    }

    #[test]
    fn progress_label_falls_back_to_raw_tag() {
        assert_eq!(
            report(json!({ "status": "RECEIVED" })).progress_label(),
            "RECEIVED"
        );
        assert_eq!(report(json!({})).progress_label(), messages::FETCHING_STATUS);
        assert_eq!(
            report(json!({ "status": "RETRY", "current_step": "" })).progress_label(),
            messages::RETRY
        );
    }
}
