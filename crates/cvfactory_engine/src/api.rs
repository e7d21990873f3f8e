use std::sync::Arc;

use cvfactory_core::{messages, TaskHandle, TaskSubmission};
use cvfactory_logging::{client_debug, client_info, client_warn};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::ACCEPT;
use serde_json::{json, Map, Value};
use url::Url;

use crate::{ClientConfig, EngineError, RequestError, SubmissionError};

#[async_trait::async_trait]
pub trait Submitter: Send + Sync {
    /// Sends one job submission. No retries.
    async fn submit(&self, submission: &TaskSubmission) -> Result<TaskHandle, SubmissionError>;
}

/// HTTP client for the backend API. Cheap to clone; clones share the
/// connection pool and cookie jar.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, EngineError> {
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .cookie_provider(jar.clone())
            .build()
            .map_err(|err| EngineError::Client(err.to_string()))?;
        Ok(Self {
            http,
            jar,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// CSRF token currently held in the cookie jar for the backend origin.
    pub fn csrf_token(&self) -> Option<String> {
        let cookies = self.jar.cookies(&self.config.base_url)?;
        let cookies = cookies.to_str().ok()?;
        let prefix = format!("{}=", self.config.csrf.cookie_name);
        cookies
            .split(';')
            .map(str::trim)
            .find_map(|pair| pair.strip_prefix(prefix.as_str()))
            .filter(|token| !token.is_empty())
            .map(ToOwned::to_owned)
    }

    /// Makes sure the CSRF cookie is present, asking the priming endpoint for
    /// it when needed. Returns `None` when priming is disabled or failed.
    pub async fn prime_csrf(&self) -> Option<String> {
        let path = self.config.endpoints.csrf.as_deref()?;
        if let Some(token) = self.csrf_token() {
            return Some(token);
        }

        match self.endpoint(path) {
            Ok(url) => match self
                .http
                .get(url)
                .timeout(self.config.request_timeout)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    client_debug!("CSRF priming succeeded");
                }
                Ok(response) => {
                    client_warn!("CSRF priming failed with status {}", response.status());
                }
                Err(err) => client_warn!("CSRF priming request failed: {}", err),
            },
            Err(err) => client_warn!("CSRF priming skipped: {}", err),
        }

        let token = self.csrf_token();
        if token.is_none() {
            client_warn!(
                "No {} cookie after priming; continuing without {}",
                self.config.csrf.cookie_name,
                self.config.csrf.header_name
            );
        }
        token
    }

    /// One status poll. Returns the undecoded body so malformed payloads can
    /// be handled by the tracker.
    pub async fn fetch_status(&self, task_id: &str) -> Result<String, RequestError> {
        let url = self.task_endpoint(&self.config.endpoints.status, task_id)?;
        let response = self
            .http
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::HttpStatus(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Opens the server-push status stream for a task.
    pub async fn open_status_stream(&self, task_id: &str) -> Result<reqwest::Response, RequestError> {
        let url = self.task_endpoint(&self.config.endpoints.stream, task_id)?;
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::HttpStatus(status.as_u16()));
        }
        Ok(response)
    }

    /// Reports the text shown to the user.
    pub async fn log_displayed_text(&self, text: &str) -> Result<(), RequestError> {
        let url = self.endpoint(&self.config.endpoints.log_displayed)?;
        let response = self
            .http
            .post(url)
            .timeout(self.config.request_timeout)
            .json(&json!({ "displayed_text": text }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::HttpStatus(status.as_u16()));
        }
        client_debug!("Displayed text logged ({} chars)", text.chars().count());
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        self.config
            .base_url
            .join(path)
            .map_err(|err| RequestError::InvalidUrl(format!("{path}: {err}")))
    }

    fn task_endpoint(&self, prefix: &str, task_id: &str) -> Result<Url, RequestError> {
        let mut url = self.endpoint(prefix)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| RequestError::InvalidUrl(prefix.to_string()))?;
            segments.pop_if_empty().push(task_id);
        }
        Ok(url)
    }

    fn submission_body(&self, submission: &TaskSubmission) -> Value {
        let mut body = Map::new();
        body.insert(
            self.config.fields.url.clone(),
            Value::String(submission.job_posting_url().to_string()),
        );
        body.insert(
            self.config.fields.prompt.clone(),
            submission
                .user_prompt()
                .map_or(Value::Null, |prompt| Value::String(prompt.to_string())),
        );
        Value::Object(body)
    }
}

#[async_trait::async_trait]
impl Submitter for ApiClient {
    async fn submit(&self, submission: &TaskSubmission) -> Result<TaskHandle, SubmissionError> {
        let url = self.endpoint(&self.config.endpoints.submit)?;
        let csrf_token = self.prime_csrf().await;

        let mut request = self
            .http
            .post(url)
            .timeout(self.config.request_timeout)
            .json(&self.submission_body(submission));
        if let Some(token) = csrf_token {
            request = request
                .header(self.config.csrf.header_name.as_str(), token)
                .header("X-Requested-With", "XMLHttpRequest");
        }

        let response = request.send().await.map_err(RequestError::from)?;
        let status = response.status();
        let body = response.text().await.map_err(RequestError::from)?;
        if !status.is_success() {
            let detail = error_detail(&body);
            client_warn!("Submission rejected with status {}: {}", status, detail);
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|err| SubmissionError::InvalidResponse(err.to_string()))?;
        let task_id = match value.get("task_id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(SubmissionError::MissingTaskId),
        };
        client_info!("Submission accepted: task_id={}", task_id);
        Ok(TaskHandle::new(task_id))
    }
}

/// Human-readable detail from an error response body.
///
/// Handles a plain `detail` string and validation error lists of
/// `{loc, msg}` entries rendered as `"loc.path - msg"`.
pub fn error_detail(body: &str) -> String {
    let detail = match serde_json::from_str::<Value>(body) {
        Ok(value) => value.get("detail").cloned(),
        Err(_) => None,
    };
    match detail {
        Some(Value::String(text)) if !text.is_empty() => text,
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(validation_entry)
            .collect::<Option<Vec<_>>>()
            .map(|entries| entries.join(", "))
            .unwrap_or_else(|| Value::Array(items.clone()).to_string()),
        Some(other @ (Value::Object(_) | Value::Array(_))) => other.to_string(),
        _ => messages::UNKNOWN_ERROR.to_string(),
    }
}

fn validation_entry(item: &Value) -> Option<String> {
    let loc = item.get("loc")?.as_array()?;
    let msg = item.get("msg")?.as_str()?;
    let path = loc
        .iter()
        .map(|part| match part {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".");
    Some(format!("{path} - {msg}"))
}
