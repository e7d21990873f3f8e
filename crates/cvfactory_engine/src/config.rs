use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Backend used when the client runs against a local development host.
pub const LOCAL_BASE_URL: &str = "http://localhost:8001";
/// Production backend origin.
pub const PRODUCTION_BASE_URL: &str =
    "https://cvfactory-server-627721457878.asia-northeast3.run.app";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// How task status is followed after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    Poll,
    #[default]
    Stream,
}

/// Endpoint paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub submit: String,
    /// Prefix; the task id is appended as the last path segment.
    pub status: String,
    /// Prefix; the task id is appended as the last path segment.
    pub stream: String,
    pub log_displayed: String,
    /// CSRF priming endpoint. `None` disables priming and the header.
    pub csrf: Option<String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            submit: "/".to_string(),
            status: "/tasks/".to_string(),
            stream: "/stream-task-status/".to_string(),
            log_displayed: "/log-displayed-cv".to_string(),
            csrf: None,
        }
    }
}

/// JSON field names of the submission body. Deployments disagree on these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFields {
    pub url: String,
    pub prompt: String,
}

impl Default for SubmissionFields {
    fn default() -> Self {
        Self {
            url: "job_posting_url".to_string(),
            prompt: "user_prompt".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfSettings {
    pub cookie_name: String,
    pub header_name: String,
}

impl Default for CsrfSettings {
    fn default() -> Self {
        Self {
            cookie_name: "csrftoken".to_string(),
            header_name: "X-CSRFToken".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub endpoints: Endpoints,
    pub fields: SubmissionFields,
    pub csrf: CsrfSettings,
    pub transport: TransportKind,
    pub poll_interval: Duration,
    /// Overall limit for one task. `None` waits indefinitely.
    pub max_task_duration: Option<Duration>,
    pub connect_timeout: Duration,
    /// Per-request limit; does not apply to the long-lived status stream.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Picks the local or production backend from the host the client runs on.
    pub fn for_hostname(hostname: &str) -> Result<Self, ConfigError> {
        let base = if is_local_host(hostname) {
            LOCAL_BASE_URL
        } else {
            PRODUCTION_BASE_URL
        };
        Self::parse_base_url(base).map(Self::with_base_url)
    }

    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            endpoints: Endpoints::default(),
            fields: SubmissionFields::default(),
            csrf: CsrfSettings::default(),
            transport: TransportKind::default(),
            poll_interval: Duration::from_secs(5),
            max_task_duration: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
        let url = Url::parse(raw).map_err(|err| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "not a base url".to_string(),
            });
        }
        Ok(url)
    }
}

fn is_local_host(hostname: &str) -> bool {
    matches!(hostname, "localhost" | "127.0.0.1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_hosts_use_local_backend() {
        assert_eq!(
            ClientConfig::for_hostname("localhost").unwrap().base_url.as_str(),
            "http://localhost:8001/"
        );
        assert_eq!(
            ClientConfig::for_hostname("127.0.0.1").unwrap().base_url.as_str(),
            "http://localhost:8001/"
        );
    }

    #[test]
    fn other_hosts_use_production() {
        let config = ClientConfig::for_hostname("cvfactory.example").unwrap();
        assert_eq!(config.base_url.as_str(), format!("{PRODUCTION_BASE_URL}/"));
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.max_task_duration, None);
    }

    #[test]
    fn base_url_must_have_host() {
        assert!(ClientConfig::parse_base_url("http://127.0.0.1:9000").is_ok());
        assert!(ClientConfig::parse_base_url("mailto:someone@example.com").is_err());
        assert!(ClientConfig::parse_base_url("not a url").is_err());
    }
}
