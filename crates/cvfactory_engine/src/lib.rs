//! CV Factory engine: backend API client, status transports and tracker ownership.
mod api;
mod config;
mod engine;
mod notify;
mod persist;
mod sse;
mod tracker;
mod transport;
mod types;

pub use api::{error_detail, ApiClient, Submitter};
pub use config::{
    ClientConfig, ConfigError, CsrfSettings, Endpoints, SubmissionFields, TransportKind,
    LOCAL_BASE_URL, PRODUCTION_BASE_URL,
};
pub use engine::{ChannelTrackerSink, EngineHandle};
pub use notify::{ClickCallback, NotificationGateway, NotificationPlatform, Permission};
pub use persist::{PersistError, StateDir};
pub use sse::SseDecoder;
pub use tracker::{TrackerHandle, TrackerSlot};
pub use transport::{Poller, StatusTransport, StreamSubscriber, TrackerSink};
pub use types::{EngineError, EngineEvent, RequestError, SubmissionError, TrackingError};
