use std::time::Duration;

use cvfactory_core::{TaskHandle, Tracker, TrackerEvent};
use cvfactory_logging::{client_debug, client_info, client_warn};
use futures_util::StreamExt;

use crate::api::ApiClient;
use crate::sse::SseDecoder;
use crate::TrackingError;

/// Receives tracker output. Implementations must not block.
pub trait TrackerSink: Send + Sync {
    fn emit(&self, event: TrackerEvent);

    /// A push connection was established.
    fn connected(&self) {}
}

/// Feeds status payloads for one task into a tracker until it is terminal.
#[async_trait::async_trait]
pub trait StatusTransport: Send + Sync {
    async fn follow(&self, task: &TaskHandle, tracker: &mut Tracker, sink: &dyn TrackerSink);
}

/// Polls the status endpoint on a fixed interval.
#[derive(Debug, Clone)]
pub struct Poller {
    api: ApiClient,
    interval: Duration,
}

impl Poller {
    pub fn new(api: ApiClient, interval: Duration) -> Self {
        Self { api, interval }
    }
}

#[async_trait::async_trait]
impl StatusTransport for Poller {
    async fn follow(&self, task: &TaskHandle, tracker: &mut Tracker, sink: &dyn TrackerSink) {
        client_info!(
            "Polling task {} every {:?}",
            task.task_id,
            self.interval
        );
        while !tracker.is_terminal() {
            tokio::time::sleep(self.interval).await;
            match self.api.fetch_status(&task.task_id).await {
                Ok(body) => {
                    if let Some(event) = tracker.observe_raw(&body) {
                        sink.emit(event);
                    }
                }
                Err(err) => fail_tracker(tracker, sink, TrackingError::StatusCheck(err)),
            }
        }
        client_debug!("Stopped polling task {}", task.task_id);
    }
}

/// Follows the server-push status stream.
#[derive(Debug, Clone)]
pub struct StreamSubscriber {
    api: ApiClient,
}

impl StreamSubscriber {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl StatusTransport for StreamSubscriber {
    async fn follow(&self, task: &TaskHandle, tracker: &mut Tracker, sink: &dyn TrackerSink) {
        let response = match self.api.open_status_stream(&task.task_id).await {
            Ok(response) => response,
            Err(err) => {
                fail_tracker(tracker, sink, TrackingError::StreamOpen(err));
                return;
            }
        };
        client_info!("Status stream open for task {}", task.task_id);
        sink.connected();

        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    fail_tracker(tracker, sink, TrackingError::StreamBroken(err.to_string()));
                    return;
                }
            };
            for data in decoder.push(&chunk) {
                if let Some(event) = tracker.observe_raw(&data) {
                    sink.emit(event);
                }
                if tracker.is_terminal() {
                    // Dropping the body closes the connection.
                    client_debug!("Closing status stream for task {}", task.task_id);
                    return;
                }
            }
        }

        fail_tracker(tracker, sink, TrackingError::StreamEnded);
    }
}

pub(crate) fn fail_tracker(tracker: &mut Tracker, sink: &dyn TrackerSink, err: TrackingError) {
    client_warn!("Tracking task {} failed: {:?}", tracker.task_id(), err);
    if let Some(event) = tracker.fail(err.to_string()) {
        sink.emit(event);
    }
}
