use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use cvfactory_core::{TaskHandle, Tracker, TrackerEvent, TrackerId};
use cvfactory_logging::{client_debug, client_info};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::transport::{fail_tracker, StatusTransport, TrackerSink};
use crate::TrackingError;

/// Owns the transport of one in-flight task.
///
/// Once `stop` has returned, the sink receives nothing further from this
/// handle.
pub struct TrackerHandle {
    task_id: String,
    cancel: CancellationToken,
    /// Held while emitting and while cancelling, so no event slips past `stop`.
    gate: Arc<Mutex<()>>,
    join: Option<JoinHandle<()>>,
}

impl TrackerHandle {
    pub fn spawn(
        runtime: &Handle,
        transport: Arc<dyn StatusTransport>,
        task: TaskHandle,
        sink: Arc<dyn TrackerSink>,
        max_duration: Option<Duration>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let gate = Arc::new(Mutex::new(()));
        let gated = Arc::new(CancelGatedSink {
            inner: sink,
            cancel: cancel.clone(),
            gate: gate.clone(),
        });
        let task_id = task.task_id.clone();
        let token = cancel.clone();
        let join = runtime.spawn(async move {
            let mut tracker = Tracker::new(task.task_id.clone());
            let finished = tokio::select! {
                _ = token.cancelled() => false,
                _ = follow(transport.as_ref(), &task, &mut tracker, gated.as_ref(), max_duration) => true,
            };
            if finished {
                client_debug!("Tracker for task {} finished: {:?}", task.task_id, tracker.phase());
            } else {
                client_debug!("Tracker for task {} cancelled", task.task_id);
            }
        });

        Self {
            task_id,
            cancel,
            gate,
            join: Some(join),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// True until the tracker reached a terminal status or was stopped.
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
            && self
                .join
                .as_ref()
                .is_some_and(|join| !join.is_finished())
    }

    /// Deactivates the transport. Returns false when already stopped.
    pub fn stop(&mut self) -> bool {
        let Some(join) = self.join.take() else {
            return false;
        };
        {
            let _guard = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            self.cancel.cancel();
        }
        join.abort();
        client_info!("Stopped tracker for task {}", self.task_id);
        true
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The single "current task" slot. Starting a tracker stops the previous one
/// before the new transport is created.
#[derive(Default)]
pub struct TrackerSlot {
    current: Option<(TrackerId, TrackerHandle)>,
}

impl TrackerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, tracker_id: TrackerId, spawn: impl FnOnce() -> TrackerHandle) {
        self.stop_current();
        self.current = Some((tracker_id, spawn()));
    }

    /// Stops the tracker only if it is the one named.
    pub fn stop(&mut self, tracker_id: TrackerId) -> bool {
        match self.current.as_ref() {
            Some((current, _)) if *current == tracker_id => self.stop_current(),
            _ => {
                client_debug!("Ignoring stop for inactive tracker {}", tracker_id);
                false
            }
        }
    }

    pub fn stop_current(&mut self) -> bool {
        match self.current.take() {
            Some((_, mut handle)) => handle.stop(),
            None => false,
        }
    }

    pub fn current_id(&self) -> Option<TrackerId> {
        self.current.as_ref().map(|(id, _)| *id)
    }

    pub fn is_active(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|(_, handle)| handle.is_active())
    }
}

async fn follow(
    transport: &dyn StatusTransport,
    task: &TaskHandle,
    tracker: &mut Tracker,
    sink: &dyn TrackerSink,
    max_duration: Option<Duration>,
) {
    let Some(limit) = max_duration else {
        transport.follow(task, tracker, sink).await;
        return;
    };
    if tokio::time::timeout(limit, transport.follow(task, tracker, sink))
        .await
        .is_err()
    {
        fail_tracker(tracker, sink, TrackingError::TimedOut(limit));
    }
}

struct CancelGatedSink {
    inner: Arc<dyn TrackerSink>,
    cancel: CancellationToken,
    gate: Arc<Mutex<()>>,
}

impl TrackerSink for CancelGatedSink {
    fn emit(&self, event: TrackerEvent) {
        let _guard = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.cancel.is_cancelled() {
            self.inner.emit(event);
        }
    }

    fn connected(&self) {
        let _guard = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.cancel.is_cancelled() {
            self.inner.connected();
        }
    }
}
