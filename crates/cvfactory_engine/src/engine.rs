use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cvfactory_core::{TaskHandle, TaskSubmission, TrackerEvent, TrackerId};
use cvfactory_logging::{client_debug, client_info, client_warn};
use tokio_util::task::TaskTracker;

use crate::api::{ApiClient, Submitter};
use crate::config::TransportKind;
use crate::tracker::{TrackerHandle, TrackerSlot};
use crate::transport::{Poller, StatusTransport, StreamSubscriber, TrackerSink};
use crate::{ClientConfig, EngineError, EngineEvent};

enum EngineCommand {
    Submit {
        tracker_id: TrackerId,
        submission: TaskSubmission,
    },
    StartTracking {
        tracker_id: TrackerId,
        task: TaskHandle,
    },
    StopTracking {
        tracker_id: TrackerId,
    },
    LogDisplayedText {
        text: String,
    },
}

/// How long `shutdown` waits for submissions and log reports still in flight.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Runs network work on a background runtime. Commands are handled in order
/// on one thread, which owns the tracker slot.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: thread::JoinHandle<()>,
}

impl EngineHandle {
    pub fn new(config: ClientConfig) -> Result<Self, EngineError> {
        let api = ApiClient::new(config)?;
        let transport: Arc<dyn StatusTransport> = match api.config().transport {
            TransportKind::Poll => Arc::new(Poller::new(api.clone(), api.config().poll_interval)),
            TransportKind::Stream => Arc::new(StreamSubscriber::new(api.clone())),
        };
        Self::with_parts(api.clone(), Arc::new(api), transport)
    }

    /// Builds an engine over explicit collaborators.
    pub fn with_parts(
        api: ApiClient,
        submitter: Arc<dyn Submitter>,
        transport: Arc<dyn StatusTransport>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        let worker = thread::spawn(move || {
            let context = EngineContext {
                api,
                submitter,
                transport,
                event_tx,
                in_flight: TaskTracker::new(),
            };
            let mut slot = TrackerSlot::new();
            while let Ok(command) = cmd_rx.recv() {
                context.handle_command(&runtime, &mut slot, command);
            }
            slot.stop_current();
            context.drain(&runtime);
            client_debug!("Engine command loop exited");
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            worker,
        })
    }

    /// Stops tracking and waits briefly for outstanding requests, so a final
    /// displayed-text report is not lost on exit.
    pub fn shutdown(self) {
        let Self { cmd_tx, worker, .. } = self;
        drop(cmd_tx);
        if worker.join().is_err() {
            client_warn!("Engine thread panicked");
        }
    }

    pub fn submit(&self, tracker_id: TrackerId, submission: TaskSubmission) {
        self.send(EngineCommand::Submit {
            tracker_id,
            submission,
        });
    }

    pub fn start_tracking(&self, tracker_id: TrackerId, task: TaskHandle) {
        self.send(EngineCommand::StartTracking { tracker_id, task });
    }

    pub fn stop_tracking(&self, tracker_id: TrackerId) {
        self.send(EngineCommand::StopTracking { tracker_id });
    }

    pub fn log_displayed_text(&self, text: impl Into<String>) {
        self.send(EngineCommand::LogDisplayedText { text: text.into() });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            client_warn!("Engine thread is gone; command dropped");
        }
    }
}

struct EngineContext {
    api: ApiClient,
    submitter: Arc<dyn Submitter>,
    transport: Arc<dyn StatusTransport>,
    event_tx: mpsc::Sender<EngineEvent>,
    /// Submissions and log reports; trackers are owned by the slot.
    in_flight: TaskTracker,
}

impl EngineContext {
    fn handle_command(
        &self,
        runtime: &tokio::runtime::Runtime,
        slot: &mut TrackerSlot,
        command: EngineCommand,
    ) {
        match command {
            EngineCommand::Submit {
                tracker_id,
                submission,
            } => {
                client_info!(
                    "Submit tracker_id={} url={}",
                    tracker_id,
                    submission.job_posting_url()
                );
                let submitter = self.submitter.clone();
                let event_tx = self.event_tx.clone();
                self.in_flight.spawn_on(
                    async move {
                        let result = submitter.submit(&submission).await;
                        let _ = event_tx.send(EngineEvent::SubmissionCompleted { tracker_id, result });
                    },
                    runtime.handle(),
                );
            }
            EngineCommand::StartTracking { tracker_id, task } => {
                let sink = Arc::new(ChannelTrackerSink::new(tracker_id, self.event_tx.clone()));
                let transport = self.transport.clone();
                let max_duration = self.api.config().max_task_duration;
                slot.start(tracker_id, || {
                    TrackerHandle::spawn(runtime.handle(), transport, task, sink, max_duration)
                });
            }
            EngineCommand::StopTracking { tracker_id } => {
                slot.stop(tracker_id);
            }
            EngineCommand::LogDisplayedText { text } => {
                let api = self.api.clone();
                self.in_flight.spawn_on(
                    async move {
                        if let Err(err) = api.log_displayed_text(&text).await {
                            client_warn!("Logging displayed text failed: {}", err);
                        }
                    },
                    runtime.handle(),
                );
            }
        }
    }

    fn drain(&self, runtime: &tokio::runtime::Runtime) {
        self.in_flight.close();
        if self.in_flight.is_empty() {
            return;
        }
        client_debug!("Waiting for {} request(s) in flight", self.in_flight.len());
        let finished = runtime.block_on(async {
            tokio::time::timeout(SHUTDOWN_GRACE, self.in_flight.wait())
                .await
                .is_ok()
        });
        if !finished {
            client_warn!("Abandoning requests still running after {:?}", SHUTDOWN_GRACE);
        }
    }
}

/// Forwards tracker output to the engine event channel.
pub struct ChannelTrackerSink {
    tracker_id: TrackerId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelTrackerSink {
    pub fn new(tracker_id: TrackerId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tracker_id, tx }
    }
}

impl TrackerSink for ChannelTrackerSink {
    fn emit(&self, event: TrackerEvent) {
        let _ = self.tx.send(EngineEvent::Tracker {
            tracker_id: self.tracker_id,
            event,
        });
    }

    fn connected(&self) {
        let _ = self.tx.send(EngineEvent::TrackerConnected {
            tracker_id: self.tracker_id,
        });
    }
}
