use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cvfactory_core::{messages, TaskHandle, Tracker, TrackerEvent};
use cvfactory_engine::{StatusTransport, TrackerHandle, TrackerSink, TrackerSlot};
use pretty_assertions::assert_eq;
use tokio::runtime::Handle;

/// Emits a progress event every few milliseconds and never finishes.
struct Ticking;

#[async_trait::async_trait]
impl StatusTransport for Ticking {
    async fn follow(&self, _task: &TaskHandle, tracker: &mut Tracker, sink: &dyn TrackerSink) {
        loop {
            if let Some(event) = tracker.observe_raw(r#"{"status":"PROGRESS"}"#) {
                sink.emit(event);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

/// Never produces anything.
struct Silent;

#[async_trait::async_trait]
impl StatusTransport for Silent {
    async fn follow(&self, _task: &TaskHandle, _tracker: &mut Tracker, _sink: &dyn TrackerSink) {
        std::future::pending::<()>().await;
    }
}

#[derive(Default)]
struct CountingSink {
    count: AtomicUsize,
    last: Mutex<Option<TrackerEvent>>,
}

impl CountingSink {
    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl TrackerSink for CountingSink {
    fn emit(&self, event: TrackerEvent) {
        self.count.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(event);
    }
}

fn spawn_ticking(sink: Arc<CountingSink>, task_id: &str) -> TrackerHandle {
    TrackerHandle::spawn(
        &Handle::current(),
        Arc::new(Ticking),
        TaskHandle::new(task_id),
        sink,
        None,
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn no_events_after_stop() {
    let sink = Arc::new(CountingSink::default());
    let mut handle = spawn_ticking(sink.clone(), "t-1");
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(handle.is_active());

    assert!(handle.stop());
    let seen = sink.count();
    assert!(seen > 0);
    assert!(!handle.is_active());

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(sink.count(), seen);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_reports_only_the_first_call() {
    let sink = Arc::new(CountingSink::default());
    let mut handle = spawn_ticking(sink, "t-2");
    assert_eq!(handle.task_id(), "t-2");
    assert!(handle.stop());
    assert!(!handle.stop());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn task_duration_limit_fails_the_tracker() {
    let sink = Arc::new(CountingSink::default());
    let handle = TrackerHandle::spawn(
        &Handle::current(),
        Arc::new(Silent),
        TaskHandle::new("t-3"),
        sink.clone(),
        Some(Duration::from_millis(20)),
    );
    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(sink.count(), 1);
    assert_eq!(
        sink.last.lock().unwrap().clone(),
        Some(TrackerEvent::Failed {
            message: messages::TIMED_OUT.to_string(),
            raw: None,
        })
    );
    assert!(!handle.is_active());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn starting_a_new_tracker_stops_the_previous_one() {
    let first = Arc::new(CountingSink::default());
    let second = Arc::new(CountingSink::default());
    let mut slot = TrackerSlot::new();

    slot.start(1, || spawn_ticking(first.clone(), "t-a"));
    tokio::time::sleep(Duration::from_millis(30)).await;
    slot.start(2, || spawn_ticking(second.clone(), "t-b"));
    let first_seen = first.count();
    assert_eq!(slot.current_id(), Some(2));

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(first.count(), first_seen);
    assert!(second.count() > 0);

    assert!(!slot.stop(1));
    assert!(slot.is_active());
    assert!(slot.stop(2));
    assert!(!slot.stop(2));
    assert_eq!(slot.current_id(), None);
}
