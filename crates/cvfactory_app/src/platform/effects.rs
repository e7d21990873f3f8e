use std::time::Duration;

use cvfactory_core::{Effect, Msg};
use cvfactory_engine::{
    EngineEvent, EngineHandle, NotificationGateway, NotificationPlatform, StateDir,
};
use cvfactory_logging::{client_info, client_warn};

use super::persistence;

/// Carries core effects out to the engine, the notifier and the disk, and
/// turns engine events back into messages.
pub struct EffectRunner<P> {
    engine: EngineHandle,
    notifier: NotificationGateway<P>,
    state_dir: StateDir,
}

impl<P: NotificationPlatform + 'static> EffectRunner<P> {
    pub fn new(engine: EngineHandle, notifier: NotificationGateway<P>, state_dir: StateDir) -> Self {
        Self {
            engine,
            notifier,
            state_dir,
        }
    }

    pub fn request_notification_permission(&self) -> Msg {
        Msg::NotificationPermission(self.notifier.request_permission())
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ShowAlert { message } => {
                    client_warn!("Input rejected: {}", message);
                }
                Effect::SaveDraft { draft } => {
                    persistence::save_draft(&self.state_dir, &draft);
                }
                Effect::SubmitTask {
                    tracker_id,
                    submission,
                } => {
                    self.engine.submit(tracker_id, submission);
                }
                Effect::StartTracking { tracker_id, task } => {
                    client_info!("Tracking task {} as tracker {}", task.task_id, tracker_id);
                    self.engine.start_tracking(tracker_id, task);
                }
                Effect::StopTracking { tracker_id } => {
                    self.engine.stop_tracking(tracker_id);
                }
                Effect::LogDisplayedText { text } => {
                    self.engine.log_displayed_text(text);
                }
                Effect::Notify { title, body } => {
                    // The terminal loop ends on the terminal phase, so a click
                    // has nothing left to focus.
                    self.notifier.notify(&title, &body, None);
                }
            }
        }
    }

    pub fn shutdown(self) {
        self.engine.shutdown();
    }

    /// Next message for the update loop, waiting at most `timeout`.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SubmissionCompleted { tracker_id, result } => Msg::SubmissionCompleted {
            tracker_id,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::TrackerConnected { tracker_id } => Msg::TrackerConnected { tracker_id },
        EngineEvent::Tracker { tracker_id, event } => Msg::Tracker { tracker_id, event },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use cvfactory_core::{TaskHandle, TrackerEvent};
    use cvfactory_engine::{
        ClickCallback, ClientConfig, Permission, SubmissionError, LOCAL_BASE_URL,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    /// Clicks every notification as soon as it is shown.
    #[derive(Default)]
    struct ClickingPlatform {
        shown: AtomicU32,
        focused: AtomicU32,
    }

    impl NotificationPlatform for ClickingPlatform {
        fn permission(&self) -> Permission {
            Permission::Granted
        }

        fn request_permission(&self) -> Permission {
            Permission::Granted
        }

        fn show(&self, _title: &str, _body: &str, on_click: ClickCallback) {
            self.shown.fetch_add(1, Ordering::SeqCst);
            on_click();
        }

        fn focus_window(&self) {
            self.focused.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn notification_click_only_focuses() {
        let dir = tempfile::tempdir().unwrap();
        let base = ClientConfig::parse_base_url(LOCAL_BASE_URL).unwrap();
        let engine = EngineHandle::new(ClientConfig::with_base_url(base)).unwrap();
        let notifier = NotificationGateway::new(ClickingPlatform::default());
        let runner = EffectRunner::new(engine, notifier.clone(), StateDir::new(dir.path()));

        runner.run(vec![Effect::Notify {
            title: "완료".to_string(),
            body: "자기소개서가 준비되었습니다".to_string(),
        }]);

        assert_eq!(notifier.platform().shown.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.platform().focused.load(Ordering::SeqCst), 1);
        assert_eq!(runner.next_msg(Duration::from_millis(20)), None);
        runner.shutdown();
    }

    #[test]
    fn submission_errors_become_their_detail() {
        let msg = map_event(EngineEvent::SubmissionCompleted {
            tracker_id: 4,
            result: Err(SubmissionError::Rejected {
                status: 400,
                detail: "Invalid URL".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Msg::SubmissionCompleted {
                tracker_id: 4,
                result: Err("Invalid URL".to_string()),
            }
        );
    }

    #[test]
    fn tracker_events_pass_through() {
        let event = TrackerEvent::Progress {
            label: "분석 중".to_string(),
        };
        assert_eq!(
            map_event(EngineEvent::Tracker {
                tracker_id: 2,
                event: event.clone(),
            }),
            Msg::Tracker {
                tracker_id: 2,
                event,
            }
        );
        assert_eq!(
            map_event(EngineEvent::SubmissionCompleted {
                tracker_id: 1,
                result: Ok(TaskHandle::new("t")),
            }),
            Msg::SubmissionCompleted {
                tracker_id: 1,
                result: Ok(TaskHandle::new("t")),
            }
        );
    }
}
