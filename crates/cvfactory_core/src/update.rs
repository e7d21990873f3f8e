use crate::{
    messages, AppState, Effect, Msg, Phase, SuccessOutcome, TaskSubmission, TrackerEvent,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::JobUrlChanged(job_url) => {
            state.set_job_url(job_url);
            Vec::new()
        }
        Msg::PromptChanged(prompt) => {
            state.set_prompt(prompt);
            Vec::new()
        }
        Msg::RestoreDraft(draft) => {
            if state.phase() == Phase::Idle {
                state.set_job_url(draft.job_url);
                state.set_prompt(draft.prompt);
            }
            Vec::new()
        }
        Msg::NotificationPermission(granted) => {
            state.set_notifications_granted(granted);
            Vec::new()
        }
        Msg::GenerateClicked => generate(&mut state),
        Msg::SubmissionCompleted { tracker_id, result } => {
            if !state.is_current(tracker_id) || state.phase() != Phase::Submitting {
                return (state, Vec::new());
            }
            match result {
                Ok(task) => {
                    state.begin_tracking(task.task_id.clone());
                    vec![Effect::StartTracking { tracker_id, task }]
                }
                Err(detail) => {
                    state.fail(
                        messages::submission_failed(&detail),
                        messages::submission_failed_result(&detail),
                    );
                    Vec::new()
                }
            }
        }
        Msg::TrackerConnected { tracker_id } => {
            if state.is_current(tracker_id) && state.phase() == Phase::Tracking {
                state.set_status(messages::CONNECTED);
            }
            Vec::new()
        }
        Msg::Tracker { tracker_id, event } => {
            if !state.is_current(tracker_id) || state.phase() != Phase::Tracking {
                return (state, Vec::new());
            }
            apply_tracker_event(&mut state, event)
        }
        Msg::NotificationClicked => {
            state.request_result_focus();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn generate(state: &mut AppState) -> Vec<Effect> {
    let submission = match TaskSubmission::new(state.job_url(), state.prompt()) {
        Ok(submission) => submission,
        Err(err) => {
            let message = err.to_string();
            state.set_alert(message.clone());
            return vec![Effect::ShowAlert { message }];
        }
    };

    let mut effects = Vec::with_capacity(3);
    // Tear down the previous transport before a new one can exist.
    if let (Some(previous), Phase::Tracking) = (state.current_tracker(), state.phase()) {
        effects.push(Effect::StopTracking {
            tracker_id: previous,
        });
    }

    let tracker_id = state.begin_submission(submission.job_posting_url().to_string());
    effects.push(Effect::SaveDraft {
        draft: state.draft(),
    });
    effects.push(Effect::SubmitTask {
        tracker_id,
        submission,
    });
    effects
}

fn apply_tracker_event(state: &mut AppState, event: TrackerEvent) -> Vec<Effect> {
    match event {
        TrackerEvent::Progress { label } => {
            state.set_status(label);
            Vec::new()
        }
        TrackerEvent::Succeeded { outcome, .. } => match outcome {
            SuccessOutcome::Generated(text) => {
                state.succeed(messages::COMPLETED, text.clone(), None);
                vec![
                    Effect::LogDisplayedText { text },
                    Effect::Notify {
                        title: messages::NOTIFY_TITLE.to_string(),
                        body: messages::NOTIFY_BODY.to_string(),
                    },
                ]
            }
            SuccessOutcome::Empty => {
                let text = SuccessOutcome::Empty.display_text();
                state.succeed(text, String::new(), Some(text.to_string()));
                Vec::new()
            }
        },
        TrackerEvent::Failed { message, .. } => {
            state.fail(message, String::new());
            Vec::new()
        }
    }
}
