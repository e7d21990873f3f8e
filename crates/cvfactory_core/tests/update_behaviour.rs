use std::sync::Once;

use cvfactory_core::{
    messages, update, AppState, Draft, Effect, Msg, Phase, TaskHandle, TaskSubmission,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(cvfactory_logging::initialize_for_tests);
}

fn with_inputs(url: &str, prompt: &str) -> AppState {
    let (state, _) = update(AppState::new(), Msg::JobUrlChanged(url.to_string()));
    let (state, _) = update(state, Msg::PromptChanged(prompt.to_string()));
    state
}

#[test]
fn new_state_prefills_default_prompt() {
    init_logging();
    let view = AppState::new().view();

    assert_eq!(view.prompt, messages::DEFAULT_PROMPT);
    assert_eq!(view.phase, Phase::Idle);
    assert!(!view.is_loading);
}

#[test]
fn generate_prefixes_scheme_before_building_request() {
    init_logging();
    let state = with_inputs("example.com/job", "");

    let (mut next, effects) = update(state, Msg::GenerateClicked);
    let view = next.view();

    assert_eq!(view.job_url, "https://example.com/job");
    assert_eq!(view.phase, Phase::Submitting);
    assert_eq!(view.status_message, messages::REQUESTING);
    assert!(view.is_loading);
    assert_eq!(
        effects,
        vec![
            Effect::SaveDraft {
                draft: Draft {
                    job_url: "https://example.com/job".to_string(),
                    prompt: String::new(),
                },
            },
            Effect::SubmitTask {
                tracker_id: 1,
                submission: TaskSubmission::new("https://example.com/job", "").unwrap(),
            },
        ]
    );
    assert!(next.consume_dirty());
    assert!(!next.consume_dirty());
}

#[test]
fn empty_url_raises_alert_without_request() {
    init_logging();
    let state = with_inputs("   ", "anything");

    let (next, effects) = update(state, Msg::GenerateClicked);

    assert_eq!(
        effects,
        vec![Effect::ShowAlert {
            message: messages::MISSING_URL.to_string(),
        }]
    );
    assert_eq!(next.view().phase, Phase::Idle);
    assert_eq!(next.view().alert.as_deref(), Some(messages::MISSING_URL));
    assert_eq!(next.current_tracker(), None);
}

#[test]
fn malformed_url_raises_alert() {
    init_logging();
    let state = with_inputs("not a url", "");

    let (_next, effects) = update(state, Msg::GenerateClicked);

    assert_eq!(
        effects,
        vec![Effect::ShowAlert {
            message: messages::INVALID_URL.to_string(),
        }]
    );
}

#[test]
fn accepted_submission_starts_tracking() {
    init_logging();
    let (state, _) = update(with_inputs("example.com", ""), Msg::GenerateClicked);

    let (next, effects) = update(
        state,
        Msg::SubmissionCompleted {
            tracker_id: 1,
            result: Ok(TaskHandle::new("abc")),
        },
    );
    let view = next.view();

    assert_eq!(view.phase, Phase::Tracking);
    assert_eq!(view.task_id.as_deref(), Some("abc"));
    assert_eq!(
        view.status_message,
        format!("{}{}", messages::GENERATION_STARTED, messages::NOTIFICATION_HINT)
    );
    assert_eq!(
        effects,
        vec![Effect::StartTracking {
            tracker_id: 1,
            task: TaskHandle::new("abc"),
        }]
    );
}

#[test]
fn notification_hint_omitted_when_granted() {
    init_logging();
    let (state, _) = update(with_inputs("example.com", ""), Msg::NotificationPermission(true));
    let (state, _) = update(state, Msg::GenerateClicked);

    let (next, _) = update(
        state,
        Msg::SubmissionCompleted {
            tracker_id: 1,
            result: Ok(TaskHandle::new("abc")),
        },
    );

    assert_eq!(next.view().status_message, messages::GENERATION_STARTED);
}

#[test]
fn rejected_submission_fails_with_detail() {
    init_logging();
    let (state, _) = update(with_inputs("example.com", ""), Msg::GenerateClicked);

    let (next, effects) = update(
        state,
        Msg::SubmissionCompleted {
            tracker_id: 1,
            result: Err("body.job_posting_url - field required".to_string()),
        },
    );
    let view = next.view();

    assert!(effects.is_empty());
    assert_eq!(view.phase, Phase::Failed);
    assert!(!view.is_loading);
    assert_eq!(
        view.status_message,
        messages::submission_failed("body.job_posting_url - field required")
    );
    assert_eq!(
        view.generated_text,
        messages::submission_failed_result("body.job_posting_url - field required")
    );
}

#[test]
fn restore_draft_only_while_idle() {
    init_logging();
    let draft = Draft {
        job_url: "https://saved.example.com".to_string(),
        prompt: "saved prompt".to_string(),
    };

    let (restored, _) = update(AppState::new(), Msg::RestoreDraft(draft.clone()));
    assert_eq!(restored.draft(), draft);

    let (busy, _) = update(with_inputs("example.com", ""), Msg::GenerateClicked);
    let (still_busy, _) = update(busy, Msg::RestoreDraft(draft));
    assert_eq!(still_busy.view().job_url, "https://example.com");
}

#[test]
fn notification_click_focuses_result() {
    init_logging();
    let (next, effects) = update(AppState::new(), Msg::NotificationClicked);

    assert!(effects.is_empty());
    assert!(next.view().focus_result);
}
