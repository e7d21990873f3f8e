use std::process::ExitCode;
use std::time::Duration;

use cvfactory_core::{update, AppState, Msg, Phase};
use cvfactory_engine::{EngineHandle, NotificationGateway, StateDir};
use cvfactory_logging::{client_error, client_info, LevelFilter};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::notify::TerminalNotifier;
use super::persistence;
use super::render::Renderer;

/// Tick period of the update loop when no engine event arrives.
const TICK: Duration = Duration::from_millis(100);

/// Positional arguments: the job posting URL, then an optional prompt.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub job_url: Option<String>,
    pub prompt: Option<String>,
}

impl CliArgs {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut args = args.into_iter();
        let job_url = args.next();
        let rest: Vec<String> = args.collect();
        let prompt = (!rest.is_empty()).then(|| rest.join(" "));
        Self { job_url, prompt }
    }
}

pub fn run_app(args: CliArgs) -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let state_dir = StateDir::new(config.state_dir);
    if let Err(err) = state_dir.ensure() {
        eprintln!("Warning: {err}");
    }
    cvfactory_logging::initialize(config.log_destination, LevelFilter::Info, state_dir.path());
    client_info!(
        "Starting against {} ({:?} transport)",
        config.client.base_url,
        config.client.transport
    );

    let engine = match EngineHandle::new(config.client) {
        Ok(engine) => engine,
        Err(err) => {
            client_error!("Engine setup failed: {}", err);
            eprintln!("Engine setup failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    let notifier = NotificationGateway::new(TerminalNotifier::new(config.notifications));
    let runner = EffectRunner::new(engine, notifier, state_dir.clone());

    let mut startup = Vec::new();
    if args.job_url.is_none() {
        if let Some(draft) = persistence::load_draft(&state_dir) {
            startup.push(Msg::RestoreDraft(draft));
        }
    }
    if let Some(job_url) = args.job_url {
        startup.push(Msg::JobUrlChanged(job_url));
    }
    if let Some(prompt) = args.prompt {
        startup.push(Msg::PromptChanged(prompt));
    }
    startup.push(runner.request_notification_permission());
    startup.push(Msg::GenerateClicked);

    let mut state = AppState::new();
    let mut renderer = Renderer::new();
    for msg in startup {
        state = dispatch(state, msg, &runner, &mut renderer);
    }

    let code = loop {
        match state.phase() {
            Phase::Succeeded => break ExitCode::SUCCESS,
            Phase::Failed => break ExitCode::FAILURE,
            // Still idle after Generate means the input was refused.
            Phase::Idle => break ExitCode::from(2),
            Phase::Submitting | Phase::Tracking => {}
        }
        let msg = runner.next_msg(TICK).unwrap_or(Msg::Tick);
        state = dispatch(state, msg, &runner, &mut renderer);
    };
    runner.shutdown();
    code
}

fn dispatch<P>(
    state: AppState,
    msg: Msg,
    runner: &EffectRunner<P>,
    renderer: &mut Renderer,
) -> AppState
where
    P: cvfactory_engine::NotificationPlatform + 'static,
{
    let (mut state, effects) = update(state, msg);
    runner.run(effects);
    if state.consume_dirty() {
        for line in renderer.render(&state.view()) {
            println!("{line}");
        }
    }
    state
}
