use chrono::{DateTime, Utc};
use cvfactory_core::Draft;
use cvfactory_engine::StateDir;
use cvfactory_logging::{client_error, client_info, client_warn};
use serde::{Deserialize, Serialize};

const DRAFT_FILENAME: &str = ".cvfactory_draft.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedDraft {
    job_url: String,
    prompt: String,
    saved_at: String,
}

pub(crate) fn load_draft(state_dir: &StateDir) -> Option<Draft> {
    let content = match state_dir.read(DRAFT_FILENAME) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(err) => {
            client_warn!("Failed to read saved draft: {}", err);
            return None;
        }
    };

    let saved: PersistedDraft = match ron::from_str(&content) {
        Ok(saved) => saved,
        Err(err) => {
            client_warn!(
                "Failed to parse saved draft in {:?}: {}",
                state_dir.path(),
                err
            );
            return None;
        }
    };

    match DateTime::parse_from_rfc3339(&saved.saved_at) {
        Ok(at) => client_info!("Restoring draft saved at {}", at.with_timezone(&Utc)),
        Err(_) => client_info!("Restoring draft from {:?}", state_dir.path()),
    }
    Some(Draft {
        job_url: saved.job_url,
        prompt: saved.prompt,
    })
}

pub(crate) fn save_draft(state_dir: &StateDir, draft: &Draft) {
    let saved = PersistedDraft {
        job_url: draft.job_url.clone(),
        prompt: draft.prompt.clone(),
        saved_at: Utc::now().to_rfc3339(),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&saved, pretty) {
        Ok(text) => text,
        Err(err) => {
            client_error!("Failed to serialize draft: {}", err);
            return;
        }
    };

    if let Err(err) = state_dir.write_atomic(DRAFT_FILENAME, &content) {
        client_error!("Failed to save draft: {}", err);
    }
}
