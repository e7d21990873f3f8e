use cvfactory_core::{AppViewModel, Phase};

const RULE: &str = "----------------------------------------";

/// Turns view snapshots into terminal output, printing only what changed.
#[derive(Debug, Default)]
pub struct Renderer {
    last_status: Option<String>,
    last_alert: Option<String>,
    result_shown: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(alert) = view.alert.as_ref().filter(|_| view.alert != self.last_alert) {
            lines.push(format!("[!] {alert}"));
        }
        self.last_alert = view.alert.clone();

        if !view.status_message.is_empty()
            && self.last_status.as_deref() != Some(view.status_message.as_str())
        {
            let marker = if view.is_loading { "..." } else { ">>" };
            match (&view.task_id, view.phase) {
                (Some(task_id), Phase::Tracking) => {
                    lines.push(format!("{marker} [{task_id}] {}", view.status_message));
                }
                _ => lines.push(format!("{marker} {}", view.status_message)),
            }
            self.last_status = Some(view.status_message.clone());
        }

        if view.phase.is_finished() && !self.result_shown {
            if !view.generated_text.is_empty() {
                lines.push(RULE.to_string());
                lines.extend(view.generated_text.lines().map(str::to_string));
                lines.push(RULE.to_string());
            }
            if let Some(info) = &view.error_info {
                if Some(info) != self.last_status.as_ref() {
                    lines.push(format!("[x] {info}"));
                }
            }
            self.result_shown = true;
        }
        if view.phase.is_busy() {
            self.result_shown = false;
        }

        lines
    }
}
