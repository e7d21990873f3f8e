use crate::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: Phase,
    pub job_url: String,
    pub prompt: String,
    pub task_id: Option<String>,
    pub status_message: String,
    pub generated_text: String,
    pub error_info: Option<String>,
    pub alert: Option<String>,
    pub is_loading: bool,
    pub focus_result: bool,
    pub dirty: bool,
}
