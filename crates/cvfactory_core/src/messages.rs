//! User-facing texts shown in the status line, result area and notifications.

pub const DEFAULT_PROMPT: &str = "자기소개서를 써주세요.
회사가 자주 마주할 만한 문제가 뭔지 알려주세요.
저의 역량과 경험이 뭔지
저의 역량을 통해서
회사의 문제들을 어떻게 해결해줄 수 있는지
저의 성과를 수치를 근거로 보여주세요.";

pub const MISSING_URL: &str = "채용 공고 URL을 입력해주세요.";
pub const INVALID_URL: &str = "유효한 채용 공고 URL이 아닙니다.";

pub const REQUESTING: &str = "자기소개서 생성 요청 중...";
pub const GENERATION_STARTED: &str = "자기소개서 생성을 시작합니다... 잠시만 기다려 주세요.";
pub const NOTIFICATION_HINT: &str = " 브라우저 알림을 허용하시면 작업 완료 시 알려드립니다.";
pub const CONNECTED: &str = "서버와 연결되었습니다. 작업 진행 상황을 곧 받아옵니다...";

pub const PENDING: &str = "작업 대기 중입니다...";
pub const STARTED: &str = "자기소개서 생성을 시작합니다...";
pub const RETRY: &str = "일시적인 오류로 재시도 중입니다...";
pub const PROGRESS: &str = "자기소개서를 생성 중입니다...";
pub const FETCHING_STATUS: &str = "상태를 받아오는 중...";
pub const PROCESSING_ERROR: &str = "데이터 처리 중 오류가 발생했습니다.";

pub const COMPLETED: &str = "자기소개서 생성이 완료되었습니다!";
pub const EMPTY_RESULT: &str = "생성된 자기소개서 내용이 비어있습니다.";
pub const NOTIFY_TITLE: &str = "자기소개서 생성 완료!";
pub const NOTIFY_BODY: &str = "자기소개서가 성공적으로 생성되었습니다!";

pub const FAILURE_PREFIX: &str = "오류: ";
pub const UNKNOWN_FAILURE: &str = "자기소개서 생성 중 알 수 없는 오류가 발생했습니다.";
pub const UNKNOWN_ERROR: &str = "알 수 없는 오류";
pub const CONNECTION_ERROR: &str = "서버와 연결 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";
pub const TIMED_OUT: &str = "작업 시간이 초과되었습니다. 잠시 후 다시 시도해주세요.";

pub fn submission_failed(detail: &str) -> String {
    format!("자기소개서 생성 요청에 실패했습니다: {detail}")
}

pub fn submission_failed_result(detail: &str) -> String {
    format!("오류로 인해 자기소개서를 생성할 수 없습니다: {detail}")
}

pub fn status_check_failed(detail: &str) -> String {
    format!("작업 상태 확인 중 오류가 발생했습니다: {detail}")
}

pub fn step_suffix(step: &str) -> String {
    format!(" (진행 단계: {step})")
}
