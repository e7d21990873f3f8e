use std::sync::{Arc, Mutex};

use cvfactory_engine::{ClickCallback, NotificationGateway, NotificationPlatform, Permission};

#[derive(Default)]
struct FakePlatform {
    supported: bool,
    permission: Mutex<Option<Permission>>,
    answer: Option<Permission>,
    shown: Mutex<Vec<(String, String)>>,
    clicks: Mutex<Vec<ClickCallback>>,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl FakePlatform {
    fn new(permission: Permission, answer: Permission) -> Self {
        Self {
            supported: true,
            permission: Mutex::new(Some(permission)),
            answer: Some(answer),
            ..Self::default()
        }
    }

    fn click_all(&self) {
        let clicks: Vec<ClickCallback> = self.clicks.lock().unwrap().drain(..).collect();
        for click in clicks {
            click();
        }
    }
}

impl NotificationPlatform for FakePlatform {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn permission(&self) -> Permission {
        self.permission.lock().unwrap().unwrap_or(Permission::Undecided)
    }

    fn request_permission(&self) -> Permission {
        let answer = self.answer.unwrap_or(Permission::Undecided);
        *self.permission.lock().unwrap() = Some(answer);
        answer
    }

    fn show(&self, title: &str, body: &str, on_click: ClickCallback) {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        self.clicks.lock().unwrap().push(on_click);
    }

    fn focus_window(&self) {
        self.log.lock().unwrap().push("focus");
    }
}

#[test]
fn undecided_permission_is_requested() {
    let gateway = NotificationGateway::new(FakePlatform::new(
        Permission::Undecided,
        Permission::Granted,
    ));
    assert!(gateway.request_permission());
    assert_eq!(gateway.platform().permission(), Permission::Granted);
}

#[test]
fn denied_permission_suppresses_notifications() {
    let gateway = NotificationGateway::new(FakePlatform::new(Permission::Denied, Permission::Granted));
    assert!(!gateway.request_permission());
    assert!(!gateway.notify("제목", "본문", None));
    assert!(gateway.platform().shown.lock().unwrap().is_empty());
}

#[test]
fn unsupported_platform_never_notifies() {
    let platform = FakePlatform {
        supported: false,
        ..FakePlatform::new(Permission::Granted, Permission::Granted)
    };
    let gateway = NotificationGateway::new(platform);
    assert!(!gateway.request_permission());
    assert!(!gateway.notify("제목", "본문", None));
}

#[test]
fn click_focuses_window_before_callback() {
    let gateway = NotificationGateway::new(FakePlatform::new(
        Permission::Granted,
        Permission::Granted,
    ));
    let log = gateway.platform().log.clone();
    let callback_log = log.clone();

    assert!(gateway.notify(
        "자기소개서 생성 완료!",
        "완료",
        Some(Box::new(move || callback_log.lock().unwrap().push("callback"))),
    ));
    assert_eq!(
        gateway.platform().shown.lock().unwrap().clone(),
        vec![("자기소개서 생성 완료!".to_string(), "완료".to_string())]
    );

    gateway.platform().click_all();
    assert_eq!(*log.lock().unwrap(), vec!["focus", "callback"]);
}
