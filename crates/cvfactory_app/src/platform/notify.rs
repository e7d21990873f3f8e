use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use cvfactory_engine::{ClickCallback, NotificationPlatform, Permission};

/// Notifications rendered as a bell plus a highlighted line on stderr.
///
/// Clicks are unsupported: a terminal line cannot be clicked, so the
/// interaction callback is dropped and `Msg::NotificationClicked` never
/// reaches this front end.
pub struct TerminalNotifier {
    enabled: bool,
    granted: AtomicBool,
}

impl TerminalNotifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            granted: AtomicBool::new(false),
        }
    }
}

impl NotificationPlatform for TerminalNotifier {
    fn is_supported(&self) -> bool {
        self.enabled
    }

    fn permission(&self) -> Permission {
        if self.granted.load(Ordering::SeqCst) {
            Permission::Granted
        } else {
            Permission::Undecided
        }
    }

    fn request_permission(&self) -> Permission {
        // Enabling notifications in the configuration is the user's consent.
        self.granted.store(self.enabled, Ordering::SeqCst);
        self.permission()
    }

    fn show(&self, title: &str, body: &str, _on_click: ClickCallback) {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "\x07*** {title} *** {body}");
    }

    fn focus_window(&self) {}
}
