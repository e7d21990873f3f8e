//! Desktop notification gateway over a platform capability.

use std::sync::Arc;

use cvfactory_logging::{client_debug, client_info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Not asked yet.
    Undecided,
}

pub type ClickCallback = Box<dyn FnOnce() + Send + 'static>;

/// What the host environment provides for notifications.
pub trait NotificationPlatform: Send + Sync {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> Permission;

    /// Asks the user. Must not fail; unanswered requests count as undecided.
    fn request_permission(&self) -> Permission;

    /// Displays a notification. `on_click` runs when the user interacts with it.
    fn show(&self, title: &str, body: &str, on_click: ClickCallback);

    fn focus_window(&self);
}

pub struct NotificationGateway<P> {
    platform: Arc<P>,
}

impl<P> Clone for NotificationGateway<P> {
    fn clone(&self) -> Self {
        Self {
            platform: self.platform.clone(),
        }
    }
}

impl<P: NotificationPlatform + 'static> NotificationGateway<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform: Arc::new(platform),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// True if notifications may be shown, asking the user when undecided.
    pub fn request_permission(&self) -> bool {
        if !self.platform.is_supported() {
            client_debug!("Notifications are not supported on this platform");
            return false;
        }
        match self.platform.permission() {
            Permission::Granted => true,
            Permission::Denied => false,
            Permission::Undecided => {
                let granted = self.platform.request_permission() == Permission::Granted;
                client_info!("Notification permission granted: {}", granted);
                granted
            }
        }
    }

    /// Shows a notification if permitted. Returns whether one was shown.
    ///
    /// On interaction the application window is focused before `on_click`
    /// runs.
    pub fn notify(&self, title: &str, body: &str, on_click: Option<ClickCallback>) -> bool {
        if !self.platform.is_supported() || self.platform.permission() != Permission::Granted {
            client_debug!("Notification suppressed: {}", title);
            return false;
        }
        let platform = self.platform.clone();
        self.platform.show(
            title,
            body,
            Box::new(move || {
                platform.focus_window();
                if let Some(on_click) = on_click {
                    on_click();
                }
            }),
        );
        true
    }
}
