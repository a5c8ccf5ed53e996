use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value;

use crate::host::PageSurface;
use crate::notify::{NotificationEmitter, Severity};
use crate::preferences::{PreferenceStore, Theme};
use crate::stats::StatsPoller;
use crate::transport::{HttpTransport, NOTIFICATIONS_PATH, get_json};

/// Browser-agnostic view of a keydown event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyInput {
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn with_meta(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            meta: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Reload,
    CloseModals,
}

#[must_use]
pub fn classify_key(input: &KeyInput) -> Option<ShortcutAction> {
    if (input.ctrl || input.meta) && input.key.eq_ignore_ascii_case("r") {
        return Some(ShortcutAction::Reload);
    }
    if input.key == "Escape" {
        return Some(ShortcutAction::CloseModals);
    }
    None
}

/// An entry of `/api/notifications`. Only the count is used today.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRecord {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub read: Option<bool>,
}

/// Page lifecycle wiring and global shortcuts. Hosts bind their controls and
/// key events to these handlers.
pub struct ShortcutLayer {
    page: Rc<dyn PageSurface>,
    transport: Rc<dyn HttpTransport>,
    notifier: Rc<NotificationEmitter>,
    preferences: Rc<PreferenceStore>,
    poller: StatsPoller,
}

impl ShortcutLayer {
    pub fn new(
        page: Rc<dyn PageSurface>,
        transport: Rc<dyn HttpTransport>,
        notifier: Rc<NotificationEmitter>,
        preferences: Rc<PreferenceStore>,
        poller: StatsPoller,
    ) -> Self {
        Self {
            page,
            transport,
            notifier,
            preferences,
            poller,
        }
    }

    /// On-load work: restore the stored theme and start stats polling.
    pub fn boot(&self) {
        let preferences = self.preferences.load_preferences();
        self.page.set_theme(preferences.theme);
        self.poller.start();
    }

    /// Bound to the refresh control and to modifier+`r`.
    pub fn reload(&self) {
        tracing::info!("page reload requested");
        self.page.reload();
    }

    /// Returns whether the host should prevent the browser default.
    pub fn handle_key(&self, input: &KeyInput) -> bool {
        match classify_key(input) {
            Some(ShortcutAction::Reload) => {
                self.reload();
                true
            }
            Some(ShortcutAction::CloseModals) => {
                let closed = self.page.close_open_modals();
                if closed > 0 {
                    tracing::debug!(closed, "closed open modals");
                }
                false
            }
            None => false,
        }
    }

    /// Bound to the notifications control. Fetch failures are logged only.
    pub async fn show_pending_notifications(&self) -> Option<usize> {
        match get_json::<Vec<NotificationRecord>>(self.transport.as_ref(), NOTIFICATIONS_PATH)
            .await
        {
            Ok(records) => {
                let count = records.len();
                tracing::info!(count, "pending notifications fetched");
                self.notifier
                    .notify(format!("You have {count} notifications"), Severity::Info);
                Some(count)
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to fetch notifications");
                None
            }
        }
    }

    pub fn toggle_theme(&self) -> Theme {
        let theme = self.preferences.toggle_theme();
        self.page.set_theme(theme);
        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_r_reloads_with_either_platform_modifier() {
        assert_eq!(
            classify_key(&KeyInput::with_ctrl("r")),
            Some(ShortcutAction::Reload)
        );
        assert_eq!(
            classify_key(&KeyInput::with_meta("r")),
            Some(ShortcutAction::Reload)
        );
        assert_eq!(classify_key(&KeyInput::plain("r")), None);
        assert_eq!(classify_key(&KeyInput::with_ctrl("t")), None);
    }

    #[test]
    fn escape_closes_modals_regardless_of_modifiers() {
        assert_eq!(
            classify_key(&KeyInput::plain("Escape")),
            Some(ShortcutAction::CloseModals)
        );
        assert_eq!(
            classify_key(&KeyInput::with_ctrl("Escape")),
            Some(ShortcutAction::CloseModals)
        );
        assert_eq!(classify_key(&KeyInput::plain("Enter")), None);
    }
}
