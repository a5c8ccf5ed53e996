use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::host::{EventLoop, PageSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Unknown names fall back to `Info`.
    #[must_use]
    pub fn from_name(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Info => "toast-info",
            Self::Success => "toast-success",
            Self::Error => "toast-error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ToastId(pub u64);

impl ToastId {
    #[must_use]
    pub fn dom_id(self) -> String {
        format!("toast-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: ToastId,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

/// Shows toasts and expires them: `display` after insertion the toast starts
/// closing, and `exit_animation` later it is removed.
pub struct NotificationEmitter {
    page: Rc<dyn PageSurface>,
    event_loop: Rc<dyn EventLoop>,
    display: Duration,
    exit_animation: Duration,
    next_id: Cell<u64>,
    live: Rc<RefCell<BTreeSet<ToastId>>>,
}

impl NotificationEmitter {
    pub fn new(
        page: Rc<dyn PageSurface>,
        event_loop: Rc<dyn EventLoop>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            page,
            event_loop,
            display: config.toast_display,
            exit_animation: config.toast_exit_animation,
            next_id: Cell::new(1),
            live: Rc::new(RefCell::new(BTreeSet::new())),
        }
    }

    pub fn notify(&self, message: impl Into<String>, severity: Severity) {
        let id = ToastId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let notification = Notification {
            id,
            message: message.into(),
            severity,
            created_at: Utc::now(),
        };

        if !self.page.append_toast(&notification) {
            tracing::debug!(
                severity = severity.as_str(),
                "toast container missing; notification dropped"
            );
            return;
        }
        tracing::debug!(
            toast_id = id.0,
            severity = severity.as_str(),
            message = %notification.message,
            "notification shown"
        );
        self.live.borrow_mut().insert(id);

        let page = Rc::clone(&self.page);
        let event_loop = Rc::clone(&self.event_loop);
        let live = Rc::clone(&self.live);
        let exit_animation = self.exit_animation;
        self.event_loop.set_timeout(
            self.display,
            Box::new(move || {
                page.close_toast(id);
                event_loop.set_timeout(
                    exit_animation,
                    Box::new(move || {
                        page.remove_toast(id);
                        live.borrow_mut().remove(&id);
                    }),
                );
            }),
        );
    }

    /// Toasts inserted and not yet removed.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }
}
