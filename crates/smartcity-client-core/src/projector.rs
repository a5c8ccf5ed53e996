use std::rc::Rc;

use crate::host::PageSurface;

/// Actions that leave a device in its active state.
pub const ACTIVE_ACTIONS: [&str; 2] = ["on", "green"];

#[must_use]
pub fn is_active_action(action: &str) -> bool {
    ACTIVE_ACTIONS.contains(&action)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceBadge {
    pub active: bool,
}

impl DeviceBadge {
    #[must_use]
    pub fn from_action(action: &str) -> Self {
        Self {
            active: is_active_action(action),
        }
    }

    #[must_use]
    pub fn class_name(self) -> &'static str {
        if self.active {
            "status-active"
        } else {
            "status-inactive"
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        if self.active { "Active" } else { "Inactive" }
    }
}

pub struct StatusProjector {
    page: Rc<dyn PageSurface>,
}

impl StatusProjector {
    pub fn new(page: Rc<dyn PageSurface>) -> Self {
        Self { page }
    }

    pub fn apply_device_status(&self, device_id: &str, action: &str) {
        let badge = DeviceBadge::from_action(action);
        if !self.page.set_device_badge(device_id, badge) {
            tracing::debug!(device_id = %device_id, "no device widget on page");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPage;

    #[test]
    fn only_on_and_green_are_active() {
        assert!(is_active_action("on"));
        assert!(is_active_action("green"));
        for action in ["off", "red", "lock", "ON", " on", ""] {
            assert!(!is_active_action(action), "{action:?} should be inactive");
        }
    }

    #[test]
    fn badge_class_and_label_follow_state() {
        let active = DeviceBadge::from_action("green");
        assert_eq!(active.class_name(), "status-active");
        assert_eq!(active.label(), "Active");

        let inactive = DeviceBadge::from_action("red");
        assert_eq!(inactive.class_name(), "status-inactive");
        assert_eq!(inactive.label(), "Inactive");
    }

    #[test]
    fn projection_is_idempotent_and_ignores_unknown_devices() {
        let page = Rc::new(RecordingPage::new());
        page.add_device("TS001");
        let projector = StatusProjector::new(Rc::clone(&page) as Rc<dyn PageSurface>);

        projector.apply_device_status("TS001", "green");
        projector.apply_device_status("TS001", "green");
        assert_eq!(page.device_badge("TS001"), Some(DeviceBadge { active: true }));

        projector.apply_device_status("TS001", "red");
        assert_eq!(page.device_badge("TS001"), Some(DeviceBadge { active: false }));

        projector.apply_device_status("SC404", "on");
        assert_eq!(page.device_badge("SC404"), None);
    }
}
