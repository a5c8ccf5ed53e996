pub(crate) const TOAST_CONTAINER_ID: &str = "toast-container";
pub(crate) const REFRESH_BUTTON_ID: &str = "refresh-btn";
pub(crate) const NOTIFICATIONS_BUTTON_ID: &str = "notifications-btn";
pub(crate) const THEME_TOGGLE_ID: &str = "theme-toggle";
pub(crate) const STAT_ATTRIBUTE: &str = "data-stat";
pub(crate) const DEVICE_ATTRIBUTE: &str = "data-device-id";
pub(crate) const DEVICE_STATUS_SELECTOR: &str = ".device-status";
pub(crate) const OPEN_MODAL_SELECTOR: &str = ".modal.open";
pub(crate) const OPEN_MODAL_CLASS: &str = "open";
pub(crate) const TOAST_CLOSING_CLASS: &str = "hide";
pub(crate) const THEME_ATTRIBUTE: &str = "data-theme";
pub(crate) const API_BASE_OVERRIDE_GLOBAL: &str = "__SMARTCITY_API_BASE__";
