use super::*;

/// [`PageSurface`] over the live document.
pub(super) struct DocumentSurface {
    document: web_sys::Document,
}

impl DocumentSurface {
    pub(super) fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    fn elements_matching(&self, selector: &str) -> Vec<web_sys::Element> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|index| nodes.item(index))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .collect()
    }
}

impl PageSurface for DocumentSurface {
    fn append_toast(&self, toast: &Notification) -> bool {
        let Some(container) = self.document.get_element_by_id(TOAST_CONTAINER_ID) else {
            return false;
        };
        let Ok(element) = self.document.create_element("div") else {
            return false;
        };
        element.set_id(&toast.id.dom_id());
        element.set_class_name(&toast_class_list(toast.severity.css_class()));
        let _ = element.set_attribute("role", "status");
        element.set_text_content(Some(&toast.message));
        container.append_child(&element).is_ok()
    }

    fn close_toast(&self, id: ToastId) {
        if let Some(element) = self.document.get_element_by_id(&id.dom_id()) {
            let _ = element.class_list().add_1(TOAST_CLOSING_CLASS);
        }
    }

    fn remove_toast(&self, id: ToastId) {
        if let Some(element) = self.document.get_element_by_id(&id.dom_id()) {
            element.remove();
        }
    }

    fn set_stat_text(&self, key: &str, text: &str) -> bool {
        let elements = self.elements_matching(&attribute_selector(STAT_ATTRIBUTE, key));
        for element in &elements {
            element.set_text_content(Some(text));
        }
        !elements.is_empty()
    }

    fn set_device_badge(&self, device_id: &str, badge: DeviceBadge) -> bool {
        let selector = attribute_selector(DEVICE_ATTRIBUTE, device_id);
        let Ok(Some(widget)) = self.document.query_selector(&selector) else {
            return false;
        };
        let Ok(Some(status)) = widget.query_selector(DEVICE_STATUS_SELECTOR) else {
            return false;
        };
        status.set_class_name(&badge_class_list(badge.class_name()));
        status.set_text_content(Some(badge.label()));
        true
    }

    fn close_open_modals(&self) -> usize {
        let modals = self.elements_matching(OPEN_MODAL_SELECTOR);
        for modal in &modals {
            let _ = modal.class_list().remove_1(OPEN_MODAL_CLASS);
        }
        modals.len()
    }

    fn set_theme(&self, theme: Theme) {
        if let Some(root) = self.document.document_element() {
            let _ = root.set_attribute(THEME_ATTRIBUTE, theme.as_str());
        }
    }

    fn reload(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(error) = window.location().reload() {
            tracing::warn!(error = ?error, "page reload failed");
        }
    }
}
