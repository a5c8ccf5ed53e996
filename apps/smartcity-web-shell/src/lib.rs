#[cfg(any(target_arch = "wasm32", test))]
mod selectors;
#[cfg(target_arch = "wasm32")]
mod wasm_constants;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use async_trait::async_trait;
    use futures::future::LocalBoxFuture;
    use gloo_net::http::Request;
    use gloo_timers::callback::{Interval, Timeout};
    use smartcity_client_core::transport::decode_body;
    use smartcity_client_core::{
        ApiRequest, ApiResponse, ClientConfig, ClientContext, ClientHost, DeviceBadge, EventLoop,
        HttpMethod, HttpTransport, KeyInput, Notification, PageSurface, Severity, StorageBackend,
        StorageError, Theme, ToastId, TransportError,
    };
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;

    use crate::selectors::{attribute_selector, badge_class_list, toast_class_list};
    use crate::wasm_constants::*;

    mod dom;
    mod lifecycle;
    mod network;
    mod storage;

    use dom::DocumentSurface;
    use lifecycle::*;
    use network::{FetchTransport, resolve_config};
    use storage::LocalStorageBackend;

    type ClickHandlerSlot = RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>>;
    type KeyHandlerSlot = RefCell<Option<Closure<dyn FnMut(web_sys::KeyboardEvent)>>>;

    thread_local! {
        static CONTEXT: RefCell<Option<Rc<ClientContext>>> = const { RefCell::new(None) };
        static REFRESH_CLICK_HANDLER: ClickHandlerSlot = const { RefCell::new(None) };
        static NOTIFICATIONS_CLICK_HANDLER: ClickHandlerSlot = const { RefCell::new(None) };
        static THEME_TOGGLE_CLICK_HANDLER: ClickHandlerSlot = const { RefCell::new(None) };
        static GLOBAL_SHORTCUT_HANDLER: KeyHandlerSlot = const { RefCell::new(None) };
    }

    fn current_context() -> Option<Rc<ClientContext>> {
        CONTEXT.with(|slot| slot.borrow().clone())
    }

    fn result_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string(value)
            .unwrap_or_else(|_| r#"{"success":false,"error":"serialization failed"}"#.to_string())
    }

    fn not_booted_json() -> String {
        "{\"success\":false,\"error\":\"client layer is not booted\"}".to_string()
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        if let Err(error) = boot() {
            tracing::error!(error = %error, "smart city client layer failed to boot");
        }
    }

    #[wasm_bindgen]
    pub fn notify(message: String, severity: Option<String>) {
        if let Some(context) = current_context() {
            let severity = severity
                .as_deref()
                .map(Severity::from_name)
                .unwrap_or_default();
            context.notifier.notify(message, severity);
        }
    }

    #[wasm_bindgen]
    pub async fn control_device(device_id: String, action: String) -> String {
        let Some(context) = current_context() else {
            return not_booted_json();
        };
        let result = context.dispatcher.control_device(&device_id, &action).await;
        result_json(&result)
    }

    #[wasm_bindgen]
    pub async fn execute_routine(routine_type: String) -> String {
        let Some(context) = current_context() else {
            return not_booted_json();
        };
        let result = context.dispatcher.execute_routine(&routine_type).await;
        result_json(&result)
    }

    #[wasm_bindgen]
    pub async fn process_payment(amount: String, kind: String, description: String) -> String {
        let Some(context) = current_context() else {
            return not_booted_json();
        };
        let result = context
            .dispatcher
            .process_payment(&amount, &kind, &description)
            .await;
        result_json(&result)
    }

    #[wasm_bindgen]
    pub async fn refresh_stats() -> bool {
        let Some(context) = current_context() else {
            return false;
        };
        context.poller.refresh_now().await
    }

    #[wasm_bindgen]
    pub fn toggle_theme() -> String {
        current_context()
            .map(|context| context.shortcuts.toggle_theme())
            .unwrap_or_default()
            .as_str()
            .to_string()
    }

    #[wasm_bindgen]
    pub fn preference_get(key: String) -> String {
        current_context()
            .map(|context| context.preferences.get(&key, serde_json::Value::Null))
            .unwrap_or(serde_json::Value::Null)
            .to_string()
    }

    #[wasm_bindgen]
    pub fn preference_set(key: String, value_json: String) {
        let Some(context) = current_context() else {
            return;
        };
        match serde_json::from_str::<serde_json::Value>(&value_json) {
            Ok(value) => context.preferences.set(&key, &value),
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "preference value is not JSON");
            }
        }
    }

    #[wasm_bindgen]
    pub fn preference_remove(key: String) {
        if let Some(context) = current_context() {
            context.preferences.remove(&key);
        }
    }

    fn boot() -> Result<(), String> {
        let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
        let document = window
            .document()
            .ok_or_else(|| "document is unavailable".to_string())?;

        let config = resolve_config();
        let host = ClientHost {
            page: Rc::new(DocumentSurface::new(document.clone())),
            event_loop: Rc::new(BrowserEventLoop),
            storage: Rc::new(LocalStorageBackend),
            transport: Rc::new(FetchTransport::new(config.clone())),
        };
        let context = Rc::new(ClientContext::new(config, host));
        CONTEXT.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&context)));

        context.shortcuts.boot();
        bind_page_controls(&document, &context);
        tracing::info!("smart city client layer booted");
        Ok(())
    }
}
