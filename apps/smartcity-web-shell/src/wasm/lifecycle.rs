use super::*;

/// Browser event loop: `spawn_local` plus `setTimeout`/`setInterval`.
pub(super) struct BrowserEventLoop;

impl EventLoop for BrowserEventLoop {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        spawn_local(task);
    }

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        Timeout::new(duration_millis(delay), callback).forget();
    }

    fn set_interval(&self, period: Duration, mut callback: Box<dyn FnMut()>) {
        Interval::new(duration_millis(period), move || callback()).forget();
    }
}

fn duration_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

pub(super) fn key_input_from_event(event: &web_sys::KeyboardEvent) -> KeyInput {
    KeyInput {
        key: event.key(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
        alt: event.alt_key(),
        shift: event.shift_key(),
    }
}

/// Binds the refresh, notifications and theme controls plus the global
/// keydown handler. Missing controls are skipped; binding twice is a no-op.
pub(super) fn bind_page_controls(document: &web_sys::Document, context: &Rc<ClientContext>) {
    bind_click(document, REFRESH_BUTTON_ID, &REFRESH_CLICK_HANDLER, {
        let context = Rc::clone(context);
        move || context.shortcuts.reload()
    });

    bind_click(document, NOTIFICATIONS_BUTTON_ID, &NOTIFICATIONS_CLICK_HANDLER, {
        let context = Rc::clone(context);
        move || {
            let context = Rc::clone(&context);
            spawn_local(async move {
                let _ = context.shortcuts.show_pending_notifications().await;
            });
        }
    });

    bind_click(document, THEME_TOGGLE_ID, &THEME_TOGGLE_CLICK_HANDLER, {
        let context = Rc::clone(context);
        move || {
            let theme = context.shortcuts.toggle_theme();
            tracing::debug!(theme = theme.as_str(), "theme toggled");
        }
    });

    GLOBAL_SHORTCUT_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let context = Rc::clone(context);
        let callback = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::wrap(Box::new(
            move |event: web_sys::KeyboardEvent| {
                if context.shortcuts.handle_key(&key_input_from_event(&event)) {
                    event.prevent_default();
                }
            },
        ));
        let _ = document
            .add_event_listener_with_callback("keydown", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });
}

fn bind_click(
    document: &web_sys::Document,
    element_id: &str,
    handler_slot: &'static std::thread::LocalKey<ClickHandlerSlot>,
    mut on_click: impl FnMut() + 'static,
) {
    let Some(element) = document.get_element_by_id(element_id) else {
        tracing::debug!(element_id, "control not present; click binding skipped");
        return;
    };
    handler_slot.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            on_click();
        }));
        let _ = element
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });
}
