use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use smartcity_client_core::{DeviceBadge, EventLoop, Notification, PageSurface, Theme, ToastId};
use tokio::time::{Instant, interval_at, sleep};

/// Terminal stand-in for the dashboard page. Toasts and widget updates go to
/// the log; stat values are kept so the caller can print a table.
#[derive(Debug, Default)]
pub struct ConsolePage {
    stats: RefCell<BTreeMap<String, String>>,
    log_stats: bool,
}

impl ConsolePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs every stat update as it lands.
    pub fn watching() -> Self {
        Self {
            log_stats: true,
            ..Self::default()
        }
    }

    pub fn stats(&self) -> BTreeMap<String, String> {
        self.stats.borrow().clone()
    }
}

impl PageSurface for ConsolePage {
    fn append_toast(&self, toast: &Notification) -> bool {
        tracing::info!(
            toast_id = toast.id.0,
            severity = toast.severity.as_str(),
            "{}",
            toast.message
        );
        true
    }

    fn close_toast(&self, _id: ToastId) {}

    fn remove_toast(&self, _id: ToastId) {}

    fn set_stat_text(&self, key: &str, text: &str) -> bool {
        if self.log_stats {
            tracing::info!(stat = key, value = text, "stat updated");
        }
        self.stats
            .borrow_mut()
            .insert(key.to_string(), text.to_string());
        true
    }

    fn set_device_badge(&self, device_id: &str, badge: DeviceBadge) -> bool {
        tracing::info!(device_id, status = badge.label(), "device status updated");
        true
    }

    fn close_open_modals(&self) -> usize {
        0
    }

    fn set_theme(&self, theme: Theme) {
        tracing::debug!(theme = theme.as_str(), "theme applied");
    }

    fn reload(&self) {
        tracing::info!("dashboard reload requested; nothing to reload in a terminal");
    }
}

/// Runs tasks and timers on the current `LocalSet`.
#[derive(Debug, Default)]
pub struct TokioEventLoop;

impl EventLoop for TokioEventLoop {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        tokio::task::spawn_local(async move {
            sleep(delay).await;
            callback();
        });
    }

    fn set_interval(&self, period: Duration, mut callback: Box<dyn FnMut()>) {
        tokio::task::spawn_local(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                callback();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn console_page_keeps_latest_stat_values() {
        let page = ConsolePage::new();
        assert!(page.set_stat_text("total_devices", "4"));
        assert!(page.set_stat_text("total_devices", "5"));
        assert_eq!(page.stats().get("total_devices").map(String::as_str), Some("5"));
        assert_eq!(page.close_open_modals(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timers_fire_after_their_delay() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let fired = Rc::new(Cell::new(0));
                let event_loop = TokioEventLoop;

                let once = Rc::clone(&fired);
                event_loop.set_timeout(
                    Duration::from_millis(300),
                    Box::new(move || once.set(once.get() + 1)),
                );
                let ticks = Rc::clone(&fired);
                event_loop.set_interval(
                    Duration::from_millis(1_000),
                    Box::new(move || ticks.set(ticks.get() + 10)),
                );

                sleep(Duration::from_millis(299)).await;
                assert_eq!(fired.get(), 0);
                sleep(Duration::from_millis(2)).await;
                assert_eq!(fired.get(), 1);
                sleep(Duration::from_millis(2_000)).await;
                assert_eq!(fired.get(), 21);
            })
            .await;
    }
}
