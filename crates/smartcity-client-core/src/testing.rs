//! In-memory hosts for tests: a recording page, a manually advanced event
//! loop, and a scripted transport.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use serde_json::Value;

use crate::error::TransportError;
use crate::host::{EventLoop, PageSurface};
use crate::notify::{Notification, Severity, ToastId};
use crate::preferences::Theme;
use crate::projector::DeviceBadge;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedToast {
    pub id: ToastId,
    pub message: String,
    pub severity: Severity,
    pub closing: bool,
}

/// Page double. Stat elements exist for every key unless restricted with
/// [`RecordingPage::restrict_stat_elements`]; devices must be added.
#[derive(Debug)]
pub struct RecordingPage {
    toast_container: Cell<bool>,
    toasts: RefCell<BTreeMap<ToastId, RecordedToast>>,
    shown: RefCell<Vec<(Severity, String)>>,
    stat_elements: RefCell<Option<BTreeSet<String>>>,
    stat_text: RefCell<BTreeMap<String, String>>,
    devices: RefCell<BTreeMap<String, Option<DeviceBadge>>>,
    open_modals: Cell<usize>,
    theme: Cell<Option<Theme>>,
    reloads: Cell<usize>,
}

impl Default for RecordingPage {
    fn default() -> Self {
        Self {
            toast_container: Cell::new(true),
            toasts: RefCell::new(BTreeMap::new()),
            shown: RefCell::new(Vec::new()),
            stat_elements: RefCell::new(None),
            stat_text: RefCell::new(BTreeMap::new()),
            devices: RefCell::new(BTreeMap::new()),
            open_modals: Cell::new(0),
            theme: Cell::new(None),
            reloads: Cell::new(0),
        }
    }
}

impl RecordingPage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_toast_container_present(&self, present: bool) {
        self.toast_container.set(present);
    }

    pub fn restrict_stat_elements(&self, keys: &[&str]) {
        *self.stat_elements.borrow_mut() = Some(keys.iter().map(ToString::to_string).collect());
    }

    pub fn add_device(&self, device_id: &str) {
        self.devices.borrow_mut().insert(device_id.to_string(), None);
    }

    pub fn open_modals(&self, count: usize) {
        self.open_modals.set(count);
    }

    #[must_use]
    pub fn visible_toasts(&self) -> Vec<RecordedToast> {
        self.toasts.borrow().values().cloned().collect()
    }

    /// Every toast ever appended, in order.
    #[must_use]
    pub fn shown_toasts(&self) -> Vec<(Severity, String)> {
        self.shown.borrow().clone()
    }

    #[must_use]
    pub fn stat_text(&self, key: &str) -> Option<String> {
        self.stat_text.borrow().get(key).cloned()
    }

    #[must_use]
    pub fn device_badge(&self, device_id: &str) -> Option<DeviceBadge> {
        self.devices.borrow().get(device_id).copied().flatten()
    }

    #[must_use]
    pub fn open_modal_count(&self) -> usize {
        self.open_modals.get()
    }

    #[must_use]
    pub fn theme(&self) -> Option<Theme> {
        self.theme.get()
    }

    #[must_use]
    pub fn reload_count(&self) -> usize {
        self.reloads.get()
    }
}

impl PageSurface for RecordingPage {
    fn append_toast(&self, toast: &Notification) -> bool {
        if !self.toast_container.get() {
            return false;
        }
        self.toasts.borrow_mut().insert(
            toast.id,
            RecordedToast {
                id: toast.id,
                message: toast.message.clone(),
                severity: toast.severity,
                closing: false,
            },
        );
        self.shown
            .borrow_mut()
            .push((toast.severity, toast.message.clone()));
        true
    }

    fn close_toast(&self, id: ToastId) {
        if let Some(toast) = self.toasts.borrow_mut().get_mut(&id) {
            toast.closing = true;
        }
    }

    fn remove_toast(&self, id: ToastId) {
        self.toasts.borrow_mut().remove(&id);
    }

    fn set_stat_text(&self, key: &str, text: &str) -> bool {
        if let Some(allowed) = self.stat_elements.borrow().as_ref() {
            if !allowed.contains(key) {
                return false;
            }
        }
        self.stat_text
            .borrow_mut()
            .insert(key.to_string(), text.to_string());
        true
    }

    fn set_device_badge(&self, device_id: &str, badge: DeviceBadge) -> bool {
        match self.devices.borrow_mut().get_mut(device_id) {
            Some(slot) => {
                *slot = Some(badge);
                true
            }
            None => false,
        }
    }

    fn close_open_modals(&self) -> usize {
        self.open_modals.replace(0)
    }

    fn set_theme(&self, theme: Theme) {
        self.theme.set(Some(theme));
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }
}

enum TimerCallback {
    Once(Box<dyn FnOnce()>),
    Every(Duration, Box<dyn FnMut()>),
}

struct PendingTimer {
    due: Duration,
    seq: u64,
    callback: TimerCallback,
}

/// Event loop with virtual time. Spawned tasks run on a [`LocalPool`] that
/// is driven until stalled after each fired timer and on demand.
pub struct ManualEventLoop {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    now: Cell<Duration>,
    next_seq: Cell<u64>,
    timers: RefCell<Vec<PendingTimer>>,
}

impl Default for ManualEventLoop {
    fn default() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            pool: RefCell::new(pool),
            spawner,
            now: Cell::new(Duration::ZERO),
            next_seq: Cell::new(0),
            timers: RefCell::new(Vec::new()),
        }
    }
}

impl ManualEventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Moves virtual time forward, firing due timers in order.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        while let Some(timer) = self.take_next_due(target) {
            self.now.set(timer.due);
            match timer.callback {
                TimerCallback::Once(callback) => callback(),
                TimerCallback::Every(period, mut callback) => {
                    callback();
                    self.push_timer(timer.due + period, TimerCallback::Every(period, callback));
                }
            }
            self.run_until_stalled();
        }
        self.now.set(target);
        self.run_until_stalled();
    }

    fn take_next_due(&self, target: Duration) -> Option<PendingTimer> {
        let mut timers = self.timers.borrow_mut();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= target)
            .min_by_key(|(_, timer)| (timer.due, timer.seq))
            .map(|(index, _)| index)?;
        Some(timers.remove(index))
    }

    fn push_timer(&self, due: Duration, callback: TimerCallback) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.timers.borrow_mut().push(PendingTimer { due, seq, callback });
    }
}

impl EventLoop for ManualEventLoop {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(error) = self.spawner.spawn_local(task) {
            tracing::warn!(error = %error, "manual event loop rejected task");
        }
    }

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        self.push_timer(self.now.get() + delay, TimerCallback::Once(callback));
    }

    fn set_interval(&self, period: Duration, callback: Box<dyn FnMut()>) {
        self.push_timer(
            self.now.get() + period,
            TimerCallback::Every(period, callback),
        );
    }
}

type Reply = Result<ApiResponse, TransportError>;

enum Scripted {
    Ready(Reply),
    Deferred(oneshot::Receiver<Reply>),
}

/// Transport double that answers requests from a queue, in order.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<Scripted>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push_reply(Ok(ApiResponse { status, body }));
    }

    pub fn push_reply(&self, reply: Reply) {
        self.replies.borrow_mut().push_back(Scripted::Ready(reply));
    }

    /// Queues a reply that resolves when the returned sender fires.
    pub fn push_deferred(&self) -> oneshot::Sender<Reply> {
        let (sender, receiver) = oneshot::channel();
        self.replies
            .borrow_mut()
            .push_back(Scripted::Deferred(receiver));
        sender
    }

    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request);
        let next = self.replies.borrow_mut().pop_front();
        match next {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Deferred(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err(TransportError::request("reply dropped"))),
            None => Err(TransportError::request("no scripted reply")),
        }
    }
}
