use std::rc::Rc;

use crate::config::ClientConfig;
use crate::dispatch::CommandDispatcher;
use crate::host::{EventLoop, PageSurface, StorageBackend};
use crate::notify::NotificationEmitter;
use crate::preferences::PreferenceStore;
use crate::shortcuts::ShortcutLayer;
use crate::stats::StatsPoller;
use crate::transport::HttpTransport;

/// Host-provided handles.
#[derive(Clone)]
pub struct ClientHost {
    pub page: Rc<dyn PageSurface>,
    pub event_loop: Rc<dyn EventLoop>,
    pub storage: Rc<dyn StorageBackend>,
    pub transport: Rc<dyn HttpTransport>,
}

/// Every component of the client layer wired against one host.
pub struct ClientContext {
    pub config: ClientConfig,
    pub transport: Rc<dyn HttpTransport>,
    pub notifier: Rc<NotificationEmitter>,
    pub preferences: Rc<PreferenceStore>,
    pub poller: StatsPoller,
    pub dispatcher: Rc<CommandDispatcher>,
    pub shortcuts: Rc<ShortcutLayer>,
}

impl ClientContext {
    pub fn new(config: ClientConfig, host: ClientHost) -> Self {
        let notifier = Rc::new(NotificationEmitter::new(
            Rc::clone(&host.page),
            Rc::clone(&host.event_loop),
            &config,
        ));
        let preferences = Rc::new(PreferenceStore::new(
            Rc::clone(&host.storage),
            config.preferences_key.clone(),
        ));
        let poller = StatsPoller::new(
            Rc::clone(&host.transport),
            Rc::clone(&host.page),
            Rc::clone(&host.event_loop),
            config.stats_poll_interval,
        );
        let dispatcher = Rc::new(CommandDispatcher::new(
            Rc::clone(&host.transport),
            Rc::clone(&notifier),
            Rc::clone(&host.page),
            Rc::clone(&host.event_loop),
            config.routine_reload_delay,
        ));
        let shortcuts = Rc::new(ShortcutLayer::new(
            Rc::clone(&host.page),
            Rc::clone(&host.transport),
            Rc::clone(&notifier),
            Rc::clone(&preferences),
            poller.clone(),
        ));
        Self {
            config,
            transport: host.transport,
            notifier,
            preferences,
            poller,
            dispatcher,
            shortcuts,
        }
    }
}
