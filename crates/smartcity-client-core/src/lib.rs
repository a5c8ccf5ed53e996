//! Client-side command dispatch, feedback and local state for the smart city
//! dashboard. Every component is written against the host traits in
//! [`host`], so the same code drives a browser page, a terminal, or a test
//! double.

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod notify;
pub mod preferences;
pub mod projector;
pub mod shortcuts;
pub mod stats;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::ClientConfig;
pub use context::{ClientContext, ClientHost};
pub use dispatch::{CommandDispatcher, CommandRequest, CommandResult, OperationKind};
pub use error::{ConfigError, InputError, StorageError, TransportError};
pub use host::{EventLoop, MemoryStorage, PageSurface, StorageBackend};
pub use notify::{Notification, NotificationEmitter, Severity, ToastId};
pub use preferences::{PreferenceStore, Preferences, Theme};
pub use projector::{DeviceBadge, StatusProjector};
pub use shortcuts::{KeyInput, ShortcutAction, ShortcutLayer};
pub use stats::{StatsPoller, StatsSnapshot};
pub use transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport};
