//! Seams between the client layer and whatever hosts it: a browser page, a
//! terminal, or a test double.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::LocalBoxFuture;

use crate::error::StorageError;
use crate::notify::{Notification, ToastId};
use crate::preferences::Theme;
use crate::projector::DeviceBadge;

/// Write-only view of the page. Nothing in the client layer reads back what
/// it wrote; the return values only report whether a target existed.
pub trait PageSurface {
    /// Returns `false` when the toast container is missing.
    fn append_toast(&self, toast: &Notification) -> bool;
    fn close_toast(&self, id: ToastId);
    fn remove_toast(&self, id: ToastId);
    /// Returns `false` when no element is bound to `key`.
    fn set_stat_text(&self, key: &str, text: &str) -> bool;
    /// Returns `false` when no element carries the device id.
    fn set_device_badge(&self, device_id: &str, badge: DeviceBadge) -> bool;
    /// Returns how many open modals were closed.
    fn close_open_modals(&self) -> usize;
    fn set_theme(&self, theme: Theme);
    fn reload(&self);
}

/// Cooperative single-threaded scheduler.
pub trait EventLoop {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>);
    fn set_interval(&self, period: Duration, callback: Box<dyn FnMut()>);
}

pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes once keys plus values exceed `quota_bytes`.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: RefCell::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .borrow()
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, value)| existing.len() + value.len())
            .sum()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::Quota {
                    message: format!("{needed} bytes exceeds quota of {quota}"),
                });
            }
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_enforces_quota_per_write() {
        let storage = MemoryStorage::with_quota(16);
        assert!(storage.set_item("k", "short").is_ok());
        assert!(matches!(
            storage.set_item("other", "this value is far too long"),
            Err(StorageError::Quota { .. })
        ));
        // Overwriting an existing key only counts the new value.
        assert!(storage.set_item("k", "0123456789").is_ok());
        assert_eq!(storage.raw("k").as_deref(), Some("0123456789"));
    }
}
