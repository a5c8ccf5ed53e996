use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;

use crate::host::{EventLoop, PageSurface};
use crate::transport::{ApiRequest, HttpTransport, STATS_PATH};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsSnapshot {
    values: BTreeMap<String, Value>,
}

impl StatsSnapshot {
    /// Only a JSON object is a snapshot.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                values: map.into_iter().collect(),
            }),
            _ => None,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Every key in this snapshot, paired with its display text.
    pub fn entries(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), display_text(value)))
    }
}

#[must_use]
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => {
                format!("{}", float as i64)
            }
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}

/// Periodic `/api/stats` refresh. Failures are logged only; overlapping ticks
/// are allowed and the last response to resolve wins.
#[derive(Clone)]
pub struct StatsPoller {
    inner: Rc<PollerInner>,
}

struct PollerInner {
    transport: Rc<dyn HttpTransport>,
    page: Rc<dyn PageSurface>,
    event_loop: Rc<dyn EventLoop>,
    period: Duration,
    latest: RefCell<Option<StatsSnapshot>>,
}

impl StatsPoller {
    pub fn new(
        transport: Rc<dyn HttpTransport>,
        page: Rc<dyn PageSurface>,
        event_loop: Rc<dyn EventLoop>,
        period: Duration,
    ) -> Self {
        Self {
            inner: Rc::new(PollerInner {
                transport,
                page,
                event_loop,
                period,
                latest: RefCell::new(None),
            }),
        }
    }

    pub fn start(&self) {
        let poller = self.clone();
        tracing::info!(period_ms = self.inner.period.as_millis() as u64, "stats poller started");
        self.inner.event_loop.set_interval(
            self.inner.period,
            Box::new(move || {
                let tick = poller.clone();
                poller.inner.event_loop.spawn(Box::pin(async move {
                    tick.refresh_now().await;
                }));
            }),
        );
    }

    /// One poll. Returns whether a snapshot was applied.
    pub async fn refresh_now(&self) -> bool {
        let response = match self.inner.transport.send(ApiRequest::get(STATS_PATH)).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(error = %error, "stats poll failed");
                return false;
            }
        };
        if !response.is_success_status() {
            tracing::warn!(status = response.status, "stats poll returned error status");
            return false;
        }
        let Some(snapshot) = StatsSnapshot::from_value(response.body) else {
            tracing::warn!("stats poll returned a non-object body");
            return false;
        };
        self.apply(snapshot);
        true
    }

    #[must_use]
    pub fn latest(&self) -> Option<StatsSnapshot> {
        self.inner.latest.borrow().clone()
    }

    fn apply(&self, snapshot: StatsSnapshot) {
        let mut bound = 0_usize;
        for (key, text) in snapshot.entries() {
            if self.inner.page.set_stat_text(key, &text) {
                bound += 1;
            }
        }
        tracing::debug!(keys = snapshot.len(), bound, "stats snapshot applied");
        *self.inner.latest.borrow_mut() = Some(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_text_renders_scalars() {
        assert_eq!(display_text(&json!(4)), "4");
        assert_eq!(display_text(&json!(12.0)), "12");
        assert_eq!(display_text(&json!(3.5)), "3.5");
        assert_eq!(display_text(&json!("0:05:12")), "0:05:12");
        assert_eq!(display_text(&Value::Null), "-");
    }

    #[test]
    fn snapshot_requires_an_object_and_keeps_every_key() {
        assert!(StatsSnapshot::from_value(json!([1, 2])).is_none());

        let snapshot = StatsSnapshot::from_value(json!({
            "total_devices": 4,
            "total_commands": 9,
            "last_routine": null,
        }))
        .expect("object");
        assert_eq!(snapshot.len(), 3);
        let entries: Vec<_> = snapshot.entries().collect();
        assert_eq!(
            entries,
            vec![
                ("last_routine", "-".to_string()),
                ("total_commands", "9".to_string()),
                ("total_devices", "4".to_string()),
            ]
        );
    }
}
