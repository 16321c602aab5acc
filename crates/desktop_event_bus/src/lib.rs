//! Synchronous publish/subscribe bus used for desktop-wide notification fan-out.
//!
//! Topics are plain strings (`window:opened`, `dock:updateIndicator`, ...) and payloads are JSON
//! values. Delivery is same-thread and synchronous: every listener registered for a topic at the
//! time of [`EventBus::emit`] runs, in subscription order, before `emit` returns. A listener that
//! fails (returns an error or panics) is reported and skipped; the remaining listeners still run.
//!
//! The bus is a cheap, cloneable handle. Listeners may subscribe, unsubscribe, or emit from inside
//! a callback.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    rc::Rc,
};

use leptos::logging;
use serde_json::Value;
use thiserror::Error;

/// Result type returned by bus listeners.
pub type ListenerResult = Result<(), ListenerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
/// Failure reported by a single listener. It never interrupts delivery to other listeners.
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    /// Creates a listener error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Handle returned by [`EventBus::on`] / [`EventBus::once`], used to unsubscribe.
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Outcome of a single [`EventBus::emit`] call.
pub struct EmitReport {
    /// Listeners that completed successfully.
    pub delivered: usize,
    /// Listeners that returned an error or panicked.
    pub failed: usize,
}

type Callback = Rc<dyn Fn(&Value) -> ListenerResult>;

struct Subscription {
    id: ListenerId,
    once: bool,
    callback: Callback,
}

#[derive(Default)]
struct BusState {
    next_listener_id: u64,
    topics: HashMap<String, Vec<Subscription>>,
}

#[derive(Clone, Default)]
/// Shared handle to a topic-keyed listener registry.
pub struct EventBus {
    state: Rc<RefCell<BusState>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        let mut topics = state.topics.keys().cloned().collect::<Vec<_>>();
        topics.sort();
        f.debug_struct("EventBus").field("topics", &topics).finish()
    }
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for every future emission of `event`.
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Value) -> ListenerResult + 'static,
    {
        self.subscribe(event.into(), false, Rc::new(listener))
    }

    /// Registers `listener` for the next emission of `event` only.
    pub fn once<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Value) -> ListenerResult + 'static,
    {
        self.subscribe(event.into(), true, Rc::new(listener))
    }

    /// Removes a listener. Returns `false` when it was not registered for `event`.
    pub fn off(&self, event: &str, listener_id: ListenerId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(subscriptions) = state.topics.get_mut(event) else {
            return false;
        };
        let before = subscriptions.len();
        subscriptions.retain(|subscription| subscription.id != listener_id);
        let removed = subscriptions.len() != before;
        if subscriptions.is_empty() {
            state.topics.remove(event);
        }
        removed
    }

    /// Delivers `payload` to every listener of `event` in subscription order.
    ///
    /// One-shot listeners are unregistered before any callback runs, so a nested emit of the same
    /// topic cannot deliver to them twice.
    pub fn emit(&self, event: &str, payload: &Value) -> EmitReport {
        let listeners = {
            let mut state = self.state.borrow_mut();
            let Some(subscriptions) = state.topics.get_mut(event) else {
                return EmitReport::default();
            };
            let snapshot = subscriptions
                .iter()
                .map(|subscription| (subscription.id, subscription.callback.clone()))
                .collect::<Vec<_>>();
            subscriptions.retain(|subscription| !subscription.once);
            if subscriptions.is_empty() {
                state.topics.remove(event);
            }
            snapshot
        };

        let mut report = EmitReport::default();
        for (listener_id, callback) in listeners {
            match catch_unwind(AssertUnwindSafe(|| callback(payload))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(err)) => {
                    report.failed += 1;
                    logging::warn!("bus listener {listener_id} on `{event}` failed: {err}");
                }
                Err(_) => {
                    report.failed += 1;
                    logging::warn!("bus listener {listener_id} on `{event}` panicked");
                }
            }
        }
        report
    }

    /// Number of listeners currently registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.state
            .borrow()
            .topics
            .get(event)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn subscribe(&self, event: String, once: bool, callback: Callback) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener_id = state.next_listener_id.saturating_add(1);
        let id = ListenerId(state.next_listener_id);
        state.topics.entry(event).or_default().push(Subscription {
            id,
            once,
            callback,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn recorder(bus: &EventBus, event: &str, tag: &'static str, log: &Rc<RefCell<Vec<String>>>) {
        let log = log.clone();
        bus.on(event, move |payload| {
            log.borrow_mut().push(format!("{tag}:{payload}"));
            Ok(())
        });
    }

    #[test]
    fn listeners_run_in_subscription_order_before_emit_returns() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        recorder(&bus, "window:focused", "a", &log);
        recorder(&bus, "window:focused", "b", &log);
        recorder(&bus, "window:closed", "c", &log);

        let report = bus.emit("window:focused", &json!(7));

        assert_eq!(report.delivered, 2);
        assert_eq!(*log.borrow(), vec!["a:7".to_string(), "b:7".to_string()]);
    }

    #[test]
    fn once_listener_fires_a_single_time() {
        let bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        bus.once("window:opened", move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        bus.emit("window:opened", &Value::Null);
        bus.emit("window:opened", &Value::Null);

        assert_eq!(*hits.borrow(), 1);
        assert_eq!(bus.listener_count("window:opened"), 0);
    }

    #[test]
    fn off_removes_only_the_named_listener() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first_log = log.clone();
        let first = bus.on("tick", move |_| {
            first_log.borrow_mut().push("first".to_string());
            Ok(())
        });
        recorder(&bus, "tick", "second", &log);

        assert!(bus.off("tick", first));
        assert!(!bus.off("tick", first));
        assert!(!bus.off("other", first));
        bus.emit("tick", &json!(1));

        assert_eq!(*log.borrow(), vec!["second:1".to_string()]);
    }

    #[test]
    fn failing_listeners_do_not_block_later_subscribers() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.on("window:resize", |_| Err(ListenerError::new("editor reflow failed")));
        bus.on("window:resize", |_| panic!("listener bug"));
        recorder(&bus, "window:resize", "late", &log);

        let report = bus.emit("window:resize", &json!({ "width": 400 }));

        assert_eq!(report, EmitReport { delivered: 1, failed: 2 });
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn listeners_may_reenter_the_bus() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        recorder(&bus, "dock:updateIndicator", "dock", &log);
        let inner = bus.clone();
        bus.on("window:closed", move |payload| {
            inner.emit("dock:updateIndicator", payload);
            inner.on("window:closed", |_| Ok(()));
            Ok(())
        });

        let report = bus.emit("window:closed", &json!("calc"));

        assert_eq!(report.delivered, 1);
        assert_eq!(*log.borrow(), vec!["dock:\"calc\"".to_string()]);
        assert_eq!(bus.listener_count("window:closed"), 2);
    }

    #[test]
    fn emit_without_listeners_is_a_noop() {
        let bus = EventBus::new();
        assert_eq!(bus.emit("nobody", &Value::Null), EmitReport::default());
    }
}
