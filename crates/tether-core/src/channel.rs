// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Global physics event channel.
//!
//! Independent of per-entity callback lists, every correlated notification is
//! published here. Listeners subscribe by [`EventKind`]; a listener on
//! [`EventKind::Any`] receives every notification. Within one emission,
//! kind-specific listeners run first, then wildcard listeners, each group in
//! subscription order.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::warn;

use crate::listener::{invoke_isolated, DispatchReport, ListenerId, ListenerResult};
use crate::notification::{EventContext, EventKind};

/// Listener stored on the channel.
pub type ChannelListener = dyn Fn(&mut EventContext<'_>) -> ListenerResult;

type Subscribers = Vec<(ListenerId, Rc<ChannelListener>)>;

#[derive(Default)]
struct ChannelInner {
    listeners: BTreeMap<EventKind, Subscribers>,
    next_id: u64,
}

/// Snapshot of the subscribers relevant to one emission.
pub(crate) struct EmitPlan {
    kind: EventKind,
    specific: Subscribers,
    wildcard: Subscribers,
}

/// Handle to the shared global channel.
///
/// Clones share the same subscriber set.
#[derive(Clone, Default)]
pub struct EventChannel {
    inner: Rc<RefCell<ChannelInner>>,
}

impl core::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        let total: usize = inner.listeners.values().map(Vec::len).sum();
        f.debug_struct("EventChannel")
            .field("listeners", &total)
            .finish()
    }
}

impl EventChannel {
    /// Creates a channel with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `listener` to `kind`. Duplicates are not collapsed.
    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&mut EventContext<'_>) -> ListenerResult + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner
            .listeners
            .entry(kind)
            .or_default()
            .push((id, Rc::new(listener)));
        id
    }

    /// Removes one subscription. Unknown ids are a no-op returning `false`.
    pub fn unsubscribe(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(list) = inner.listeners.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        let removed = list.len() != before;
        if list.is_empty() {
            inner.listeners.remove(&kind);
        }
        removed
    }

    /// Publishes `event` to the listeners of its kind and to wildcard listeners.
    ///
    /// Listener faults are logged and counted; they never escape.
    pub fn emit(&self, event: &mut EventContext<'_>) -> DispatchReport {
        let plan = self.plan(event.kind());
        self.run(plan, event)
    }

    /// Drops every subscription on every kind.
    pub fn clear_all_listeners(&self) {
        self.inner.borrow_mut().listeners.clear();
    }

    /// Number of listeners subscribed to exactly `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Returns `true` if at least one listener is subscribed to exactly `kind`.
    pub fn has_listeners(&self, kind: EventKind) -> bool {
        self.listener_count(kind) > 0
    }

    pub(crate) fn plan(&self, kind: EventKind) -> EmitPlan {
        let inner = self.inner.borrow();
        let get = |k: EventKind| inner.listeners.get(&k).cloned().unwrap_or_default();
        EmitPlan {
            kind,
            specific: if kind == EventKind::Any {
                Vec::new()
            } else {
                get(kind)
            },
            wildcard: get(EventKind::Any),
        }
    }

    pub(crate) fn run(&self, plan: EmitPlan, event: &mut EventContext<'_>) -> DispatchReport {
        let mut report = DispatchReport::default();
        let groups = [(plan.kind, plan.specific), (EventKind::Any, plan.wildcard)];
        for (subscribed, listeners) in groups {
            for (id, listener) in listeners {
                if !self.is_live(subscribed, id) {
                    continue;
                }
                report.invoked += 1;
                if let Err(fault) = invoke_isolated(|| listener(event)) {
                    report.faulted += 1;
                    warn!(
                        kind = %event.kind(),
                        subscribed = %subscribed,
                        error = %fault,
                        "physics event listener failed"
                    );
                }
            }
        }
        report
    }

    fn is_live(&self, kind: EventKind, id: ListenerId) -> bool {
        self.inner
            .borrow()
            .listeners
            .get(&kind)
            .is_some_and(|list| list.iter().any(|(existing, _)| *existing == id))
    }
}
