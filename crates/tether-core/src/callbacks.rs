// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-entity, per-kind callback lists.
//!
//! The table is a cheap-to-clone handle over shared state so that listeners
//! can capture it and (un)register from inside a dispatch pass. Dispatch works
//! on a snapshot of the list taken before the pass starts:
//! - a callback registered during a pass first runs for the next notification;
//! - a callback removed during a pass is skipped for the rest of that pass.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::ident::EntityId;
use crate::listener::{ListenerId, ListenerResult};
use crate::notification::{EventContext, EventKind};

/// Callback stored in an entity's list.
///
/// The first argument is the *other* entity of a pair notification, `None`
/// for single-body kinds.
pub type EntityCallback = dyn Fn(Option<EntityId>, &mut EventContext<'_>) -> ListenerResult;

pub(crate) type CallbackSnapshot = Vec<(ListenerId, Rc<EntityCallback>)>;

#[derive(Default)]
struct CallbackTableInner {
    lists: BTreeMap<(EntityId, EventKind), CallbackSnapshot>,
    next_id: u64,
}

/// Handle to the shared per-entity callback lists.
#[derive(Clone, Default)]
pub struct CallbackTable {
    inner: Rc<RefCell<CallbackTableInner>>,
}

impl core::fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("CallbackTable")
            .field("lists", &inner.lists.len())
            .field("next_id", &inner.next_id)
            .finish()
    }
}

impl CallbackTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `callback` to `entity`'s list for `kind`.
    pub fn on<F>(&self, entity: EntityId, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(Option<EntityId>, &mut EventContext<'_>) -> ListenerResult + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner
            .lists
            .entry((entity, kind))
            .or_default()
            .push((id, Rc::new(callback)));
        id
    }

    /// Registers a collision-begin callback that receives the other entity.
    pub fn on_collision_begin<F>(&self, entity: EntityId, callback: F) -> ListenerId
    where
        F: Fn(EntityId) -> ListenerResult + 'static,
    {
        self.on(entity, EventKind::CollisionBegin, pair_only(callback))
    }

    /// Registers a collision-end callback that receives the other entity.
    pub fn on_collision_end<F>(&self, entity: EntityId, callback: F) -> ListenerId
    where
        F: Fn(EntityId) -> ListenerResult + 'static,
    {
        self.on(entity, EventKind::CollisionEnd, pair_only(callback))
    }

    /// Removes one registration. Unknown ids are a no-op returning `false`.
    pub fn off(&self, entity: EntityId, kind: EventKind, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(list) = inner.lists.get_mut(&(entity, kind)) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        let removed = list.len() != before;
        if list.is_empty() {
            inner.lists.remove(&(entity, kind));
        }
        removed
    }

    /// Drops every list owned by `entity`; returns how many callbacks went.
    pub fn clear_entity(&self, entity: EntityId) -> usize {
        let mut inner = self.inner.borrow_mut();
        let mut removed = 0;
        inner.lists.retain(|(owner, _), list| {
            if *owner == entity {
                removed += list.len();
                false
            } else {
                true
            }
        });
        removed
    }

    /// Number of callbacks in `entity`'s list for `kind`.
    pub fn len(&self, entity: EntityId, kind: EventKind) -> usize {
        self.inner
            .borrow()
            .lists
            .get(&(entity, kind))
            .map_or(0, Vec::len)
    }

    /// Returns `true` when no entity has any callback.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().lists.is_empty()
    }

    pub(crate) fn snapshot(&self, entity: EntityId, kind: EventKind) -> CallbackSnapshot {
        self.inner
            .borrow()
            .lists
            .get(&(entity, kind))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn is_live(&self, entity: EntityId, kind: EventKind, id: ListenerId) -> bool {
        self.inner
            .borrow()
            .lists
            .get(&(entity, kind))
            .is_some_and(|list| list.iter().any(|(existing, _)| *existing == id))
    }
}

fn pair_only<F>(callback: F) -> impl Fn(Option<EntityId>, &mut EventContext<'_>) -> ListenerResult
where
    F: Fn(EntityId) -> ListenerResult + 'static,
{
    move |other: Option<EntityId>, _ctx: &mut EventContext<'_>| match other {
        Some(other) => callback(other),
        None => Ok(()),
    }
}
