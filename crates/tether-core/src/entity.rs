// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Registered entities and the engine handles they own.

use std::collections::BTreeMap;

use crate::ident::{BodyHandle, ColliderHandle, EntityId};
use crate::snapshot::FixedSnapshot;

/// Physics-facing state of one entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityRecord {
    pub(crate) snapshot: Option<FixedSnapshot>,
    pub(crate) body: Option<BodyHandle>,
    pub(crate) colliders: Vec<ColliderHandle>,
}

impl EntityRecord {
    /// Fixed-step snapshot, present once a body is attached.
    pub fn snapshot(&self) -> Option<&FixedSnapshot> {
        self.snapshot.as_ref()
    }

    /// Engine body owned by this entity.
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    /// Colliders owned by this entity, in attach order.
    pub fn colliders(&self) -> &[ColliderHandle] {
        &self.colliders
    }
}

/// Entities currently known to the sync layer.
///
/// Iteration is ordered by [`EntityId`] so transform sync visits entities in
/// the same order on every run.
#[derive(Clone, Debug, Default)]
pub struct EntityTable {
    records: BTreeMap<EntityId, EntityRecord>,
}

impl EntityTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id`. Returns `false` if it was already registered.
    pub fn insert(&mut self, id: EntityId) -> bool {
        if self.records.contains_key(&id) {
            return false;
        }
        self.records.insert(id, EntityRecord::default());
        true
    }

    /// Unregisters `id`, returning its record.
    pub fn remove(&mut self, id: EntityId) -> Option<EntityRecord> {
        self.records.remove(&id)
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    /// Record for `id`.
    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.records.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.records.get_mut(&id)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityRecord)> {
        self.records.iter().map(|(id, r)| (*id, r))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut EntityRecord)> {
        self.records.iter_mut().map(|(id, r)| (*id, r))
    }
}
