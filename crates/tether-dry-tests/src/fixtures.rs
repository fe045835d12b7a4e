// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Notification builders, a call recorder, and world setup helpers.
//!
//! Builders leave every body reference without user data; the
//! [`ScriptedEngine`] fills it in at delivery time, and
//! `PhysicsWorld::handle_notification` re-reads it from the engine.

use std::cell::RefCell;
use std::rc::Rc;

use tether_core::{
    BodyHandle, BodyRef, ContactNotification, ContactPoint, EntityId, Notification,
    PhysicsWorld, PreSolveNotification, SimConfig, Vec2,
};

use crate::engine::ScriptedEngine;

/// Contact notification between `a` and `b` with explicit flags.
pub fn contact(
    a: BodyHandle,
    b: BodyHandle,
    is_begin: bool,
    is_end: bool,
    sensor: bool,
) -> Notification {
    Notification::Contact(ContactNotification {
        body_a: BodyRef::orphan(a),
        body_b: BodyRef::orphan(b),
        contacts: if sensor {
            Vec::new()
        } else {
            vec![ContactPoint {
                normal: Vec2::UNIT_Y,
                ..ContactPoint::default()
            }]
        },
        is_begin,
        is_end,
        sensor,
    })
}

/// Non-sensor begin contact.
pub fn contact_begin(a: BodyHandle, b: BodyHandle) -> Notification {
    contact(a, b, true, false, false)
}

/// Non-sensor end contact.
pub fn contact_end(a: BodyHandle, b: BodyHandle) -> Notification {
    contact(a, b, false, true, false)
}

/// Sensor begin contact.
pub fn sensor_begin(a: BodyHandle, b: BodyHandle) -> Notification {
    contact(a, b, true, false, true)
}

/// Pre-solve with processing enabled.
pub fn pre_solve(a: BodyHandle, b: BodyHandle) -> Notification {
    Notification::PreSolve(PreSolveNotification {
        body_a: BodyRef::orphan(a),
        body_b: BodyRef::orphan(b),
        contacts: Vec::new(),
        processing_enabled: true,
    })
}

/// Body went to sleep.
pub fn sleep(body: BodyHandle) -> Notification {
    Notification::Sleep(BodyRef::orphan(body))
}

/// Shared append-only log for listener calls.
#[derive(Debug)]
pub struct Recorder<T> {
    calls: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            calls: Rc::clone(&self.calls),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T: Clone> Recorder<T> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one call.
    pub fn push(&self, call: T) {
        self.calls.borrow_mut().push(call);
    }

    /// Copy of every call so far.
    pub fn calls(&self) -> Vec<T> {
        self.calls.borrow().clone()
    }

    /// Number of calls so far.
    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }
}

/// A world over a [`ScriptedEngine`] with `n` entities, ids `1..=n`, each
/// owning one body at rest at `(i, 0)`.
///
/// Returns the world together with the `(entity, body)` pairs.
pub fn world_with_bodies(
    n: u32,
    config: SimConfig,
) -> (PhysicsWorld<ScriptedEngine>, Vec<(EntityId, BodyHandle)>) {
    let mut world = PhysicsWorld::new(ScriptedEngine::new(), config);
    let mut pairs = Vec::new();
    for i in 1..=n {
        let entity = EntityId(u64::from(i));
        let x = i32::try_from(i).unwrap_or(i32::MAX);
        let body = world.engine_mut().create_body(Vec2::from_ints(x, 0));
        world.register_entity(entity);
        if world.attach_body(entity, body).is_ok() {
            pairs.push((entity, body));
        }
    }
    (world, pairs)
}
