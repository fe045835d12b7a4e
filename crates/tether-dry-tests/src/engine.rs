// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scripted engine adapter for driving the sync layer in tests.

use std::collections::BTreeMap;

use tether_core::{
    BodyAccess, BodyHandle, EntityId, Fx, Notification, NotificationSink, Stepper, Vec2,
};
use thiserror::Error;

/// Failure injected by [`ScriptedEngine::fail_on_step`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("scripted failure at step {step}")]
pub struct ScriptedStepError {
    /// Zero-based index of the step that failed.
    pub step: usize,
}

/// State of one scripted body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScriptedBody {
    /// Position.
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: Fx,
    /// Linear velocity, integrated every step.
    pub linear_velocity: Vec2,
    /// Angular velocity, integrated every step.
    pub angular_velocity: Fx,
    /// Entity back-reference.
    pub user_data: Option<EntityId>,
}

/// Deterministic [`tether_core::PhysicsEngine`] with no collision detection.
///
/// Each successful step:
/// 1. records `dt`;
/// 2. delivers `StepBegin` if step events are enabled;
/// 3. integrates every body's velocities (explicit Euler);
/// 4. delivers every queued notification, refreshing each body reference
///    from the body's current user data first;
/// 5. delivers `StepEnd` if step events are enabled.
///
/// Delivered notifications are kept (after listeners ran) so tests can read
/// back flags such as the pre-solve veto.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    bodies: BTreeMap<BodyHandle, ScriptedBody>,
    next_body: u64,
    step_log: Vec<Fx>,
    queued: Vec<Notification>,
    delivered: Vec<Notification>,
    attempts: usize,
    fail_on_step: Option<usize>,
    step_events: bool,
}

impl ScriptedEngine {
    /// Create an engine with no bodies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also deliver `StepBegin`/`StepEnd` around every step.
    pub fn with_step_events(mut self) -> Self {
        self.step_events = true;
        self
    }

    /// Create a body at rest at `position`.
    pub fn create_body(&mut self, position: Vec2) -> BodyHandle {
        self.insert_body(ScriptedBody {
            position,
            ..ScriptedBody::default()
        })
    }

    /// Create a body with explicit state.
    pub fn insert_body(&mut self, body: ScriptedBody) -> BodyHandle {
        self.next_body += 1;
        let handle = BodyHandle(self.next_body);
        self.bodies.insert(handle, body);
        handle
    }

    /// Destroy a body; later accesses report it as unknown.
    pub fn remove_body(&mut self, body: BodyHandle) -> bool {
        self.bodies.remove(&body).is_some()
    }

    /// State of `body`.
    pub fn body(&self, body: BodyHandle) -> Option<&ScriptedBody> {
        self.bodies.get(&body)
    }

    /// Deliver `notification` during the next successful step.
    pub fn queue(&mut self, notification: Notification) {
        self.queued.push(notification);
    }

    /// Fail the step with zero-based index `step` (counting attempts).
    pub fn fail_on_step(&mut self, step: usize) {
        self.fail_on_step = Some(step);
    }

    /// `dt` of every successful step, in order.
    pub fn step_log(&self) -> &[Fx] {
        &self.step_log
    }

    /// Notifications delivered so far, as left by the listeners.
    pub fn delivered(&self) -> &[Notification] {
        &self.delivered
    }
}

impl Stepper for ScriptedEngine {
    type Error = ScriptedStepError;

    fn step(&mut self, dt: Fx, sink: &mut dyn NotificationSink) -> Result<(), Self::Error> {
        let index = self.attempts;
        self.attempts += 1;
        if self.fail_on_step == Some(index) {
            return Err(ScriptedStepError { step: index });
        }
        self.step_log.push(dt);

        if self.step_events {
            sink.deliver(&mut Notification::StepBegin { dt });
        }
        for body in self.bodies.values_mut() {
            body.position += body.linear_velocity * dt;
            body.rotation += body.angular_velocity * dt;
        }
        for mut notification in std::mem::take(&mut self.queued) {
            notification.for_each_body_mut(|r| {
                r.user_data = self.bodies.get(&r.handle).and_then(|b| b.user_data);
            });
            sink.deliver(&mut notification);
            self.delivered.push(notification);
        }
        if self.step_events {
            sink.deliver(&mut Notification::StepEnd { dt });
        }
        Ok(())
    }
}

impl BodyAccess for ScriptedEngine {
    fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&body).map(|b| b.position)
    }

    fn rotation(&self, body: BodyHandle) -> Option<Fx> {
        self.bodies.get(&body).map(|b| b.rotation)
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec2) -> bool {
        self.bodies
            .get_mut(&body)
            .map(|b| b.position = position)
            .is_some()
    }

    fn set_rotation(&mut self, body: BodyHandle, rotation: Fx) -> bool {
        self.bodies
            .get_mut(&body)
            .map(|b| b.rotation = rotation)
            .is_some()
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&body).map(|b| b.linear_velocity)
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) -> bool {
        self.bodies
            .get_mut(&body)
            .map(|b| b.linear_velocity = velocity)
            .is_some()
    }

    fn angular_velocity(&self, body: BodyHandle) -> Option<Fx> {
        self.bodies.get(&body).map(|b| b.angular_velocity)
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Fx) -> bool {
        self.bodies
            .get_mut(&body)
            .map(|b| b.angular_velocity = velocity)
            .is_some()
    }

    fn user_data(&self, body: BodyHandle) -> Option<EntityId> {
        self.bodies.get(&body).and_then(|b| b.user_data)
    }

    fn set_user_data(&mut self, body: BodyHandle, owner: Option<EntityId>) -> bool {
        self.bodies
            .get_mut(&body)
            .map(|b| b.user_data = owner)
            .is_some()
    }
}
