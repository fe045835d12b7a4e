// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Capability traits an external rigid-body engine adapter implements.
//!
//! The sync layer never solves anything itself. It needs two capabilities:
//! stepping by a fixed increment while forwarding notifications
//! ([`Stepper`]), and reading/writing per-body state ([`BodyAccess`]).

use tether_math::{Fx, Vec2};

use crate::ident::{BodyHandle, EntityId};
use crate::notification::Notification;
use crate::snapshot::Pose;

/// Receives notifications synchronously from inside [`Stepper::step`].
///
/// The notification is lent mutably so that listeners can write back into it
/// (for example the pre-solve `processing_enabled` flag). Adapters read any
/// such flag after `deliver` returns.
pub trait NotificationSink {
    /// Handles one notification.
    fn deliver(&mut self, notification: &mut Notification);
}

impl<F> NotificationSink for F
where
    F: FnMut(&mut Notification),
{
    fn deliver(&mut self, notification: &mut Notification) {
        self(notification);
    }
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardSink;

impl NotificationSink for DiscardSink {
    fn deliver(&mut self, _notification: &mut Notification) {}
}

/// Advances the simulation.
pub trait Stepper {
    /// Failure raised by a single step.
    type Error: std::error::Error + 'static;

    /// Advances the simulation by exactly `dt`.
    ///
    /// Notifications raised during the step must be passed to `sink` before
    /// this call returns.
    ///
    /// # Errors
    ///
    /// Adapter-specific; the driver propagates it unchanged.
    fn step(&mut self, dt: Fx, sink: &mut dyn NotificationSink) -> Result<(), Self::Error>;
}

/// Per-body state access.
///
/// Getters return `None` for handles the engine does not know (for example a
/// body destroyed since it was attached). Setters return `false` in that case.
pub trait BodyAccess {
    /// Body position.
    fn position(&self, body: BodyHandle) -> Option<Vec2>;
    /// Body rotation in radians.
    fn rotation(&self, body: BodyHandle) -> Option<Fx>;
    /// Moves a body.
    fn set_position(&mut self, body: BodyHandle, position: Vec2) -> bool;
    /// Rotates a body.
    fn set_rotation(&mut self, body: BodyHandle, rotation: Fx) -> bool;
    /// Linear velocity.
    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec2>;
    /// Sets linear velocity.
    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) -> bool;
    /// Angular velocity in radians per second.
    fn angular_velocity(&self, body: BodyHandle) -> Option<Fx>;
    /// Sets angular velocity.
    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Fx) -> bool;
    /// Entity back-reference stored on the body.
    fn user_data(&self, body: BodyHandle) -> Option<EntityId>;
    /// Replaces the entity back-reference stored on the body.
    fn set_user_data(&mut self, body: BodyHandle, owner: Option<EntityId>) -> bool;

    /// Position and rotation together.
    fn pose(&self, body: BodyHandle) -> Option<Pose> {
        Some(Pose::new(self.position(body)?, self.rotation(body)?))
    }
}

/// A full engine adapter.
pub trait PhysicsEngine: Stepper + BodyAccess {}

impl<T> PhysicsEngine for T where T: Stepper + BodyAccess {}
