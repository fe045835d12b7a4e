// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reference engine adapter: balls falling onto a ground line at `y = 0`.
//!
//! Per step, for every awake ball: apply gravity, integrate, then test the
//! ball against the ground. A new overlap raises a begin contact; every
//! overlap raises a pre-solve whose veto skips the bounce; a resolved
//! overlap raises a post-solve. Leaving the ground band raises an end
//! contact. A ball that stops bouncing falls asleep until its velocity is
//! set again.

use std::collections::{BTreeMap, BTreeSet};

use tether_core::{
    BodyAccess, BodyHandle, BodyRef, ContactNotification, ContactPoint, EntityId, Fx,
    Notification, NotificationSink, PostSolveNotification, PreSolveNotification, Stepper, Vec2,
};
use thiserror::Error;

/// Step failure of the ballistic adapter.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BallisticError {
    /// A body's position saturated the fixed-point range.
    #[error("{0} diverged out of the representable range")]
    Diverged(BodyHandle),
}

#[derive(Clone, Copy, Debug)]
struct Ball {
    position: Vec2,
    rotation: Fx,
    linear_velocity: Vec2,
    angular_velocity: Fx,
    radius: Fx,
    user_data: Option<EntityId>,
    fixed: bool,
    asleep: bool,
}

impl Ball {
    fn at(position: Vec2, radius: Fx, fixed: bool) -> Self {
        Self {
            position,
            rotation: Fx::ZERO,
            linear_velocity: Vec2::ZERO,
            angular_velocity: Fx::ZERO,
            radius,
            user_data: None,
            fixed,
            asleep: false,
        }
    }

    fn body_ref(&self, handle: BodyHandle) -> BodyRef {
        BodyRef {
            handle,
            user_data: self.user_data,
        }
    }
}

/// Ballistic engine with one static ground body.
#[derive(Debug)]
pub struct BallisticEngine {
    gravity: Vec2,
    restitution: Fx,
    settle_speed: Fx,
    bodies: BTreeMap<BodyHandle, Ball>,
    ground: BodyHandle,
    touching: BTreeSet<BodyHandle>,
    woken: Vec<BodyHandle>,
    next_body: u64,
}

impl BallisticEngine {
    /// Creates an engine whose only body is the ground.
    pub fn new(gravity: Vec2) -> Self {
        let ground = BodyHandle(0);
        let mut bodies = BTreeMap::new();
        bodies.insert(ground, Ball::at(Vec2::ZERO, Fx::ZERO, true));
        Self {
            gravity,
            restitution: Fx::from_ratio(1, 2),
            settle_speed: Fx::from_ratio(1, 2),
            bodies,
            ground,
            touching: BTreeSet::new(),
            woken: Vec::new(),
            next_body: 0,
        }
    }

    /// Fraction of impact speed kept after a bounce.
    pub fn with_restitution(mut self, restitution: Fx) -> Self {
        self.restitution = restitution;
        self
    }

    /// Handle of the static ground body.
    pub fn ground(&self) -> BodyHandle {
        self.ground
    }

    /// Adds a dynamic ball.
    pub fn spawn_ball(&mut self, position: Vec2, radius: Fx) -> BodyHandle {
        self.next_body += 1;
        let handle = BodyHandle(self.next_body);
        self.bodies.insert(handle, Ball::at(position, radius, false));
        handle
    }

    /// Whether `body` currently overlaps the ground band.
    pub fn is_touching(&self, body: BodyHandle) -> bool {
        self.touching.contains(&body)
    }

    /// Whether `body` is asleep.
    pub fn is_asleep(&self, body: BodyHandle) -> bool {
        self.bodies.get(&body).is_some_and(|b| b.asleep)
    }

    fn ground_ref(&self) -> BodyRef {
        self.bodies
            .get(&self.ground)
            .map_or(BodyRef::orphan(self.ground), |g| g.body_ref(self.ground))
    }

    fn integrate(&mut self, handle: BodyHandle, dt: Fx) -> Result<Option<Ball>, BallisticError> {
        let gravity = self.gravity;
        let Some(ball) = self.bodies.get_mut(&handle) else {
            return Ok(None);
        };
        if ball.fixed || ball.asleep {
            return Ok(None);
        }
        ball.linear_velocity += gravity * dt;
        ball.position += ball.linear_velocity * dt;
        ball.rotation += ball.angular_velocity * dt;
        let saturated = |v: Fx| v == Fx::MAX || v == Fx::MIN;
        if saturated(ball.position.x) || saturated(ball.position.y) {
            return Err(BallisticError::Diverged(handle));
        }
        Ok(Some(*ball))
    }

    fn collide(&mut self, handle: BodyHandle, ball: Ball, sink: &mut dyn NotificationSink) {
        let overlapping = ball.position.y < ball.radius && ball.position.y > -ball.radius;
        let (body_a, body_b) = (ball.body_ref(handle), self.ground_ref());
        let point = ContactPoint {
            position: Vec2::new(ball.position.x, Fx::ZERO),
            normal: -Vec2::UNIT_Y,
            normal_impulse: Fx::ZERO,
            tangent_impulse: Fx::ZERO,
            separation: ball.position.y - ball.radius,
        };

        if !overlapping {
            if self.touching.remove(&handle) {
                sink.deliver(&mut Notification::Contact(ContactNotification {
                    body_a,
                    body_b,
                    contacts: Vec::new(),
                    is_begin: false,
                    is_end: true,
                    sensor: false,
                }));
            }
            return;
        }

        if self.touching.insert(handle) {
            sink.deliver(&mut Notification::Contact(ContactNotification {
                body_a,
                body_b,
                contacts: vec![point],
                is_begin: true,
                is_end: false,
                sensor: false,
            }));
        }

        let mut pre = Notification::PreSolve(PreSolveNotification {
            body_a,
            body_b,
            contacts: vec![point],
            processing_enabled: true,
        });
        sink.deliver(&mut pre);
        let enabled = matches!(&pre, Notification::PreSolve(p) if p.processing_enabled);
        if !enabled {
            return;
        }

        let restitution = self.restitution;
        let settle_speed = self.settle_speed;
        let Some(ball) = self.bodies.get_mut(&handle) else {
            return;
        };
        let impact = ball.linear_velocity.y;
        ball.position.y = ball.radius;
        let rebound = -impact * restitution;
        ball.linear_velocity.y = if rebound < settle_speed {
            Fx::ZERO
        } else {
            rebound
        };
        let settled = ball.linear_velocity.y.is_zero();
        if settled {
            ball.linear_velocity.x = Fx::ZERO;
            ball.angular_velocity = Fx::ZERO;
        }
        let body_a = ball.body_ref(handle);

        sink.deliver(&mut Notification::PostSolve(PostSolveNotification {
            body_a,
            body_b,
            contacts: vec![ContactPoint {
                normal_impulse: ball.linear_velocity.y - impact,
                separation: Fx::ZERO,
                ..point
            }],
        }));
        if settled {
            ball.asleep = true;
            sink.deliver(&mut Notification::Sleep(body_a));
        }
    }
}

impl Stepper for BallisticEngine {
    type Error = BallisticError;

    fn step(&mut self, dt: Fx, sink: &mut dyn NotificationSink) -> Result<(), Self::Error> {
        sink.deliver(&mut Notification::StepBegin { dt });
        for handle in std::mem::take(&mut self.woken) {
            if let Some(ball) = self.bodies.get(&handle) {
                sink.deliver(&mut Notification::Wake(ball.body_ref(handle)));
            }
        }
        let handles: Vec<BodyHandle> = self.bodies.keys().copied().collect();
        for handle in handles {
            if let Some(ball) = self.integrate(handle, dt)? {
                self.collide(handle, ball, sink);
            }
        }
        sink.deliver(&mut Notification::StepEnd { dt });
        Ok(())
    }
}

impl BodyAccess for BallisticEngine {
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
        let Some(ball) = self.bodies.get_mut(&body) else {
            return false;
        };
        ball.linear_velocity = velocity;
        if ball.asleep && !ball.fixed {
            ball.asleep = false;
            self.woken.push(body);
        }
        true
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tether_core::EventKind;

    use super::*;

    fn kinds(engine: &mut BallisticEngine, steps: usize) -> Vec<EventKind> {
        let mut seen = Vec::new();
        let mut sink = |n: &mut Notification| seen.push(n.kind().unwrap());
        for _ in 0..steps {
            engine.step(Fx::from_ratio(1, 60), &mut sink).unwrap();
        }
        seen.retain(|k| !matches!(k, EventKind::StepBegin | EventKind::StepEnd));
        seen
    }

    #[test]
    fn dropped_ball_bounces_and_settles() {
        let mut engine = BallisticEngine::new(Vec2::new(Fx::ZERO, Fx::from_f64(-9.81)));
        let ball = engine.spawn_ball(Vec2::from_ints(0, 2), Fx::from_ratio(1, 2));
        let seen = kinds(&mut engine, 600);

        assert_eq!(seen.first(), Some(&EventKind::CollisionBegin));
        assert!(seen.contains(&EventKind::PostSolve));
        assert!(seen.contains(&EventKind::CollisionEnd));
        assert_eq!(seen.last(), Some(&EventKind::BodySleep));
        assert!(engine.is_asleep(ball));
        assert_eq!(engine.position(ball).unwrap().y, Fx::from_ratio(1, 2));

        engine.set_linear_velocity(ball, Vec2::from_ints(0, 3));
        assert!(!engine.is_asleep(ball));
        assert_eq!(kinds(&mut engine, 1).first(), Some(&EventKind::BodyWake));
    }

    #[test]
    fn vetoed_pre_solve_lets_the_ball_through() {
        let mut engine = BallisticEngine::new(Vec2::new(Fx::ZERO, Fx::from_int(-10)));
        let ball = engine.spawn_ball(Vec2::from_ints(0, 1), Fx::from_ratio(1, 4));
        let mut sink = |n: &mut Notification| {
            if let Notification::PreSolve(p) = n {
                p.processing_enabled = false;
            }
        };
        for _ in 0..120 {
            engine.step(Fx::from_ratio(1, 60), &mut sink).unwrap();
        }
        assert!(engine.position(ball).unwrap().y < -Fx::ONE);
        assert!(!engine.is_touching(ball));
    }
}
