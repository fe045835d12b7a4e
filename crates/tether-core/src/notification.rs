// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine-originated notifications and the event kinds they map to.
//!
//! Engine adapters translate their native callbacks into [`Notification`]
//! values. The set is closed: the correlator handles every variant in a single
//! `match`, and listeners subscribe by [`EventKind`].

use core::fmt;

use tether_math::{Fx, Vec2};
use thiserror::Error;

use crate::ident::{BodyHandle, EntityId, JointHandle};

/// A body handle together with the back-reference the engine stored for it.
///
/// Adapters fill `user_data` from the body's user-data slot at emission time.
/// The correlator treats it as a weak identifier and re-checks it against the
/// entity table before use.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BodyRef {
    /// Engine handle of the body.
    pub handle: BodyHandle,
    /// Entity the body claims to belong to, if any.
    pub user_data: Option<EntityId>,
}

impl BodyRef {
    /// Creates a reference with a back-reference to `owner`.
    pub const fn owned(handle: BodyHandle, owner: EntityId) -> Self {
        Self {
            handle,
            user_data: Some(owner),
        }
    }

    /// Creates a reference to a body that has no owning entity.
    pub const fn orphan(handle: BodyHandle) -> Self {
        Self {
            handle,
            user_data: None,
        }
    }
}

/// One point of a contact manifold.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ContactPoint {
    /// World-space contact position.
    pub position: Vec2,
    /// Contact normal pointing from body A to body B.
    pub normal: Vec2,
    /// Impulse applied along the normal.
    pub normal_impulse: Fx,
    /// Impulse applied along the tangent.
    pub tangent_impulse: Fx,
    /// Signed separation (negative while penetrating).
    pub separation: Fx,
}

/// Collision or sensor begin/end notification.
///
/// Exactly one of `is_begin`/`is_end` must be set; anything else is a
/// contract violation by the engine adapter.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ContactNotification {
    /// First body of the pair.
    pub body_a: BodyRef,
    /// Second body of the pair.
    pub body_b: BodyRef,
    /// Contact manifold (empty for sensors).
    pub contacts: Vec<ContactPoint>,
    /// The pair started touching.
    pub is_begin: bool,
    /// The pair stopped touching.
    pub is_end: bool,
    /// At least one of the colliders is a sensor.
    pub sensor: bool,
}

/// Raised before the solver resolves a touching pair.
///
/// Clearing `processing_enabled` vetoes the collision response for this pair
/// in the current step; the adapter reads it back after dispatch returns.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PreSolveNotification {
    /// First body of the pair.
    pub body_a: BodyRef,
    /// Second body of the pair.
    pub body_b: BodyRef,
    /// Contact manifold about to be solved.
    pub contacts: Vec<ContactPoint>,
    /// Whether the solver should respond to this contact.
    pub processing_enabled: bool,
}

/// Raised after the solver resolved a touching pair.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PostSolveNotification {
    /// First body of the pair.
    pub body_a: BodyRef,
    /// Second body of the pair.
    pub body_b: BodyRef,
    /// Contact manifold with solved impulses.
    pub contacts: Vec<ContactPoint>,
}

/// A joint exceeded its break threshold.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct JointBreakNotification {
    /// The broken joint.
    pub joint: JointHandle,
    /// First attached body.
    pub body_a: BodyRef,
    /// Second attached body.
    pub body_b: BodyRef,
}

/// A ray query hit a body.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RaycastHit {
    /// The body that was hit.
    pub body: BodyRef,
    /// World-space hit point.
    pub point: Vec2,
    /// Surface normal at the hit point.
    pub normal: Vec2,
    /// Fraction along the ray, `0` at the origin and `1` at the end.
    pub fraction: Fx,
}

/// Closed set of notifications an engine adapter can deliver.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Notification {
    /// Collision or sensor begin/end.
    Contact(ContactNotification),
    /// Pre-solve with a mutable veto flag.
    PreSolve(PreSolveNotification),
    /// Post-solve with final impulses.
    PostSolve(PostSolveNotification),
    /// A body fell asleep.
    Sleep(BodyRef),
    /// A body woke up.
    Wake(BodyRef),
    /// A joint broke.
    JointBreak(JointBreakNotification),
    /// A fixed step is about to run.
    StepBegin {
        /// Increment of the step.
        dt: Fx,
    },
    /// A fixed step finished.
    StepEnd {
        /// Increment of the step.
        dt: Fx,
    },
    /// A ray query hit a body.
    RaycastHit(RaycastHit),
}

/// Contact notification whose begin/end flags are both set or both clear.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("malformed contact notification (is_begin={is_begin}, is_end={is_end})")]
pub struct MalformedNotification {
    /// Value of the begin flag.
    pub is_begin: bool,
    /// Value of the end flag.
    pub is_end: bool,
}

/// The bodies a notification refers to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Participants {
    /// No bodies (step boundaries).
    None,
    /// A single body.
    One(BodyRef),
    /// A pair of bodies.
    Pair(BodyRef, BodyRef),
}

impl Notification {
    /// Event kind used for subscription lookup.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedNotification`] for a contact whose begin/end flags
    /// are not exactly one-hot.
    pub fn kind(&self) -> Result<EventKind, MalformedNotification> {
        Ok(match self {
            Self::Contact(c) => match (c.is_begin, c.is_end, c.sensor) {
                (true, false, false) => EventKind::CollisionBegin,
                (false, true, false) => EventKind::CollisionEnd,
                (true, false, true) => EventKind::SensorBegin,
                (false, true, true) => EventKind::SensorEnd,
                (is_begin, is_end, _) => return Err(MalformedNotification { is_begin, is_end }),
            },
            Self::PreSolve(_) => EventKind::PreSolve,
            Self::PostSolve(_) => EventKind::PostSolve,
            Self::Sleep(_) => EventKind::BodySleep,
            Self::Wake(_) => EventKind::BodyWake,
            Self::JointBreak(_) => EventKind::JointBreak,
            Self::StepBegin { .. } => EventKind::StepBegin,
            Self::StepEnd { .. } => EventKind::StepEnd,
            Self::RaycastHit(_) => EventKind::RaycastHit,
        })
    }

    /// Bodies referenced by this notification.
    pub fn participants(&self) -> Participants {
        match self {
            Self::Contact(ContactNotification { body_a, body_b, .. })
            | Self::PreSolve(PreSolveNotification { body_a, body_b, .. })
            | Self::PostSolve(PostSolveNotification { body_a, body_b, .. })
            | Self::JointBreak(JointBreakNotification { body_a, body_b, .. }) => {
                Participants::Pair(*body_a, *body_b)
            }
            Self::Sleep(body) | Self::Wake(body) | Self::RaycastHit(RaycastHit { body, .. }) => {
                Participants::One(*body)
            }
            Self::StepBegin { .. } | Self::StepEnd { .. } => Participants::None,
        }
    }

    /// Visits every body reference mutably.
    ///
    /// Adapters that queue notifications use this to refresh back-references
    /// from the engine's user-data slots right before delivery.
    pub fn for_each_body_mut(&mut self, mut f: impl FnMut(&mut BodyRef)) {
        match self {
            Self::Contact(ContactNotification { body_a, body_b, .. })
            | Self::PreSolve(PreSolveNotification { body_a, body_b, .. })
            | Self::PostSolve(PostSolveNotification { body_a, body_b, .. })
            | Self::JointBreak(JointBreakNotification { body_a, body_b, .. }) => {
                f(body_a);
                f(body_b);
            }
            Self::Sleep(body) | Self::Wake(body) | Self::RaycastHit(RaycastHit { body, .. }) => {
                f(body);
            }
            Self::StepBegin { .. } | Self::StepEnd { .. } => {}
        }
    }

    /// Contact manifold, empty for kinds without contacts.
    pub fn contacts(&self) -> &[ContactPoint] {
        match self {
            Self::Contact(ContactNotification { contacts, .. })
            | Self::PreSolve(PreSolveNotification { contacts, .. })
            | Self::PostSolve(PostSolveNotification { contacts, .. }) => contacts,
            _ => &[],
        }
    }
}

/// Subscription key for per-entity callback lists and the global channel.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum EventKind {
    /// Channel-only wildcard: receives every notification.
    Any,
    /// Two non-sensor colliders started touching.
    CollisionBegin,
    /// Two non-sensor colliders stopped touching.
    CollisionEnd,
    /// A body entered a sensor.
    SensorBegin,
    /// A body left a sensor.
    SensorEnd,
    /// Contact about to be solved.
    PreSolve,
    /// Contact solved.
    PostSolve,
    /// Body fell asleep.
    BodySleep,
    /// Body woke up.
    BodyWake,
    /// Joint broke.
    JointBreak,
    /// Fixed step starting.
    StepBegin,
    /// Fixed step finished.
    StepEnd,
    /// Ray query hit.
    RaycastHit,
}

impl EventKind {
    /// Stable label used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "physics/any",
            Self::CollisionBegin => "collision/begin",
            Self::CollisionEnd => "collision/end",
            Self::SensorBegin => "sensor/begin",
            Self::SensorEnd => "sensor/end",
            Self::PreSolve => "contact/pre_solve",
            Self::PostSolve => "contact/post_solve",
            Self::BodySleep => "body/sleep",
            Self::BodyWake => "body/wake",
            Self::JointBreak => "joint/break",
            Self::StepBegin => "step/begin",
            Self::StepEnd => "step/end",
            Self::RaycastHit => "raycast/hit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A notification correlated to entities, handed to every listener.
///
/// The same context is passed to all listeners of one dispatch pass, so a
/// pre-solve veto set by an early listener is visible to later ones and to
/// the engine once dispatch returns.
#[derive(Debug)]
pub struct EventContext<'n> {
    kind: EventKind,
    entity_a: Option<EntityId>,
    entity_b: Option<EntityId>,
    notification: &'n mut Notification,
}

impl<'n> EventContext<'n> {
    /// Builds a context; used by the correlator and by hosts calling
    /// [`EventChannel::emit`](crate::EventChannel::emit) directly.
    pub fn new(
        kind: EventKind,
        entity_a: Option<EntityId>,
        entity_b: Option<EntityId>,
        notification: &'n mut Notification,
    ) -> Self {
        Self {
            kind,
            entity_a,
            entity_b,
            notification,
        }
    }

    /// Kind this notification was dispatched as.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Entity owning the first (or only) body.
    pub fn entity_a(&self) -> Option<EntityId> {
        self.entity_a
    }

    /// Entity owning the second body of a pair.
    pub fn entity_b(&self) -> Option<EntityId> {
        self.entity_b
    }

    /// The underlying notification.
    pub fn notification(&self) -> &Notification {
        self.notification
    }

    /// Contact manifold, empty for kinds without contacts.
    pub fn contacts(&self) -> &[ContactPoint] {
        self.notification.contacts()
    }

    /// Pre-solve veto state; `true` for every other kind.
    pub fn processing_enabled(&self) -> bool {
        match &*self.notification {
            Notification::PreSolve(p) => p.processing_enabled,
            _ => true,
        }
    }

    /// Vetoes collision response for a pre-solve pair.
    ///
    /// Returns `false` (and does nothing) for any other kind.
    pub fn disable_processing(&mut self) -> bool {
        match &mut *self.notification {
            Notification::PreSolve(p) => {
                p.processing_enabled = false;
                true
            }
            _ => false,
        }
    }
}
