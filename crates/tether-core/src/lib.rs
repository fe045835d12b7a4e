// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tether core: drives an external rigid-body engine from a variable-rate
//! frame loop and ties its bodies back to scene entities.
//!
//! - [`StepDriver`] turns frame time into fixed steps.
//! - [`sync`] copies body state into [`FixedSnapshot`]s and interpolates them.
//! - [`EventCorrelator`] resolves engine [`Notification`]s to entities and
//!   dispatches them to [`CallbackTable`] lists and the [`EventChannel`].
//! - [`ViewMapper`] converts between world and screen space.
//! - [`PhysicsWorld`] wires all of the above around one [`PhysicsEngine`].
#![forbid(unsafe_code)]

mod callbacks;
mod channel;
pub mod config;
mod correlator;
mod engine;
mod entity;
mod ident;
mod listener;
mod notification;
mod snapshot;
mod step;
pub mod sync;
mod view;
mod world;

pub use callbacks::{CallbackTable, EntityCallback};
pub use channel::{ChannelListener, EventChannel};
pub use config::{ConfigError, ConfigService, ConfigStore, SimConfig, SimConfigFile};
pub use correlator::{Correlation, CorrelatorSink, EventCorrelator};
pub use engine::{BodyAccess, DiscardSink, NotificationSink, PhysicsEngine, Stepper};
pub use entity::{EntityRecord, EntityTable};
pub use ident::{BodyHandle, ColliderHandle, EntityId, JointHandle};
pub use listener::{DispatchReport, ListenerError, ListenerId, ListenerResult};
pub use notification::{
    BodyRef, ContactNotification, ContactPoint, EventContext, EventKind, JointBreakNotification,
    MalformedNotification, Notification, Participants, PostSolveNotification,
    PreSolveNotification, RaycastHit,
};
pub use snapshot::{FixedSnapshot, Pose};
pub use step::{StepDriver, StepOutcome};
pub use view::{ViewMapper, ViewTransform};
pub use world::{PhysicsWorld, WorldError, WorldResult};

pub use tether_math::{Fx, Vec2};
