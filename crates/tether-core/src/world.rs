// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The physics world façade.
//!
//! A [`PhysicsWorld`] owns one engine adapter together with the entity
//! table, the step driver, the event correlator and the debug view. A frame
//! looks like:
//!
//! ```text
//! advance(frame_dt)
//!   └─ 0..=max_sub_steps times:
//!        engine.step(fixed_dt, correlator sink)   // listeners run in here
//!        refresh snapshots from body state
//! interpolated_poses()                            // render at driver alpha
//! ```
//!
//! Listeners never receive `&mut PhysicsWorld`, so they cannot re-enter a
//! step. They reach the callback lists and the channel through the shared
//! handles returned by [`PhysicsWorld::callbacks`] and
//! [`PhysicsWorld::channel`].

use tether_math::Fx;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::callbacks::CallbackTable;
use crate::channel::EventChannel;
use crate::config::SimConfig;
use crate::correlator::{Correlation, EventCorrelator};
use crate::engine::PhysicsEngine;
use crate::entity::{EntityRecord, EntityTable};
use crate::ident::{BodyHandle, ColliderHandle, EntityId};
use crate::notification::Notification;
use crate::snapshot::{FixedSnapshot, Pose};
use crate::step::{StepDriver, StepOutcome};
use crate::sync;
use crate::view::ViewMapper;

/// Errors raised by [`PhysicsWorld`] operations.
#[derive(Debug, Error)]
pub enum WorldError<E>
where
    E: std::error::Error + 'static,
{
    /// The engine failed a fixed step.
    #[error("physics step failed: {0}")]
    Step(#[source] E),
    /// The entity is not registered.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
    /// The engine does not know the body.
    #[error("unknown body {0}")]
    UnknownBody(BodyHandle),
}

/// Shorthand for results carrying a [`WorldError`] over engine `E`.
pub type WorldResult<T, E> = Result<T, WorldError<<E as crate::engine::Stepper>::Error>>;

/// Engine adapter plus everything needed to drive it from a frame loop.
#[derive(Debug)]
pub struct PhysicsWorld<E: PhysicsEngine> {
    engine: E,
    config: SimConfig,
    driver: StepDriver,
    entities: EntityTable,
    correlator: EventCorrelator,
    view: ViewMapper,
}

impl<E: PhysicsEngine> PhysicsWorld<E> {
    /// Wraps `engine` using `config` for stepping.
    pub fn new(engine: E, config: SimConfig) -> Self {
        Self {
            engine,
            driver: StepDriver::from_config(&config),
            config,
            entities: EntityTable::new(),
            correlator: EventCorrelator::default(),
            view: ViewMapper::new(),
        }
    }

    /// Config the world was built with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The engine adapter.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable engine access, for creating bodies and applying forces between
    /// frames.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Consumes the world, returning the adapter.
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// The step driver.
    pub fn driver(&self) -> &StepDriver {
        &self.driver
    }

    /// Registered entities.
    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    /// Registers `entity`. Returns `false` if it already was.
    pub fn register_entity(&mut self, entity: EntityId) -> bool {
        self.entities.insert(entity)
    }

    /// Makes `entity` the owner of `body`.
    ///
    /// Stores the back-reference on the body and seeds the entity's snapshot
    /// at rest on the body's current pose. A body previously owned by the
    /// entity loses its back-reference. Any other entity that owned `body`
    /// is left without a body and snapshot.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownEntity`] or [`WorldError::UnknownBody`].
    pub fn attach_body(&mut self, entity: EntityId, body: BodyHandle) -> WorldResult<(), E> {
        if !self.entities.contains(entity) {
            return Err(WorldError::UnknownEntity(entity));
        }
        let pose = self
            .engine
            .pose(body)
            .ok_or(WorldError::UnknownBody(body))?;
        for (owner, record) in self.entities.iter_mut() {
            if owner != entity && record.body == Some(body) {
                record.body = None;
                record.snapshot = None;
                debug!(entity = %owner, body = %body, "body taken over by another entity");
            }
        }
        let record = self
            .entities
            .get_mut(entity)
            .ok_or(WorldError::UnknownEntity(entity))?;
        if let Some(old) = record.body.replace(body) {
            if old != body && self.engine.user_data(old) == Some(entity) {
                self.engine.set_user_data(old, None);
            }
        }
        record.snapshot = Some(FixedSnapshot::new(pose));
        self.engine.set_user_data(body, Some(entity));
        debug!(entity = %entity, body = %body, "body attached");
        Ok(())
    }

    /// Records that `entity` owns `collider`.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownEntity`].
    pub fn attach_collider(
        &mut self,
        entity: EntityId,
        collider: ColliderHandle,
    ) -> WorldResult<(), E> {
        let record = self
            .entities
            .get_mut(entity)
            .ok_or(WorldError::UnknownEntity(entity))?;
        if !record.colliders.contains(&collider) {
            record.colliders.push(collider);
        }
        Ok(())
    }

    /// Forgets `entity`: clears its body's back-reference if it still points
    /// at `entity` and drops its callback lists. Notifications still queued for its body will no
    /// longer resolve.
    pub fn unregister_entity(&mut self, entity: EntityId) -> Option<EntityRecord> {
        let record = self.entities.remove(entity)?;
        if let Some(body) = record.body {
            if self.engine.user_data(body) == Some(entity) {
                self.engine.set_user_data(body, None);
            }
        }
        let dropped = self.correlator.callbacks().clear_entity(entity);
        debug!(entity = %entity, callbacks = dropped, "entity unregistered");
        Some(record)
    }

    /// Feeds one frame's elapsed time to the driver.
    ///
    /// Every fixed step delivers its notifications to the correlator while
    /// the step runs, then refreshes all snapshots.
    ///
    /// # Errors
    ///
    /// [`WorldError::Step`] with the engine's error; steps completed earlier
    /// in the frame stay applied.
    #[instrument(level = "trace", skip_all, fields(frame_dt = %frame_dt))]
    pub fn advance(&mut self, frame_dt: Fx) -> WorldResult<StepOutcome, E> {
        let Self {
            engine,
            driver,
            entities,
            correlator,
            ..
        } = self;
        driver
            .advance(frame_dt, |dt| {
                {
                    let mut sink = correlator.sink(entities);
                    engine.step(dt, &mut sink)?;
                }
                sync::refresh(&*engine, entities);
                Ok(())
            })
            .map_err(WorldError::Step)
    }

    /// Refreshes snapshots outside a step; returns how many were updated.
    ///
    /// [`advance`](Self::advance) already refreshes after every fixed step.
    /// Call this only after moving bodies between frames; each call shifts
    /// `current` into `previous`, so calling it after `advance` collapses the
    /// interpolation span.
    pub fn refresh(&mut self) -> usize {
        sync::refresh(&self.engine, &mut self.entities)
    }

    /// Current interpolation factor.
    pub fn alpha(&self) -> Fx {
        self.driver.alpha()
    }

    /// Render pose of `entity` at the current alpha.
    pub fn interpolated_pose(&self, entity: EntityId) -> Option<Pose> {
        Some(self.snapshot(entity)?.interpolate(self.alpha()))
    }

    /// Render poses of every entity with a body, in id order.
    pub fn interpolated_poses(&self) -> Vec<(EntityId, Pose)> {
        sync::interpolate_all(&self.entities, self.alpha())
    }

    /// Fixed-step snapshot of `entity`.
    pub fn snapshot(&self, entity: EntityId) -> Option<&FixedSnapshot> {
        self.entities.get(entity)?.snapshot()
    }

    /// Teleports `entity` and its body to `pose` without interpolation.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownEntity`] if the entity has no body attached,
    /// [`WorldError::UnknownBody`] if the engine rejects the write.
    pub fn snap_to(&mut self, entity: EntityId, pose: Pose) -> WorldResult<(), E> {
        let record = self
            .entities
            .get_mut(entity)
            .ok_or(WorldError::UnknownEntity(entity))?;
        let (Some(body), Some(snapshot)) = (record.body, record.snapshot.as_mut()) else {
            return Err(WorldError::UnknownEntity(entity));
        };
        if !(self.engine.set_position(body, pose.position)
            && self.engine.set_rotation(body, pose.rotation))
        {
            return Err(WorldError::UnknownBody(body));
        }
        snapshot.snap_to(pose);
        Ok(())
    }

    /// Writes `entity`'s current snapshot pose into its body.
    pub fn push_to_body(&mut self, entity: EntityId) -> bool {
        sync::push_pose(&mut self.engine, &self.entities, entity)
    }

    /// Correlates a notification delivered outside a step.
    ///
    /// Each body's back-reference is re-read from the engine first, so the
    /// user data carried in `notification` is ignored.
    pub fn handle_notification(&self, notification: &mut Notification) -> Correlation {
        notification.for_each_body_mut(|body| {
            body.user_data = self.engine.user_data(body.handle);
        });
        self.correlator
            .handle_notification(&self.entities, notification)
    }

    /// Shared per-entity callback lists.
    pub fn callbacks(&self) -> &CallbackTable {
        self.correlator.callbacks()
    }

    /// Shared global event channel.
    pub fn channel(&self) -> &EventChannel {
        self.correlator.channel()
    }

    /// Debug view mapper.
    pub fn view(&self) -> &ViewMapper {
        &self.view
    }

    /// Mutable debug view mapper.
    pub fn view_mut(&mut self) -> &mut ViewMapper {
        &mut self.view
    }
}
