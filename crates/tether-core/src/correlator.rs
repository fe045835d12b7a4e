// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Resolves engine notifications to entities and fans them out.
//!
//! Dispatch order for one notification:
//! 1. entity A's callbacks for the kind, each given entity B;
//! 2. entity B's callbacks, each given entity A;
//! 3. the global [`EventChannel`] (kind-specific, then wildcard).
//!
//! All three subscriber lists are snapshotted before the first listener runs.

use tracing::{trace, warn};

use crate::callbacks::{CallbackSnapshot, CallbackTable};
use crate::channel::EventChannel;
use crate::engine::NotificationSink;
use crate::entity::EntityTable;
use crate::ident::EntityId;
use crate::listener::{invoke_isolated, DispatchReport};
use crate::notification::{BodyRef, EventContext, Notification, Participants};

/// Result of handling one notification.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Correlation {
    /// Every participant resolved; listeners ran.
    Dispatched(DispatchReport),
    /// A participant's back-reference did not resolve; nothing ran.
    Unresolved,
    /// The notification violated the adapter contract and was dropped.
    Malformed,
}

impl Correlation {
    /// Listener counts, zero unless dispatched.
    pub fn report(self) -> DispatchReport {
        match self {
            Self::Dispatched(report) => report,
            Self::Unresolved | Self::Malformed => DispatchReport::default(),
        }
    }
}

/// Routes notifications to per-entity callback lists and the global channel.
#[derive(Clone, Debug, Default)]
pub struct EventCorrelator {
    callbacks: CallbackTable,
    channel: EventChannel,
}

impl EventCorrelator {
    /// Creates a correlator over existing handles.
    pub fn new(callbacks: CallbackTable, channel: EventChannel) -> Self {
        Self {
            callbacks,
            channel,
        }
    }

    /// Per-entity callback lists.
    pub fn callbacks(&self) -> &CallbackTable {
        &self.callbacks
    }

    /// Global event channel.
    pub fn channel(&self) -> &EventChannel {
        &self.channel
    }

    /// Resolves, then dispatches `notification`.
    ///
    /// Listener faults are logged and counted, never returned.
    pub fn handle_notification(
        &self,
        entities: &EntityTable,
        notification: &mut Notification,
    ) -> Correlation {
        let kind = match notification.kind() {
            Ok(kind) => kind,
            Err(err) => {
                warn!(error = %err, "dropping malformed physics notification");
                return Correlation::Malformed;
            }
        };

        let resolve = |body: BodyRef| {
            body.user_data.filter(|id| {
                entities
                    .get(*id)
                    .is_some_and(|record| record.body() == Some(body.handle))
            })
        };
        let (entity_a, entity_b) = match notification.participants() {
            Participants::None => (None, None),
            Participants::One(body) => match resolve(body) {
                Some(a) => (Some(a), None),
                None => {
                    trace!(kind = %kind, body = %body.handle, "unresolved body; notification discarded");
                    return Correlation::Unresolved;
                }
            },
            Participants::Pair(body_a, body_b) => match (resolve(body_a), resolve(body_b)) {
                (Some(a), Some(b)) => (Some(a), Some(b)),
                _ => {
                    trace!(
                        kind = %kind,
                        body_a = %body_a.handle,
                        body_b = %body_b.handle,
                        "unresolved body pair; notification discarded"
                    );
                    return Correlation::Unresolved;
                }
            },
        };

        let snapshot = |entity: Option<EntityId>| {
            entity.map_or_else(Vec::new, |e| self.callbacks.snapshot(e, kind))
        };
        let list_a = snapshot(entity_a);
        let list_b = snapshot(entity_b);
        let plan = self.channel.plan(kind);

        let mut ctx = EventContext::new(kind, entity_a, entity_b, notification);
        let mut report = DispatchReport::default();
        if let Some(a) = entity_a {
            report += self.run_entity(a, entity_b, list_a, &mut ctx);
        }
        if let Some(b) = entity_b {
            report += self.run_entity(b, entity_a, list_b, &mut ctx);
        }
        report += self.channel.run(plan, &mut ctx);
        Correlation::Dispatched(report)
    }

    /// Sink that feeds this correlator from inside an engine step.
    pub fn sink<'a>(&'a self, entities: &'a EntityTable) -> CorrelatorSink<'a> {
        CorrelatorSink {
            correlator: self,
            entities,
        }
    }

    fn run_entity(
        &self,
        entity: EntityId,
        other: Option<EntityId>,
        list: CallbackSnapshot,
        ctx: &mut EventContext<'_>,
    ) -> DispatchReport {
        let kind = ctx.kind();
        let mut report = DispatchReport::default();
        for (id, callback) in list {
            if !self.callbacks.is_live(entity, kind, id) {
                continue;
            }
            report.invoked += 1;
            if let Err(fault) = invoke_isolated(|| callback(other, ctx)) {
                report.faulted += 1;
                warn!(
                    entity = %entity,
                    kind = %kind,
                    error = %fault,
                    "entity physics callback failed"
                );
            }
        }
        report
    }
}

/// [`NotificationSink`] bound to one correlator and entity table.
#[derive(Debug)]
pub struct CorrelatorSink<'a> {
    correlator: &'a EventCorrelator,
    entities: &'a EntityTable,
}

impl NotificationSink for CorrelatorSink<'_> {
    fn deliver(&mut self, notification: &mut Notification) {
        self.correlator
            .handle_notification(self.entities, notification);
    }
}
