// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transform sync between engine bodies and entity snapshots.

use tether_math::Fx;
use tracing::trace;

use crate::engine::BodyAccess;
use crate::entity::EntityTable;
use crate::ident::EntityId;
use crate::snapshot::Pose;

/// Copies authoritative body poses into every entity snapshot.
///
/// For each entity with both a body and a snapshot, shifts the snapshot's
/// current pose into its previous slot and then stores the engine's pose.
/// Bodies the engine no longer knows are left untouched. Returns the number
/// of snapshots refreshed.
///
/// Call exactly once per fixed step.
pub fn refresh<B>(engine: &B, entities: &mut EntityTable) -> usize
where
    B: BodyAccess + ?Sized,
{
    let mut refreshed = 0;
    for (id, record) in entities.iter_mut() {
        let (Some(body), Some(snapshot)) = (record.body, record.snapshot.as_mut()) else {
            continue;
        };
        let Some(pose) = engine.pose(body) else {
            trace!(entity = %id, body = %body, "body unknown to engine; snapshot kept");
            continue;
        };
        snapshot.update_previous();
        snapshot.set_current(pose);
        refreshed += 1;
    }
    refreshed
}

/// Render poses for every entity with a snapshot, in id order.
pub fn interpolate_all(entities: &EntityTable, alpha: Fx) -> Vec<(EntityId, Pose)> {
    entities
        .iter()
        .filter_map(|(id, record)| Some((id, record.snapshot()?.interpolate(alpha))))
        .collect()
}

/// Writes an entity's current snapshot pose into its body.
///
/// Returns `false` when the entity has no body or snapshot, or the engine
/// rejects the write.
pub fn push_pose<B>(engine: &mut B, entities: &EntityTable, id: EntityId) -> bool
where
    B: BodyAccess + ?Sized,
{
    let Some(record) = entities.get(id) else {
        return false;
    };
    let (Some(body), Some(snapshot)) = (record.body(), record.snapshot()) else {
        return false;
    };
    let pose = snapshot.current();
    engine.set_position(body, pose.position) && engine.set_rotation(body, pose.rotation)
}
