// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use tether_core::{
    BodyAccess, BodyHandle, EntityId, EventKind, Fx, PhysicsWorld, Pose, SimConfig, Vec2,
    WorldError,
};
use tether_dry_tests::{ScriptedBody, ScriptedEngine};

/// Quarter-second steps and one body moving +4 units/s along x.
fn moving_world() -> (PhysicsWorld<ScriptedEngine>, EntityId, BodyHandle) {
    let config = SimConfig::from_json(br#"{ "fixed_time_step": 0.25, "max_sub_steps": 4 }"#)
        .expect("config");
    let mut world = PhysicsWorld::new(ScriptedEngine::new(), config);
    let body = world.engine_mut().insert_body(ScriptedBody {
        linear_velocity: Vec2::from_ints(4, 0),
        angular_velocity: Fx::from_int(2),
        ..ScriptedBody::default()
    });
    let entity = EntityId(7);
    world.register_entity(entity);
    world.attach_body(entity, body).expect("attach");
    (world, entity, body)
}

#[test]
fn attach_seeds_a_resting_snapshot_and_back_reference() {
    let (world, entity, body) = moving_world();
    let snap = world.snapshot(entity).expect("snapshot");
    assert_eq!(snap.current(), snap.previous());
    assert_eq!(world.engine().user_data(body), Some(entity));
}

#[test]
fn interpolation_spans_the_last_fixed_step() {
    let (mut world, entity, _) = moving_world();
    world
        .advance(Fx::from_f32(0.375))
        .expect("advance");

    let snap = *world.snapshot(entity).expect("snapshot");
    assert_eq!(snap.previous(), Pose::new(Vec2::ZERO, Fx::ZERO));
    assert_eq!(snap.current(), Pose::new(Vec2::from_ints(1, 0), Fx::from_ratio(1, 2)));
    assert_eq!(snap.interpolate(Fx::ZERO), snap.previous());
    assert_eq!(snap.interpolate(Fx::ONE), snap.current());

    assert_eq!(world.alpha(), Fx::from_ratio(1, 2));
    assert_eq!(
        world.interpolated_pose(entity),
        Some(Pose::new(Vec2::from_f32(0.5, 0.0), Fx::from_ratio(1, 4)))
    );
    assert_eq!(world.interpolated_poses().len(), 1);
}

#[test]
fn previous_pose_moves_once_per_sub_step() {
    let (mut world, entity, _) = moving_world();
    let outcome = world.advance(Fx::from_f32(0.5)).expect("advance");
    assert_eq!(outcome.sub_steps, 2);

    let snap = world.snapshot(entity).expect("snapshot");
    assert_eq!(snap.previous().position, Vec2::from_ints(1, 0));
    assert_eq!(snap.current().position, Vec2::from_ints(2, 0));
}

#[test]
fn bodies_unknown_to_the_engine_are_skipped() {
    let (mut world, entity, body) = moving_world();
    world.advance(Fx::from_f32(0.25)).expect("advance");
    let before = *world.snapshot(entity).expect("snapshot");

    assert!(world.engine_mut().remove_body(body));
    world.advance(Fx::from_f32(0.25)).expect("advance");

    assert_eq!(*world.snapshot(entity).expect("snapshot"), before);
    assert_eq!(world.refresh(), 0);
}

#[test]
fn snap_to_teleports_without_smear() {
    let (mut world, entity, body) = moving_world();
    world.advance(Fx::from_f32(0.25)).expect("advance");

    let target = Pose::new(Vec2::from_ints(-10, 3), Fx::ONE);
    world.snap_to(entity, target).expect("snap");

    let snap = world.snapshot(entity).expect("snapshot");
    assert_eq!(snap.previous(), target);
    assert_eq!(snap.current(), target);
    assert_eq!(world.engine().pose(body), Some(target));
}

#[test]
fn push_to_body_writes_the_snapshot_pose() {
    let (mut world, entity, body) = moving_world();
    world.advance(Fx::from_f32(0.25)).expect("advance");
    world
        .engine_mut()
        .set_position(body, Vec2::from_ints(99, 99));

    assert!(world.push_to_body(entity));
    assert_eq!(world.engine().position(body), Some(Vec2::from_ints(1, 0)));
    assert!(!world.push_to_body(EntityId(1234)));
}

#[test]
fn attach_errors() {
    let (mut world, entity, body) = moving_world();
    assert!(matches!(
        world.attach_body(EntityId(1), body),
        Err(WorldError::UnknownEntity(EntityId(1)))
    ));
    assert!(matches!(
        world.attach_body(entity, BodyHandle(999)),
        Err(WorldError::UnknownBody(BodyHandle(999)))
    ));
    assert!(world
        .attach_collider(entity, tether_core::ColliderHandle(3))
        .is_ok());
    assert!(world
        .attach_collider(EntityId(1), tether_core::ColliderHandle(3))
        .is_err());
}

#[test]
fn reattaching_releases_the_old_body() {
    let (mut world, entity, old) = moving_world();
    let new = world.engine_mut().create_body(Vec2::from_ints(5, 5));
    world.attach_body(entity, new).expect("attach");

    assert_eq!(world.engine().user_data(old), None);
    assert_eq!(world.engine().user_data(new), Some(entity));
    assert_eq!(
        world.snapshot(entity).expect("snapshot").current().position,
        Vec2::from_ints(5, 5)
    );
}

#[test]
fn unregister_clears_back_reference_and_callbacks() {
    let (mut world, entity, body) = moving_world();
    world.callbacks().on_collision_begin(entity, |_| Ok(()));
    world.callbacks().on(entity, EventKind::BodySleep, |_, _| Ok(()));

    let record = world.unregister_entity(entity).expect("registered");
    assert_eq!(record.body(), Some(body));
    assert_eq!(world.engine().user_data(body), None);
    assert!(world.callbacks().is_empty());
    assert!(world.snapshot(entity).is_none());
    assert!(world.unregister_entity(entity).is_none());
}

#[test]
fn attaching_an_owned_body_takes_it_from_the_previous_owner() {
    let (mut world, first, body) = moving_world();
    let second = EntityId(900);
    world.register_entity(second);
    world.attach_body(second, body).expect("attach");

    let old_owner = world.entities().get(first).expect("registered");
    assert_eq!(old_owner.body(), None);
    assert!(old_owner.snapshot().is_none());
    assert_eq!(world.engine().user_data(body), Some(second));

    world.advance(Fx::from_f32(0.25)).expect("advance");
    assert_eq!(world.interpolated_poses().len(), 1);

    let record = world.unregister_entity(first).expect("registered");
    assert_eq!(record.body(), None);
    assert_eq!(world.engine().user_data(body), Some(second));
}

#[test]
fn unregister_leaves_a_foreign_back_reference_alone() {
    let (mut world, entity, body) = moving_world();
    let other = EntityId(8);
    world.register_entity(other);
    assert!(world.engine_mut().set_user_data(body, Some(other)));

    world.unregister_entity(entity).expect("registered");
    assert_eq!(world.engine().user_data(body), Some(other));
}

#[test]
fn refresh_after_advance_collapses_the_interpolation_span() {
    let (mut world, entity, _) = moving_world();
    world.advance(Fx::from_f32(0.375)).expect("advance");
    let stepped = *world.snapshot(entity).expect("snapshot");
    assert_ne!(stepped.previous(), stepped.current());

    assert_eq!(world.refresh(), 1);
    let refreshed = world.snapshot(entity).expect("snapshot");
    assert_eq!(refreshed.previous(), stepped.current());
    assert_eq!(refreshed.current(), stepped.current());
}
