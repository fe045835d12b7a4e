// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::panic)]
use std::cell::Cell;
use std::rc::Rc;

use tether_core::{
    BodyAccess, Correlation, DispatchReport, EntityId, EventKind, Fx, ListenerId, Notification,
    PhysicsWorld, SimConfig, Vec2,
};
use tether_dry_tests::{
    contact, contact_begin, pre_solve, sensor_begin, sleep, world_with_bodies, Recorder,
    ScriptedEngine,
};

fn two_body_world() -> (PhysicsWorld<ScriptedEngine>, [(EntityId, tether_core::BodyHandle); 2]) {
    let (world, pairs) = world_with_bodies(2, SimConfig::default());
    (world, [pairs[0], pairs[1]])
}

fn one_step(world: &mut PhysicsWorld<ScriptedEngine>) {
    let dt = world.config().fixed_time_step();
    let outcome = world.advance(dt).expect("step");
    assert_eq!(outcome.sub_steps, 1);
}

#[test]
fn begin_contact_reaches_both_entities_with_the_other_one() {
    let (mut world, [(a, body_a), (b, body_b)]) = two_body_world();
    let seen = Recorder::new();
    for me in [a, b] {
        let r = seen.clone();
        world.callbacks().on_collision_begin(me, move |other| {
            r.push((me, other));
            Ok(())
        });
    }

    world.engine_mut().queue(contact_begin(body_a, body_b));
    one_step(&mut world);

    assert_eq!(seen.calls(), vec![(a, b), (b, a)]);
}

#[test]
fn entity_callbacks_run_before_the_global_channel() {
    let (mut world, [(a, body_a), (b, body_b)]) = two_body_world();
    let order = Recorder::new();
    let r = order.clone();
    world.channel().subscribe(EventKind::Any, move |_| {
        r.push("any");
        Ok(())
    });
    let r = order.clone();
    world.channel().subscribe(EventKind::CollisionBegin, move |ctx| {
        assert_eq!((ctx.entity_a(), ctx.entity_b()), (Some(a), Some(b)));
        r.push("channel");
        Ok(())
    });
    let r = order.clone();
    world.callbacks().on_collision_begin(b, move |_| {
        r.push("b");
        Ok(())
    });
    let r = order.clone();
    world.callbacks().on_collision_begin(a, move |_| {
        r.push("a");
        Ok(())
    });

    world.engine_mut().queue(contact_begin(body_a, body_b));
    one_step(&mut world);

    assert_eq!(order.calls(), vec!["a", "b", "channel", "any"]);
}

#[test]
fn neither_begin_nor_end_invokes_nothing() {
    let (world, [(a, body_a), (b, body_b)]) = two_body_world();
    let calls = Recorder::new();
    let r = calls.clone();
    world.callbacks().on_collision_begin(a, move |other| {
        r.push(other);
        Ok(())
    });
    let r = calls.clone();
    world.callbacks().on_collision_end(a, move |other| {
        r.push(other);
        Ok(())
    });
    let r = calls.clone();
    world.channel().subscribe(EventKind::Any, move |_| {
        r.push(EntityId(0));
        Ok(())
    });

    for (is_begin, is_end) in [(false, false), (true, true)] {
        let mut n = contact(body_a, body_b, is_begin, is_end, false);
        n.for_each_body_mut(|r| {
            r.user_data = Some(if r.handle == body_a { a } else { b });
        });
        assert_eq!(world.handle_notification(&mut n), Correlation::Malformed);
    }
    assert!(calls.is_empty());
}

#[test]
fn failing_callbacks_do_not_stop_the_rest() {
    let (world, [(a, body_a), (b, body_b)]) = two_body_world();
    let ran = Rc::new(Cell::new(false));
    world
        .callbacks()
        .on_collision_begin(a, |_| Err("listener refused".into()));
    world
        .callbacks()
        .on_collision_begin(a, |_| panic!("listener bug"));
    let r = Rc::clone(&ran);
    world.callbacks().on_collision_begin(a, move |_| {
        r.set(true);
        Ok(())
    });
    let b_saw = Recorder::new();
    let r = b_saw.clone();
    world.callbacks().on_collision_begin(b, move |other| {
        r.push(other);
        Ok(())
    });

    let result = world.handle_notification(&mut contact_begin(body_a, body_b));

    assert!(ran.get());
    assert_eq!(b_saw.calls(), vec![a]);
    assert_eq!(
        result,
        Correlation::Dispatched(DispatchReport {
            invoked: 4,
            faulted: 2
        })
    );
}

#[test]
fn cleared_back_reference_discards_pending_begin() {
    let (mut world, [(a, body_a), (b, body_b)]) = two_body_world();
    let calls = Recorder::new();
    let r = calls.clone();
    world.callbacks().on_collision_begin(a, move |other| {
        r.push(other);
        Ok(())
    });
    let r = calls.clone();
    world.channel().subscribe(EventKind::Any, move |_| {
        r.push(EntityId(0));
        Ok(())
    });

    world.engine_mut().queue(contact_begin(body_a, body_b));
    assert!(world.unregister_entity(b).is_some());
    assert_eq!(world.engine().body(body_b).and_then(|s| s.user_data), None);
    one_step(&mut world);

    assert!(calls.is_empty());
}

#[test]
fn back_reference_to_unregistered_entity_is_unresolved() {
    let (mut world, [(_, body_a), (_, body_b)]) = two_body_world();
    assert!(world.engine_mut().set_user_data(body_a, Some(EntityId(404))));
    let mut n = contact_begin(body_a, body_b);
    assert_eq!(world.handle_notification(&mut n), Correlation::Unresolved);
}

#[test]
fn handle_notification_ignores_carried_user_data() {
    let (world, [(a, body_a), (b, body_b)]) = two_body_world();
    let seen = Recorder::new();
    let r = seen.clone();
    world.callbacks().on_collision_begin(a, move |other| {
        r.push(other);
        Ok(())
    });

    let mut n = contact_begin(body_a, body_b);
    n.for_each_body_mut(|r| r.user_data = Some(EntityId(404)));
    let report = world.handle_notification(&mut n).report();

    assert_eq!(report.invoked, 1);
    assert_eq!(seen.calls(), vec![b]);
}

#[test]
fn reused_entity_id_does_not_receive_its_old_bodys_events() {
    let (mut world, [(a, body_a), (b, old_body)]) = two_body_world();
    world.unregister_entity(b).expect("registered");
    world.register_entity(b);
    let new_body = world.engine_mut().create_body(Vec2::from_ints(9, 0));
    world.attach_body(b, new_body).expect("attach");

    let calls = Recorder::new();
    for me in [a, b] {
        let r = calls.clone();
        world.callbacks().on_collision_begin(me, move |other| {
            r.push((me, other));
            Ok(())
        });
    }

    assert_eq!(
        world.handle_notification(&mut contact_begin(body_a, old_body)),
        Correlation::Unresolved
    );

    // Even a stale slot on the engine side does not resolve: `b` owns
    // `new_body` now.
    assert!(world.engine_mut().set_user_data(old_body, Some(b)));
    assert_eq!(
        world.handle_notification(&mut contact_begin(body_a, old_body)),
        Correlation::Unresolved
    );
    world.engine_mut().queue(contact_begin(body_a, old_body));
    one_step(&mut world);
    assert!(calls.is_empty());

    world.handle_notification(&mut contact_begin(body_a, new_body));
    assert_eq!(calls.calls(), vec![(a, b), (b, a)]);
}

#[test]
fn pre_solve_veto_is_visible_to_the_engine() {
    let (mut world, [(a, body_a), (_, body_b)]) = two_body_world();
    world.callbacks().on(a, EventKind::PreSolve, |_, ctx| {
        assert!(ctx.disable_processing());
        Ok(())
    });
    let later_saw = Rc::new(Cell::new(true));
    let s = Rc::clone(&later_saw);
    world.channel().subscribe(EventKind::PreSolve, move |ctx| {
        s.set(ctx.processing_enabled());
        Ok(())
    });

    world.engine_mut().queue(pre_solve(body_a, body_b));
    one_step(&mut world);

    assert!(!later_saw.get());
    match world.engine().delivered() {
        [Notification::PreSolve(p)] => assert!(!p.processing_enabled),
        other => panic!("unexpected deliveries: {other:?}"),
    }
}

#[test]
fn sensor_and_single_body_kinds() {
    let (mut world, [(a, body_a), (b, body_b)]) = two_body_world();
    let seen = Recorder::new();
    for kind in [EventKind::SensorBegin, EventKind::BodySleep] {
        let r = seen.clone();
        world.callbacks().on(a, kind, move |other, ctx| {
            r.push((ctx.kind(), other, ctx.entity_a()));
            Ok(())
        });
    }

    world.engine_mut().queue(sensor_begin(body_a, body_b));
    world.engine_mut().queue(sleep(body_a));
    one_step(&mut world);

    assert_eq!(
        seen.calls(),
        vec![
            (EventKind::SensorBegin, Some(b), Some(a)),
            (EventKind::BodySleep, None, Some(a)),
        ]
    );
}

#[test]
fn step_boundaries_reach_only_the_channel() {
    let mut world = PhysicsWorld::new(ScriptedEngine::new().with_step_events(), SimConfig::default());
    let a = EntityId(1);
    let body = world.engine_mut().create_body(Vec2::ZERO);
    world.register_entity(a);
    world.attach_body(a, body).expect("attach");

    let entity_calls = Rc::new(Cell::new(0));
    for kind in [EventKind::StepBegin, EventKind::StepEnd] {
        let c = Rc::clone(&entity_calls);
        world.callbacks().on(a, kind, move |_, _| {
            c.set(c.get() + 1);
            Ok(())
        });
    }
    let kinds = Recorder::new();
    let r = kinds.clone();
    world.channel().subscribe(EventKind::Any, move |ctx| {
        r.push(ctx.kind());
        Ok(())
    });

    let dt = world.config().fixed_time_step().mul_int(2);
    world.advance(dt).expect("advance");

    assert_eq!(entity_calls.get(), 0);
    assert_eq!(
        kinds.calls(),
        vec![
            EventKind::StepBegin,
            EventKind::StepEnd,
            EventKind::StepBegin,
            EventKind::StepEnd,
        ]
    );
}

#[test]
fn removal_during_dispatch_skips_the_removed_callback() {
    let (world, [(a, body_a), (b, body_b)]) = two_body_world();
    let victim: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
    let table = world.callbacks().clone();
    let v = Rc::clone(&victim);
    world.callbacks().on_collision_begin(a, move |_| {
        if let Some(id) = v.get() {
            table.off(a, EventKind::CollisionBegin, id);
        }
        Ok(())
    });
    let victim_ran = Rc::new(Cell::new(false));
    let ran = Rc::clone(&victim_ran);
    victim.set(Some(world.callbacks().on_collision_begin(a, move |_| {
        ran.set(true);
        Ok(())
    })));

    let mut n = contact_begin(body_a, body_b);
    n.for_each_body_mut(|r| {
        r.user_data = Some(if r.handle == body_a { a } else { b });
    });
    let report = world.handle_notification(&mut n).report();

    assert!(!victim_ran.get());
    assert_eq!(report.invoked, 1);
    assert_eq!(world.callbacks().len(a, EventKind::CollisionBegin), 1);
}

#[test]
fn registration_during_dispatch_applies_to_the_next_notification() {
    let (world, [(a, body_a), (b, body_b)]) = two_body_world();
    let late = Rc::new(Cell::new(0));
    let table = world.callbacks().clone();
    let l = Rc::clone(&late);
    world.callbacks().on_collision_begin(a, move |_| {
        let l = Rc::clone(&l);
        table.on_collision_begin(a, move |_| {
            l.set(l.get() + 1);
            Ok(())
        });
        Ok(())
    });

    let resolved = || {
        let mut n = contact_begin(body_a, body_b);
        n.for_each_body_mut(|r| {
            r.user_data = Some(if r.handle == body_a { a } else { b });
        });
        n
    };
    world.handle_notification(&mut resolved());
    assert_eq!(late.get(), 0);
    world.handle_notification(&mut resolved());
    assert_eq!(late.get(), 1);
}

#[test]
fn emit_without_correlation_reaches_channel_listeners() {
    let (world, _) = two_body_world();
    let seen = Rc::new(Cell::new(false));
    let s = Rc::clone(&seen);
    world.channel().subscribe(EventKind::StepEnd, move |_| {
        s.set(true);
        Ok(())
    });
    let mut n = Notification::StepEnd { dt: Fx::ONE };
    let report = world.channel().emit(&mut tether_core::EventContext::new(
        EventKind::StepEnd,
        None,
        None,
        &mut n,
    ));
    assert!(seen.get());
    assert_eq!(report.invoked, 1);
}
