// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `tether simulate`: balls dropped onto the ground, sampled every N frames.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Write;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::Args;
use comfy_table::Table;
use serde::Serialize;
use tether_core::{
    ColliderHandle, EntityId, EventKind, Fx, PhysicsWorld, SimConfig, Vec2, ViewTransform,
};
use tracing::{info, warn};

use crate::ballistic::BallisticEngine;

const GROUND: EntityId = EntityId(0);

/// Options for `tether simulate`.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Frames to run.
    #[arg(long, default_value_t = 180)]
    pub frames: u32,
    /// Wall-clock duration of one frame in milliseconds.
    #[arg(long, default_value_t = 16.0)]
    pub frame_ms: f64,
    /// Number of balls.
    #[arg(long, default_value_t = 3)]
    pub bodies: u32,
    /// Height the balls start at.
    #[arg(long, default_value_t = 4.0)]
    pub drop_height: f64,
    /// Sample poses every N frames (and on the last frame).
    #[arg(long, default_value_t = 30)]
    pub every: u32,
    /// Entity ids whose pre-solve is vetoed, so they fall through the ground.
    #[arg(long)]
    pub ghost: Vec<u64>,
    /// Screen units per world unit for the screen-space columns.
    #[arg(long, default_value_t = 32.0)]
    pub zoom: f64,
    /// Emit JSON lines instead of tables.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PoseRow {
    frame: u32,
    entity: u64,
    x: f64,
    y: f64,
    rotation: f64,
    screen_x: f64,
    screen_y: f64,
    alpha: f64,
}

#[derive(Debug, Serialize)]
struct Summary {
    events: BTreeMap<&'static str, u32>,
    landings: BTreeMap<u64, u32>,
    capped_frames: u32,
}

/// Builds the world, runs it, and writes the report to `out`.
pub fn run(args: &SimulateArgs, config: SimConfig, out: &mut dyn Write) -> Result<()> {
    if args.every == 0 {
        bail!("--every must be at least 1");
    }
    if !(args.zoom.is_finite() && args.zoom > 0.0) {
        bail!("--zoom must be a positive number");
    }

    let mut world = PhysicsWorld::new(BallisticEngine::new(config.gravity()), config);
    let ground = world.engine().ground();
    world.register_entity(GROUND);
    world.attach_body(GROUND, ground).context("attach ground")?;
    for i in 1..=args.bodies {
        let entity = EntityId(u64::from(i));
        let x = Fx::from_int(i32::try_from(i)?.saturating_mul(2));
        let body = world
            .engine_mut()
            .spawn_ball(Vec2::new(x, Fx::from_f64(args.drop_height)), Fx::from_ratio(1, 2));
        world.register_entity(entity);
        world
            .attach_body(entity, body)
            .with_context(|| format!("attach {entity}"))?;
        world.attach_collider(entity, ColliderHandle(u64::from(i)))?;
    }

    for ghost in &args.ghost {
        world
            .callbacks()
            .on(EntityId(*ghost), EventKind::PreSolve, |_, ctx| {
                ctx.disable_processing();
                Ok(())
            });
    }

    let landings: Rc<RefCell<BTreeMap<u64, u32>>> = Rc::default();
    let l = Rc::clone(&landings);
    world.callbacks().on_collision_begin(GROUND, move |other| {
        *l.borrow_mut().entry(other.0).or_default() += 1;
        Ok(())
    });
    let events: Rc<RefCell<BTreeMap<&'static str, u32>>> = Rc::default();
    let e = Rc::clone(&events);
    world.channel().subscribe(EventKind::Any, move |ctx| {
        *e.borrow_mut().entry(ctx.kind().name()).or_default() += 1;
        Ok(())
    });

    world.view_mut().set_view_transform(ViewTransform {
        zoom: Fx::from_f64(args.zoom),
        ..ViewTransform::IDENTITY
    });

    let frame_dt = Fx::from_f64(args.frame_ms / 1000.0);
    info!(frames = args.frames, frame_dt = %frame_dt, bodies = args.bodies, "simulating");
    let mut rows = Vec::new();
    let mut capped_frames = 0;
    for frame in 1..=args.frames {
        let outcome = world.advance(frame_dt).with_context(|| format!("frame {frame}"))?;
        if outcome.capped {
            capped_frames += 1;
            warn!(frame, sub_steps = outcome.sub_steps, "frame hit the sub-step cap");
        }
        if frame % args.every != 0 && frame != args.frames {
            continue;
        }
        let alpha = world.alpha().to_f64();
        for (entity, pose) in world.interpolated_poses() {
            if entity == GROUND {
                continue;
            }
            let screen = world.view().world_to_screen(pose.position);
            rows.push(PoseRow {
                frame,
                entity: entity.0,
                x: pose.position.x.to_f64(),
                y: pose.position.y.to_f64(),
                rotation: pose.rotation.to_f64(),
                screen_x: screen.x.to_f64(),
                screen_y: screen.y.to_f64(),
                alpha,
            });
        }
    }

    let summary = Summary {
        events: events.borrow().clone(),
        landings: landings.borrow().clone(),
        capped_frames,
    };
    if args.json {
        for row in &rows {
            writeln!(out, "{}", serde_json::to_string(row)?)?;
        }
        writeln!(out, "{}", serde_json::to_string(&summary)?)?;
    } else {
        write_tables(out, &rows, &summary)?;
    }
    Ok(())
}

fn write_tables(out: &mut dyn Write, rows: &[PoseRow], summary: &Summary) -> Result<()> {
    let mut poses = Table::new();
    poses.set_header(vec![
        "frame", "entity", "x", "y", "rotation", "screen x", "screen y", "alpha",
    ]);
    for row in rows {
        poses.add_row(vec![
            row.frame.to_string(),
            row.entity.to_string(),
            format!("{:.3}", row.x),
            format!("{:.3}", row.y),
            format!("{:.3}", row.rotation),
            format!("{:.1}", row.screen_x),
            format!("{:.1}", row.screen_y),
            format!("{:.2}", row.alpha),
        ]);
    }
    writeln!(out, "{poses}")?;

    let mut events = Table::new();
    events.set_header(vec!["event", "count"]);
    for (kind, count) in &summary.events {
        events.add_row(vec![(*kind).to_owned(), count.to_string()]);
    }
    writeln!(out, "{events}")?;

    for (entity, count) in &summary.landings {
        writeln!(out, "entity#{entity} landed {count} time(s)")?;
    }
    if summary.capped_frames > 0 {
        writeln!(out, "{} frame(s) hit the sub-step cap", summary.capped_frames)?;
    }
    Ok(())
}
