// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use core::f64::consts::{FRAC_PI_2, PI};

use proptest::prelude::*;
use tether_core::{Fx, Vec2, ViewMapper, ViewTransform};

fn close(a: Vec2, b: Vec2, tol: f64) -> bool {
    (a.x - b.x).abs().to_f64() <= tol && (a.y - b.y).abs().to_f64() <= tol
}

#[test]
fn quarter_turn_view() {
    let mut m = ViewMapper::new();
    m.set_view_transform(ViewTransform {
        position: Vec2::from_ints(1, 1),
        rotation: Fx::from_f64(FRAC_PI_2),
        zoom: Fx::ONE,
    });
    let screen = m.world_to_screen(Vec2::from_ints(2, 1));
    assert!(close(screen, Vec2::UNIT_Y, 1e-8), "{screen:?}");
}

#[test]
fn zero_zoom_saturates_instead_of_failing() {
    let mut m = ViewMapper::new();
    m.set_view_transform(ViewTransform {
        zoom: Fx::ZERO,
        ..ViewTransform::IDENTITY
    });
    assert_eq!(m.world_to_screen(Vec2::from_ints(3, -4)), Vec2::ZERO);
    assert_eq!(m.screen_to_world(Vec2::ZERO), Vec2::ZERO);
    assert_eq!(m.screen_to_world(Vec2::from_ints(1, -1)), Vec2::new(Fx::MAX, Fx::MIN));
}

proptest! {
    #[test]
    fn screen_to_world_inverts_world_to_screen(
        px in -1_000_000_i32..1_000_000,
        py in -1_000_000_i32..1_000_000,
        vx in -1_000_000_i32..1_000_000,
        vy in -1_000_000_i32..1_000_000,
        rotation in -PI..PI,
        zoom_quarters in 1_i32..=32,
    ) {
        let mut m = ViewMapper::new();
        m.set_view_transform(ViewTransform {
            position: Vec2::new(Fx::from_ratio(vx, 1000), Fx::from_ratio(vy, 1000)),
            rotation: Fx::from_f64(rotation),
            zoom: Fx::from_ratio(zoom_quarters, 4),
        });
        let p = Vec2::new(Fx::from_ratio(px, 1000), Fx::from_ratio(py, 1000));
        let back = m.screen_to_world(m.world_to_screen(p));
        prop_assert!(close(back, p, 1e-3), "{:?} -> {:?}", p, back);
    }
}
