// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! tether-math: deterministic fixed-point arithmetic for the Tether sync layer.
//!
//! Every time value, pose and camera parameter in Tether is a Q32.32
//! fixed-point number ([`Fx`]) so that accumulation across frames is exact
//! integer arithmetic and replays bit-for-bit on every target.
#![forbid(unsafe_code)]

mod fixed_q32_32;
mod fx;
mod trig;
mod vec2;

pub use fixed_q32_32::{from_f32, from_f64, to_f32, to_f64};
pub use fx::Fx;
pub use vec2::Vec2;
