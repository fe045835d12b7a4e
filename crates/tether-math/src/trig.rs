// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Deterministic `sin`/`cos` for fixed-point angles.
//!
//! Platform transcendentals (`f64::{sin,cos}`) may differ across targets, so
//! the evaluation goes through `libm`'s portable software implementation and
//! the result is re-quantized to Q32.32 with the same rounding policy as every
//! other float crossing.

use crate::Fx;

/// Sine and cosine of `angle` (radians).
///
/// Results are exact at zero (`(0, 1)`) and always lie in `[-1, 1]`.
pub(crate) fn sin_cos(angle: Fx) -> (Fx, Fx) {
    if angle.is_zero() {
        return (Fx::ZERO, Fx::ONE);
    }
    // Reduce |angle| and apply the sign afterwards so sin(-x) == -sin(x)
    // bit-for-bit.
    let (s, c) = libm::sincos(angle.abs().to_f64());
    let s = clamp_unit(Fx::from_f64(s));
    let s = if angle.is_negative() { -s } else { s };
    (s, clamp_unit(Fx::from_f64(c)))
}

fn clamp_unit(value: Fx) -> Fx {
    value.clamp(-Fx::ONE, Fx::ONE)
}
