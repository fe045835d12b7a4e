// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Raw Q32.32 encoding helpers.
//!
//! The representation is an `i64` storing an integer scaled by `2^32`:
//! `real_value = raw / 2^32`. Everything here works on the raw integer so the
//! [`Fx`](crate::Fx) wrapper stays a thin, total arithmetic surface.

/// Number of fractional bits in the Q32.32 encoding.
pub(crate) const FRAC_BITS: u32 = 32;

/// The raw integer value corresponding to `1.0`.
pub(crate) const ONE_RAW: i64 = 1_i64 << FRAC_BITS;

/// `2^32` as an `f64`; scaling by a power of two is exact.
const SCALE_F64: f64 = 4_294_967_296.0;

pub(crate) fn saturate_i128(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value.is_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Rounds `num / den` to nearest with ties-to-even, both magnitudes unsigned.
fn div_round_even(num: u128, den: u128) -> u128 {
    let q = num / den;
    let r = num % den;
    let twice_r = r.saturating_mul(2);
    if twice_r > den || (twice_r == den && (q & 1) == 1) {
        q.saturating_add(1)
    } else {
        q
    }
}

fn apply_sign(magnitude: u128, negative: bool) -> i64 {
    let signed = i128::try_from(magnitude).unwrap_or(i128::MAX);
    saturate_i128(if negative { -signed } else { signed })
}

pub(crate) fn add(a: i64, b: i64) -> i64 {
    a.saturating_add(b)
}

pub(crate) fn sub(a: i64, b: i64) -> i64 {
    a.saturating_sub(b)
}

pub(crate) fn neg(a: i64) -> i64 {
    // -i64::MIN does not exist; saturate to MAX.
    a.checked_neg().unwrap_or(i64::MAX)
}

pub(crate) fn mul(a: i64, b: i64) -> i64 {
    let prod = i128::from(a) * i128::from(b);
    let rounded = div_round_even(prod.unsigned_abs(), 1_u128 << FRAC_BITS);
    apply_sign(rounded, prod.is_negative())
}

/// Division with the fixed-point policy for a zero divisor: `0/0 = 0`,
/// otherwise saturate toward the sign of the dividend.
pub(crate) fn div(a: i64, b: i64) -> i64 {
    if b == 0 {
        if a == 0 {
            return 0;
        }
        return if a.is_negative() { i64::MIN } else { i64::MAX };
    }
    let num = i128::from(a) << FRAC_BITS;
    let rounded = div_round_even(num.unsigned_abs(), i128::from(b).unsigned_abs());
    apply_sign(rounded, (a < 0) ^ (b < 0))
}

/// Deterministically converts an `f64` to a raw Q32.32 value.
///
/// - `NaN` maps to `0` (fixed-point has no NaN).
/// - Out-of-range values and infinities saturate.
/// - Rounds to nearest with ties-to-even at the Q32.32 boundary.
pub fn from_f64(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    // `as` saturates for out-of-range floats.
    #[allow(clippy::cast_possible_truncation)]
    let raw = (value * SCALE_F64).round_ties_even() as i64;
    raw
}

/// Converts a raw Q32.32 value to the nearest `f64`.
pub fn to_f64(raw: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let value = raw as f64 / SCALE_F64;
    value
}

/// Deterministically converts an `f32` to a raw Q32.32 value.
///
/// Widening to `f64` is exact, so this shares the `f64` rounding policy.
pub fn from_f32(value: f32) -> i64 {
    from_f64(f64::from(value))
}

/// Converts a raw Q32.32 value to an `f32` (via `f64`).
pub fn to_f32(raw: i64) -> f32 {
    #[allow(clippy::cast_possible_truncation)]
    let value = to_f64(raw) as f32;
    value
}
