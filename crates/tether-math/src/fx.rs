// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deterministic fixed-point scalar.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::fixed_q32_32 as q;
use crate::trig;

/// Deterministic fixed-point scalar with Q32.32 encoding stored in an `i64`.
///
/// ```text
/// real_value = raw / 2^32
/// ```
///
/// # Determinism contract
///
/// - All arithmetic is performed in integer space with saturating overflow.
/// - Multiplication/division round to nearest, ties-to-even.
/// - Division by zero never panics: `0/0 = 0`, otherwise the result saturates
///   toward the sign of the dividend.
/// - Float conversions are boundary crossings only (config, diagnostics).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Fx {
    raw: i64,
}

impl Fx {
    /// The fixed-point zero value.
    pub const ZERO: Self = Self { raw: 0 };

    /// The fixed-point one value.
    pub const ONE: Self = Self { raw: q::ONE_RAW };

    /// The smallest positive value (`2^-32`).
    pub const EPSILON: Self = Self { raw: 1 };

    /// Largest representable value.
    pub const MAX: Self = Self { raw: i64::MAX };

    /// Smallest representable value.
    pub const MIN: Self = Self { raw: i64::MIN };

    /// Constructs a value from raw Q32.32 bits. Exact; no scaling.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self { raw }
    }

    /// Returns the underlying Q32.32 storage value.
    pub const fn raw(self) -> i64 {
        self.raw
    }

    /// Constructs an integer value (`n << 32`).
    #[must_use]
    pub const fn from_int(n: i32) -> Self {
        Self {
            raw: (n as i64) << q::FRAC_BITS,
        }
    }

    /// `num / den` rounded to the nearest representable value.
    ///
    /// `from_ratio(1, 60)` is the canonical way to spell a 60 Hz step.
    #[must_use]
    pub fn from_ratio(num: i32, den: i32) -> Self {
        Self::from_int(num) / Self::from_int(den)
    }

    /// Deterministic conversion from `f32` (NaN → 0, saturating).
    #[must_use]
    pub fn from_f32(value: f32) -> Self {
        Self::from_raw(q::from_f32(value))
    }

    /// Deterministic conversion from `f64` (NaN → 0, saturating).
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        Self::from_raw(q::from_f64(value))
    }

    /// Nearest `f32`, for interop and diagnostics.
    pub fn to_f32(self) -> f32 {
        q::to_f32(self.raw)
    }

    /// Nearest `f64`, for interop and diagnostics.
    pub fn to_f64(self) -> f64 {
        q::to_f64(self.raw)
    }

    /// Multiplies by an integer with saturation; exact when no overflow occurs.
    #[must_use]
    pub fn mul_int(self, n: i64) -> Self {
        Self::from_raw(q::saturate_i128(i128::from(self.raw) * i128::from(n)))
    }

    /// Absolute value (saturating at `MAX` for `MIN`).
    #[must_use]
    pub fn abs(self) -> Self {
        if self.raw < 0 {
            -self
        } else {
            self
        }
    }

    /// Returns `true` for values strictly below zero.
    pub const fn is_negative(self) -> bool {
        self.raw < 0
    }

    /// Returns `true` for exactly zero.
    pub const fn is_zero(self) -> bool {
        self.raw == 0
    }

    /// Sine of `self` (radians).
    #[must_use]
    pub fn sin(self) -> Self {
        trig::sin_cos(self).0
    }

    /// Cosine of `self` (radians).
    #[must_use]
    pub fn cos(self) -> Self {
        trig::sin_cos(self).1
    }

    /// Sine and cosine of `self` (radians) from one range reduction.
    pub fn sin_cos(self) -> (Self, Self) {
        trig::sin_cos(self)
    }

    /// Linear interpolation `a + (b - a) * t`; `t` is not clamped.
    #[must_use]
    pub fn lerp(a: Self, b: Self, t: Self) -> Self {
        a + (b - a) * t
    }
}

impl fmt::Display for Fx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl From<i32> for Fx {
    fn from(n: i32) -> Self {
        Self::from_int(n)
    }
}

impl Add for Fx {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::from_raw(q::add(self.raw, rhs.raw))
    }
}

impl Sub for Fx {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::from_raw(q::sub(self.raw, rhs.raw))
    }
}

impl Mul for Fx {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::from_raw(q::mul(self.raw, rhs.raw))
    }
}

impl Div for Fx {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Self::from_raw(q::div(self.raw, rhs.raw))
    }
}

impl Neg for Fx {
    type Output = Self;
    fn neg(self) -> Self {
        Self::from_raw(q::neg(self.raw))
    }
}

impl AddAssign for Fx {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fx {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for Fx {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for Fx {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Sum for Fx {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
