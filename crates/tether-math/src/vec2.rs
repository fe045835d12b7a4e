// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::Fx;

/// 2D vector with fixed-point components.
///
/// Conventions:
/// - World space is right-handed, `+y` up, angles counter-clockwise in radians.
/// - All operations are component-wise `Fx` arithmetic, so results are
///   bit-identical on every target.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    /// Horizontal component.
    pub x: Fx,
    /// Vertical component.
    pub y: Fx,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(Fx::ZERO, Fx::ZERO);

    /// Unit vector along `+x`.
    pub const UNIT_X: Self = Self::new(Fx::ONE, Fx::ZERO);

    /// Unit vector along `+y`.
    pub const UNIT_Y: Self = Self::new(Fx::ZERO, Fx::ONE);

    /// Creates a vector from components.
    #[must_use]
    pub const fn new(x: Fx, y: Fx) -> Self {
        Self { x, y }
    }

    /// Creates a vector from integer components.
    #[must_use]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fx::from_int(x), Fx::from_int(y))
    }

    /// Creates a vector from `f32` components (boundary conversion).
    #[must_use]
    pub fn from_f32(x: f32, y: f32) -> Self {
        Self::new(Fx::from_f32(x), Fx::from_f32(y))
    }

    /// Components as `[x, y]` in `f32`.
    pub fn to_f32_array(self) -> [f32; 2] {
        [self.x.to_f32(), self.y.to_f32()]
    }

    /// Multiplies both components by `s`.
    #[must_use]
    pub fn scale(self, s: Fx) -> Self {
        Self::new(self.x * s, self.y * s)
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> Fx {
        self.x * other.x + self.y * other.y
    }

    /// Squared Euclidean length.
    pub fn length_squared(self) -> Fx {
        self.dot(self)
    }

    /// Rotates by an angle given as its precomputed `(cos, sin)` pair.
    ///
    /// Callers transforming many points by one angle compute the pair once.
    #[must_use]
    pub fn rotate_by(self, cos: Fx, sin: Fx) -> Self {
        Self::new(
            self.x * cos - self.y * sin,
            self.x * sin + self.y * cos,
        )
    }

    /// Rotates counter-clockwise by `angle` radians.
    #[must_use]
    pub fn rotate(self, angle: Fx) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.rotate_by(cos, sin)
    }

    /// Linear interpolation `a + (b - a) * t`; `t` is not clamped.
    #[must_use]
    pub fn lerp(a: Self, b: Self, t: Fx) -> Self {
        Self::new(Fx::lerp(a.x, b.x, t), Fx::lerp(a.y, b.y, t))
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<Fx> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: Fx) -> Self {
        self.scale(rhs)
    }
}

impl Div<Fx> for Vec2 {
    type Output = Self;
    fn div(self, rhs: Fx) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
