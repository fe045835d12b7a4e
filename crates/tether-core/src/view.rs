// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! 2D view transform for debug visualization.

use tether_math::{Fx, Vec2};

/// Camera placement in world space.
///
/// Zoom must never be zero; division by a zero zoom saturates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ViewTransform {
    /// World point at the screen origin.
    pub position: Vec2,
    /// View rotation in radians.
    pub rotation: Fx,
    /// Screen units per world unit.
    pub zoom: Fx,
}

impl ViewTransform {
    /// Zero offset, zero rotation, unit zoom.
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation: Fx::ZERO,
        zoom: Fx::ONE,
    };
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Maps points between world and screen space.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ViewMapper {
    view: ViewTransform,
}

impl ViewMapper {
    /// Mapper with the identity view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole view.
    pub fn set_view_transform(&mut self, view: ViewTransform) {
        self.view = view;
    }

    /// Restores the identity view.
    pub fn reset_view_transform(&mut self) {
        self.view = ViewTransform::IDENTITY;
    }

    /// Current view.
    pub fn view_transform(&self) -> ViewTransform {
        self.view
    }

    /// `rotate((p - position) * zoom, rotation)`.
    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        ((p - self.view.position) * self.view.zoom).rotate(self.view.rotation)
    }

    /// Inverse of [`ViewMapper::world_to_screen`].
    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        let (sin, cos) = (-self.view.rotation).sin_cos();
        p.rotate_by(cos, sin) / self.view.zoom + self.view.position
    }
}
