// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fixed-step pose snapshots and render interpolation.

use tether_math::{Fx, Vec2};

/// A 2D rigid pose: position plus rotation in radians.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Pose {
    /// World-space position.
    pub position: Vec2,
    /// Counter-clockwise rotation in radians.
    pub rotation: Fx,
}

impl Pose {
    /// Creates a pose from components.
    pub const fn new(position: Vec2, rotation: Fx) -> Self {
        Self { position, rotation }
    }
}

/// Authoritative pose at the last two fixed steps.
///
/// # Invariant
/// `previous` holds the pose at the end of the prior fixed step. It only moves
/// forward through [`FixedSnapshot::update_previous`], which the transform
/// sync calls exactly once per fixed step before writing the new pose.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FixedSnapshot {
    current: Pose,
    previous: Pose,
}

impl FixedSnapshot {
    /// Creates a snapshot at rest at `pose` (previous == current).
    pub const fn new(pose: Pose) -> Self {
        Self {
            current: pose,
            previous: pose,
        }
    }

    /// Pose at the end of the latest fixed step.
    pub fn current(&self) -> Pose {
        self.current
    }

    /// Pose at the end of the step before that.
    pub fn previous(&self) -> Pose {
        self.previous
    }

    /// Copies the current pose into the previous slot.
    pub fn update_previous(&mut self) {
        self.previous = self.current;
    }

    /// Overwrites the current pose with authoritative engine state.
    pub fn set_current(&mut self, pose: Pose) {
        self.current = pose;
    }

    /// Teleports: sets both slots so the next frames do not smear the jump.
    pub fn snap_to(&mut self, pose: Pose) {
        self.current = pose;
        self.previous = pose;
    }

    /// Render pose `alpha` of the way from the previous to the current step.
    ///
    /// `alpha = 0` yields the previous pose and `alpha = 1` the current one.
    /// Values outside `[0, 1]` extrapolate linearly; callers wanting visual
    /// stability clamp before calling.
    pub fn interpolate(&self, alpha: Fx) -> Pose {
        Pose {
            position: Vec2::lerp(self.previous.position, self.current.position, alpha),
            rotation: self.previous.rotation
                + (self.current.rotation - self.previous.rotation) * alpha,
        }
    }
}
