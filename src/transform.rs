//! Aggregate pose of the point cloud.
//!
//! Two mutually exclusive modes, picked each frame by whether a gesture is
//! detected:
//!
//! - **Driven**: the vertical offset eases toward `(0.5 − centerY) × v_range`
//!   and the Y rotation advances at `(centerX − 0.5) × k_rot` per frame. The
//!   X tilt decays toward zero.
//! - **Idle**: the offset eases back to zero at a slower rate and both axes
//!   spin at small constant speeds.
//!
//! Both modes only apply bounded per-frame deltas to the same state, so
//! switching between them never jumps.

use crate::config::TransformParams;
use crate::gesture::GestureReading;
use crate::time::{per_frame_decay, per_frame_rate};
use crate::{Mat4, Vec2, Vec3};
use glam::EulerRot;

/// Screen center, used when a detected reading carries no position.
const SCREEN_CENTER: Vec2 = Vec2::new(0.5, 0.5);

/// Rotation and vertical offset of the whole cloud.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FieldTransform {
    /// Rotation about the horizontal axis, radians.
    pub rotation_x: f32,
    /// Rotation about the vertical axis, radians.
    pub rotation_y: f32,
    /// Vertical translation in world units.
    pub position_y: f32,
}

impl FieldTransform {
    /// Identity pose.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one step covering `frames` reference frames.
    pub fn update(&mut self, reading: &GestureReading, params: &TransformParams, frames: f32) {
        if frames <= 0.0 {
            return;
        }

        if reading.detected {
            let center = reading.center.unwrap_or(SCREEN_CENTER);

            let target_y = (0.5 - center.y) * params.vertical_range;
            self.position_y += (target_y - self.position_y) * per_frame_rate(params.driven_return, frames);

            self.rotation_y += (center.x - 0.5) * params.rotation_gain * frames;
            self.rotation_x *= per_frame_decay(params.tilt_decay, frames);
        } else {
            self.position_y -= self.position_y * per_frame_rate(params.idle_return, frames);

            self.rotation_y += params.idle_spin_y * frames;
            self.rotation_x += params.idle_spin_x * frames;
        }
    }

    /// Model matrix: translate by `position_y`, then rotate X, Y (intrinsic XYZ).
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::Y * self.position_y)
            * Mat4::from_euler(EulerRot::XYZ, self.rotation_x, self.rotation_y, 0.0)
    }
}
