//! Render-time styling.
//!
//! None of this affects the simulation. The engine stores it and hands it to
//! the renderer alongside the particle buffer each frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How overlapping particles combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Standard alpha blending.
    Alpha,
    /// Colors add up, so dense regions glow.
    #[default]
    Additive,
}

/// Color, point size, and blending for the point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// RGB, each channel `0.0..=1.0`.
    pub color: [f32; 3],
    /// Point size in world units.
    pub point_size: f32,
    /// Point opacity.
    pub opacity: f32,
    pub blend_mode: BlendMode,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            // #ff0055
            color: [1.0, 0.0, 85.0 / 255.0],
            point_size: 0.1,
            opacity: 0.8,
            blend_mode: BlendMode::Additive,
        }
    }
}

impl RenderStyle {
    /// Color as a vector.
    pub fn color_vec(&self) -> Vec3 {
        Vec3::from_array(self.color)
    }

    /// Set the color, clamping each channel to `0..=1`.
    pub fn set_color(&mut self, rgb: Vec3) {
        self.color = rgb.clamp(Vec3::ZERO, Vec3::ONE).to_array();
    }

    /// Set the color from a `#rrggbb` string. Returns `false` and leaves the
    /// color unchanged if the string does not parse.
    pub fn set_color_hex(&mut self, hex: &str) -> bool {
        match parse_hex_color(hex) {
            Some(rgb) => {
                self.set_color(rgb);
                true
            }
            None => false,
        }
    }

    /// Set the point size. Negative sizes clamp to zero.
    pub fn set_point_size(&mut self, size: f32) {
        self.point_size = size.max(0.0);
    }
}

/// Parse `#rrggbb` (or `rrggbb`) into an RGB vector.
pub fn parse_hex_color(hex: &str) -> Option<Vec3> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Vec3::new(
        channel(0)? as f32 / 255.0,
        channel(2)? as f32 / 255.0,
        channel(4)? as f32 / 255.0,
    ))
}
