//! The particle field: N points converging toward a target shape.
//!
//! Each frame every particle moves a fixed fraction of the way toward its
//! desired position. With no gesture the desired position is the target
//! point itself. With an open gesture the target is scaled outward and a
//! per-particle noise offset is added:
//!
//! ```text
//! desired = target × (1 + factor × k_expand) + jitter × (factor × k_noise)
//! current += (desired − current) × lerp_speed
//! ```
//!
//! The jitter direction of each particle is drawn once and never changes, so
//! the noise breathes with the factor instead of flickering frame to frame.
//!
//! Buffers are allocated once. [`ParticleField::retarget_points`] overwrites
//! the target contents in place and motion resumes from wherever the
//! particles currently are, so shape changes morph instead of snapping.

use crate::config::FieldParams;
use crate::shapes::{self, ShapeGenerator};
use crate::spawn::Sampler;
use crate::time::{per_frame_rate, MAX_FRAMES_PER_STEP};
use crate::Vec3;

/// Half-size of the cube particles are scattered in before the first shape.
pub const INITIAL_SCATTER: f32 = 5.0;

/// Fixed-size particle buffers plus the smoothed gesture factor.
#[derive(Debug, Clone)]
pub struct ParticleField {
    current: Vec<Vec3>,
    target: Vec<Vec3>,
    jitter: Vec<Vec3>,
    smoothed_factor: f32,
    params: FieldParams,
}

impl ParticleField {
    /// Scatter `count` particles in a cube and pin their jitter seeds.
    ///
    /// Targets start equal to the scattered positions, so the field is at
    /// rest until the first retarget.
    pub fn new(count: usize, params: FieldParams, sampler: &mut Sampler) -> Self {
        let current: Vec<Vec3> = (0..count).map(|_| sampler.in_cube(INITIAL_SCATTER)).collect();
        let jitter = (0..count).map(|_| sampler.centered_vec3(1.0)).collect();
        Self {
            target: current.clone(),
            current,
            jitter,
            smoothed_factor: 0.0,
            params,
        }
    }

    /// Build a field from caller-owned buffers.
    ///
    /// `current` fixes N. `target` and `jitter` are origin-padded or truncated
    /// to match.
    pub fn from_buffers(current: Vec<Vec3>, target: Vec<Vec3>, jitter: Vec<Vec3>, params: FieldParams) -> Self {
        let count = current.len();
        Self {
            current,
            target: shapes::fill_exact(target, count),
            jitter: shapes::fill_exact(jitter, count),
            smoothed_factor: 0.0,
            params,
        }
    }

    /// Number of particles. Never changes.
    #[inline]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether the field has no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Current particle positions.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.current
    }

    /// The target buffer particles are converging toward.
    #[inline]
    pub fn targets(&self) -> &[Vec3] {
        &self.target
    }

    /// Per-particle jitter seeds.
    #[inline]
    pub fn jitter(&self) -> &[Vec3] {
        &self.jitter
    }

    /// Smoothed gesture factor driving expansion.
    #[inline]
    pub fn smoothed_factor(&self) -> f32 {
        self.smoothed_factor
    }

    /// Overwrite the smoothed factor, e.g. when restoring a paused session.
    pub fn set_smoothed_factor(&mut self, factor: f32) {
        self.smoothed_factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
    }

    /// Tuning constants in effect.
    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    /// Replace the tuning constants. Buffers are untouched.
    pub fn set_params(&mut self, params: FieldParams) {
        self.params = params;
    }

    /// Sample `generator` and make its output the new target.
    pub fn retarget(&mut self, generator: &dyn ShapeGenerator, sampler: &mut Sampler) {
        let points = shapes::generate(generator, self.len(), sampler);
        self.retarget_points(points);
    }

    /// Make `points` the new target, padding or truncating to N.
    pub fn retarget_points(&mut self, points: Vec<Vec3>) {
        let points = shapes::fill_exact(points, self.len());
        self.target.copy_from_slice(&points);
    }

    /// Advance every particle by `frames` reference frames.
    ///
    /// `raw_factor` is the reading's factor, `0` when nothing is detected;
    /// the field decays back to the plain shape through the same smoothing.
    /// Non-positive or NaN `frames` is a paused step; larger steps are capped
    /// at [`MAX_FRAMES_PER_STEP`].
    pub fn advance(&mut self, raw_factor: f32, frames: f32) {
        if !(frames > 0.0) {
            return;
        }
        let frames = frames.min(MAX_FRAMES_PER_STEP);
        let raw = if raw_factor.is_nan() { 0.0 } else { raw_factor.clamp(0.0, 1.0) };
        let smoothing = per_frame_rate(self.params.factor_smoothing, frames);
        self.smoothed_factor += (raw - self.smoothed_factor) * smoothing;

        let lerp = per_frame_rate(self.params.lerp_speed, frames);
        if lerp == 0.0 {
            return;
        }

        let factor = self.smoothed_factor;
        if factor > self.params.expansion_threshold {
            let expansion = 1.0 + factor * self.params.k_expand;
            let noise = factor * self.params.k_noise;
            for ((pos, target), seed) in self.current.iter_mut().zip(&self.target).zip(&self.jitter) {
                let desired = *target * expansion + *seed * noise;
                *pos += (desired - *pos) * lerp;
            }
        } else {
            for (pos, target) in self.current.iter_mut().zip(&self.target) {
                *pos += (*target - *pos) * lerp;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_with(current: Vec3, target: Vec3, jitter: Vec3) -> ParticleField {
        ParticleField::from_buffers(vec![current], vec![target], vec![jitter], FieldParams::default())
    }

    #[test]
    fn test_new_allocates_n() {
        let field = ParticleField::new(100, FieldParams::default(), &mut Sampler::seeded(1));
        assert_eq!(field.len(), 100);
        assert_eq!(field.targets().len(), 100);
        assert_eq!(field.jitter().len(), 100);
        assert!(field.positions().iter().all(|p| p.abs().max_element() <= INITIAL_SCATTER));
        assert!(field.jitter().iter().all(|j| j.abs().max_element() <= 0.5));
    }

    #[test]
    fn test_from_buffers_pads_short_target() {
        let field = ParticleField::from_buffers(
            vec![Vec3::ONE; 3],
            vec![Vec3::X],
            Vec::new(),
            FieldParams::default(),
        );
        assert_eq!(field.targets(), &[Vec3::X, Vec3::ZERO, Vec3::ZERO]);
        assert_eq!(field.jitter(), &[Vec3::ZERO; 3]);
    }

    #[test]
    fn test_retarget_points_keeps_length() {
        let mut field = ParticleField::new(4, FieldParams::default(), &mut Sampler::seeded(2));
        field.retarget_points(vec![Vec3::Y; 10]);
        assert_eq!(field.targets(), &[Vec3::Y; 4]);
        field.retarget_points(vec![Vec3::Z]);
        assert_eq!(field.targets(), &[Vec3::Z, Vec3::ZERO, Vec3::ZERO, Vec3::ZERO]);
    }

    #[test]
    fn test_retarget_does_not_move_current() {
        let mut field = ParticleField::new(8, FieldParams::default(), &mut Sampler::seeded(3));
        let before = field.positions().to_vec();
        field.retarget(&shapes::Heart, &mut Sampler::seeded(4));
        assert_eq!(field.positions(), before.as_slice());
    }

    #[test]
    fn test_single_step_moves_lerp_fraction() {
        let mut field = field_with(Vec3::ZERO, Vec3::splat(10.0), Vec3::ZERO);
        field.advance(0.0, 1.0);
        assert!((field.positions()[0] - Vec3::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn test_convergence_is_monotonic() {
        let mut field = field_with(Vec3::ZERO, Vec3::splat(10.0), Vec3::ZERO);
        let mut prev = 0.0;
        let mut frames = 0;
        while (10.0 - field.positions()[0].x).abs() > 1e-3 {
            field.advance(0.0, 1.0);
            let x = field.positions()[0].x;
            assert!(x > prev && x <= 10.0, "overshoot or stall at {}", x);
            prev = x;
            frames += 1;
            assert!(frames < 500);
        }
        assert!(frames > 100);
    }

    #[test]
    fn test_factor_smoothing_step() {
        let mut field = field_with(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO);
        field.advance(1.0, 1.0);
        assert!((field.smoothed_factor() - 0.1).abs() < 1e-6);
        field.advance(1.0, 1.0);
        assert!((field.smoothed_factor() - 0.19).abs() < 1e-6);
    }

    #[test]
    fn test_no_gesture_decays_factor() {
        let mut field = field_with(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO);
        field.set_smoothed_factor(1.0);
        for _ in 0..100 {
            field.advance(0.0, 1.0);
        }
        assert!(field.smoothed_factor() < 0.01);
    }

    #[test]
    fn test_expansion_resting_point() {
        let params = FieldParams {
            k_expand: 5.0,
            ..FieldParams::default()
        };
        let jitter = Vec3::new(0.5, -0.25, 0.1);
        let mut field = ParticleField::from_buffers(vec![Vec3::X], vec![Vec3::X], vec![jitter], params);
        field.set_smoothed_factor(1.0);

        for _ in 0..400 {
            let before = field.positions()[0];
            field.advance(1.0, 1.0);
            let after = field.positions()[0];
            let desired = Vec3::X * 6.0 + jitter * 0.5;
            assert!((after - before).length() <= 0.05 * (desired - before).length() + 1e-5);
        }

        let rest = field.positions()[0];
        let expected = Vec3::new(6.0, 0.0, 0.0) + jitter * 0.5;
        assert!((rest - expected).length() < 1e-3);
        assert!((rest.x - 6.0).abs() <= 0.5 * 0.5 + 1e-3);
    }

    #[test]
    fn test_jitter_is_stable_across_frames() {
        let mut field = ParticleField::new(16, FieldParams::default(), &mut Sampler::seeded(5));
        let seeds = field.jitter().to_vec();
        for _ in 0..10 {
            field.advance(1.0, 1.0);
        }
        assert_eq!(field.jitter(), seeds.as_slice());
    }

    #[test]
    fn test_paused_frame_is_noop() {
        let mut field = field_with(Vec3::ZERO, Vec3::ONE, Vec3::ZERO);
        field.advance(1.0, 0.0);
        assert_eq!(field.positions()[0], Vec3::ZERO);
        assert_eq!(field.smoothed_factor(), 0.0);
    }

    #[test]
    fn test_negative_or_nan_frames_is_noop() {
        let mut field = field_with(Vec3::ZERO, Vec3::splat(10.0), Vec3::ZERO);
        field.advance(1.0, -1.0);
        field.advance(1.0, f32::NAN);
        assert_eq!(field.positions()[0], Vec3::ZERO);
        assert_eq!(field.smoothed_factor(), 0.0);

        field.advance(0.0, 1.0);
        assert!((field.positions()[0] - Vec3::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn test_huge_frames_capped() {
        let mut capped = field_with(Vec3::ZERO, Vec3::splat(10.0), Vec3::ZERO);
        let mut max = capped.clone();
        capped.advance(0.0, 1000.0);
        max.advance(0.0, MAX_FRAMES_PER_STEP);
        assert_eq!(capped.positions(), max.positions());
        assert!(capped.positions()[0].x < 10.0);
    }

    #[test]
    fn test_set_params_changes_lerp() {
        let mut field = field_with(Vec3::ZERO, Vec3::splat(10.0), Vec3::ZERO);
        let params = FieldParams {
            lerp_speed: 0.5,
            ..field.params().clone()
        };
        field.set_params(params);
        field.advance(0.0, 1.0);
        assert!((field.positions()[0] - Vec3::splat(5.0)).length() < 1e-5);
    }

    #[test]
    fn test_nan_factor_treated_as_zero() {
        let mut field = field_with(Vec3::ZERO, Vec3::ONE, Vec3::ZERO);
        field.advance(f32::NAN, 1.0);
        assert_eq!(field.smoothed_factor(), 0.0);
        assert!(field.positions()[0].is_finite());
    }
}
