//! Random sampling helpers for shape generation and particle seeding.
//!
//! Every generator draws independent samples per point, so the output is
//! deterministic in distribution but not in value. Use [`Sampler::seeded`]
//! when a test needs repeatable values.

use crate::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

/// Seeded random source with helpers for common point distributions.
///
/// ```ignore
/// let mut sampler = Sampler::new();
/// let p = sampler.on_sphere(1.5);          // uniform on the surface
/// let q = sampler.in_sphere_cbrt(4.0);     // outer-shell weighted burst
/// ```
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: SmallRng,
}

impl Sampler {
    /// Create a sampler seeded from the system clock.
    ///
    /// Different every program execution.
    pub fn new() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::seeded(seed)
    }

    /// Create a sampler with a fixed seed for reproducible output.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// Centered noise: `(u - 0.5) * spread`, so the result lies in `[-spread/2, spread/2)`.
    #[inline]
    pub fn centered(&mut self, spread: f32) -> f32 {
        (self.random() - 0.5) * spread
    }

    /// Random angle in `[0, 2π)`.
    #[inline]
    pub fn angle(&mut self) -> f32 {
        self.random() * TAU
    }

    // ========== Point helpers ==========

    /// Vector with each component drawn from [`centered`](Self::centered).
    pub fn centered_vec3(&mut self, spread: f32) -> Vec3 {
        Vec3::new(
            self.centered(spread),
            self.centered(spread),
            self.centered(spread),
        )
    }

    /// Random point inside a cube of given half-size, centered at origin.
    pub fn in_cube(&mut self, half_size: f32) -> Vec3 {
        self.centered_vec3(half_size * 2.0)
    }

    /// Random unit direction, uniform over the sphere.
    ///
    /// Latitude comes from `acos(2u - 1)` so the poles are not oversampled.
    pub fn direction(&mut self) -> Vec3 {
        let theta = self.angle();
        let phi = (2.0 * self.random() - 1.0).clamp(-1.0, 1.0).acos();
        spherical(1.0, theta, phi)
    }

    /// Random point on the surface of a sphere of given radius.
    pub fn on_sphere(&mut self, radius: f32) -> Vec3 {
        self.direction() * radius
    }

    /// Random point inside a sphere, radius drawn as `u^(1/3) * max_radius`.
    pub fn in_sphere_cbrt(&mut self, max_radius: f32) -> Vec3 {
        let dir = self.direction();
        dir * (self.random().cbrt() * max_radius)
    }

    /// Random polar angle pair `(θ, φ)` with both drawn uniformly,
    /// `θ ∈ [0, 2π)` and `φ ∈ [0, π)`.
    pub fn polar_pair(&mut self) -> (f32, f32) {
        (self.angle(), self.random() * PI)
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert spherical coordinates to Cartesian.
///
/// `theta` is the azimuth in the x/y plane, `phi` the angle from +z.
#[inline]
pub fn spherical(radius: f32, theta: f32, phi: f32) -> Vec3 {
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}
