//! Target shapes for the particle cloud.
//!
//! A shape is a pure point sampler: given a count it returns that many
//! independent random points drawn from the shape's volume or surface. No
//! mesh data is involved.
//!
//! # Built-in shapes
//!
//! | Shape | Sampling |
//! |-------|----------|
//! | [`ShapeId::Heart`] | parametric heart curve, extruded along z, jittered |
//! | [`ShapeId::Flower`] | five-petal rose radius on a random polar pair |
//! | [`ShapeId::Saturn`] | 40% sphere surface, 60% tilted ring band |
//! | [`ShapeId::Buddha`] | head and body spheres over a rejection-sampled base |
//! | [`ShapeId::Fireworks`] | cube-root radius burst |
//!
//! # Exact count
//!
//! Callers never see a short buffer. [`fill_exact`] truncates long output and
//! pads short output with the origin, logging a warning when it pads.

use crate::spawn::{spherical, Sampler};
use crate::Vec3;
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Attempts per point before the buddha base gives up on a sample.
pub const MAX_REJECTION_ATTEMPTS: u32 = 64;

/// Known shape identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeId {
    Heart,
    Flower,
    Saturn,
    Buddha,
    Fireworks,
}

impl ShapeId {
    /// Every built-in shape, in menu order.
    pub const ALL: [ShapeId; 5] = [
        ShapeId::Heart,
        ShapeId::Flower,
        ShapeId::Saturn,
        ShapeId::Buddha,
        ShapeId::Fireworks,
    ];

    /// Lowercase identifier used by the selection surface.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeId::Heart => "heart",
            ShapeId::Flower => "flower",
            ShapeId::Saturn => "saturn",
            ShapeId::Buddha => "buddha",
            ShapeId::Fireworks => "fireworks",
        }
    }

    /// Look up a shape by identifier. Unknown names return `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// The built-in generator for this shape.
    pub fn generator(&self) -> Box<dyn ShapeGenerator> {
        match self {
            ShapeId::Heart => Box::new(Heart),
            ShapeId::Flower => Box::new(Flower),
            ShapeId::Saturn => Box::new(Saturn),
            ShapeId::Buddha => Box::new(Buddha),
            ShapeId::Fireworks => Box::new(Fireworks),
        }
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown shape '{}'", s))
    }
}

/// A swappable source of target points.
///
/// Implementations should return `count` points but may return fewer (for
/// example when rejection sampling runs out of attempts). Use [`generate`]
/// to get the exact-count guarantee.
pub trait ShapeGenerator: Send + Sync {
    /// Draw up to `count` points.
    fn sample(&self, count: usize, sampler: &mut Sampler) -> Vec<Vec3>;
}

impl<F> ShapeGenerator for F
where
    F: Fn(usize, &mut Sampler) -> Vec<Vec3> + Send + Sync,
{
    fn sample(&self, count: usize, sampler: &mut Sampler) -> Vec<Vec3> {
        self(count, sampler)
    }
}

/// Sample a generator and force the result to exactly `count` points.
pub fn generate(generator: &dyn ShapeGenerator, count: usize, sampler: &mut Sampler) -> Vec<Vec3> {
    fill_exact(generator.sample(count, sampler), count)
}

/// Truncate or origin-pad `points` to exactly `count` entries.
pub fn fill_exact(mut points: Vec<Vec3>, count: usize) -> Vec<Vec3> {
    if points.len() < count {
        log::warn!(
            "shape produced {} of {} points, padding with origin",
            points.len(),
            count
        );
    }
    points.resize(count, Vec3::ZERO);
    points
}

// ============================================================================
// Built-in generators
// ============================================================================

/// Parametric heart: `x = 16 sin³t`, `y = 13 cos t − 5 cos 2t − 2 cos 3t − cos 4t`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Heart;

impl Heart {
    const SCALE: f32 = 0.1;
    const THICKNESS: f32 = 10.0;
    const SPREAD: f32 = 0.2;
}

impl ShapeGenerator for Heart {
    fn sample(&self, count: usize, sampler: &mut Sampler) -> Vec<Vec3> {
        (0..count)
            .map(|_| {
                let t = sampler.angle();
                let x = 16.0 * t.sin().powi(3);
                let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
                let z = sampler.centered(Self::THICKNESS);
                Vec3::new(x, y, z) * Self::SCALE + sampler.centered_vec3(Self::SPREAD)
            })
            .collect()
    }
}

/// Rose curve `r = cos(kθ) + 2` wrapped onto a random polar pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flower;

impl Flower {
    const PETALS: f32 = 5.0;
    const FLATTEN: f32 = 0.5;
    const SCALE: f32 = 1.5;
}

impl ShapeGenerator for Flower {
    fn sample(&self, count: usize, sampler: &mut Sampler) -> Vec<Vec3> {
        (0..count)
            .map(|_| {
                let (theta, phi) = sampler.polar_pair();
                // +2 keeps the radius away from zero between petals
                let r = (Self::PETALS * theta).cos() + 2.0;
                let mut p = spherical(r, theta, phi);
                p.z *= Self::FLATTEN;
                p * Self::SCALE
            })
            .collect()
    }
}

/// Sphere planet with a tilted ring.
#[derive(Debug, Clone, Copy, Default)]
pub struct Saturn;

impl Saturn {
    const PLANET_RATIO: f32 = 0.4;
    const PLANET_RADIUS: f32 = 1.5;
    const RING_INNER: f32 = 2.2;
    const RING_WIDTH: f32 = 1.5;
    const RING_THICKNESS: f32 = 0.1;
    const TILT: f32 = PI / 6.0;
}

impl ShapeGenerator for Saturn {
    fn sample(&self, count: usize, sampler: &mut Sampler) -> Vec<Vec3> {
        let planet = (count as f32 * Self::PLANET_RATIO).floor() as usize;
        let mut points = Vec::with_capacity(count);

        for _ in 0..planet {
            points.push(sampler.on_sphere(Self::PLANET_RADIUS));
        }

        let (sin_t, cos_t) = Self::TILT.sin_cos();
        for _ in planet..count {
            let theta = sampler.angle();
            let r = sampler.random_range(Self::RING_INNER, Self::RING_INNER + Self::RING_WIDTH);
            let x = r * theta.cos();
            let z = r * theta.sin();
            let y = sampler.centered(Self::RING_THICKNESS);
            points.push(Vec3::new(x, y * cos_t - z * sin_t, y * sin_t + z * cos_t));
        }

        points
    }
}

/// Seated figure built from implicit surfaces only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Buddha;

impl Buddha {
    const HEAD_RATIO: f32 = 0.15;
    const BODY_RATIO: f32 = 0.35;
    const HEAD_CENTER: Vec3 = Vec3::new(0.0, 1.5, 0.0);
    const HEAD_RADIUS: f32 = 0.6;
    const BODY_RADIUS: f32 = 1.0;
    const BASE_CENTER_Y: f32 = -1.0;
    const BASE_AXES: Vec3 = Vec3::new(1.8, 0.8, 1.2);
    const BASE_MAX_Y: f32 = 0.5;

    /// One base sample, or `None` once the attempt cap is exhausted.
    fn base_point(sampler: &mut Sampler) -> Option<Vec3> {
        (0..MAX_REJECTION_ATTEMPTS).find_map(|_| {
            let p = sampler.direction() * Self::BASE_AXES + Vec3::Y * Self::BASE_CENTER_Y;
            (p.y < Self::BASE_MAX_Y).then_some(p)
        })
    }
}

impl ShapeGenerator for Buddha {
    fn sample(&self, count: usize, sampler: &mut Sampler) -> Vec<Vec3> {
        let head = (count as f32 * Self::HEAD_RATIO).floor() as usize;
        let body = ((count as f32 * Self::BODY_RATIO).floor() as usize).min(count - head);
        let base = count - head - body;

        let mut points = Vec::with_capacity(count);
        for _ in 0..head {
            points.push(Self::HEAD_CENTER + sampler.on_sphere(Self::HEAD_RADIUS));
        }
        for _ in 0..body {
            points.push(sampler.on_sphere(Self::BODY_RADIUS));
        }
        // Rejected samples are dropped; fill_exact pads them with the origin.
        points.extend((0..base).filter_map(|_| Self::base_point(sampler)));
        points
    }
}

/// Burst with density weighted toward the outer shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fireworks;

impl Fireworks {
    const MAX_RADIUS: f32 = 4.0;
}

impl ShapeGenerator for Fireworks {
    fn sample(&self, count: usize, sampler: &mut Sampler) -> Vec<Vec3> {
        (0..count)
            .map(|_| sampler.in_sphere_cbrt(Self::MAX_RADIUS))
            .collect()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Named collection of shape generators.
///
/// Pre-populated with the built-in shapes by [`ShapeRegistry::new`]; hosts can
/// add or replace entries with [`ShapeRegistry::register`].
pub struct ShapeRegistry {
    /// Named generators in registration order.
    shapes: Vec<(String, Box<dyn ShapeGenerator>)>,
}

impl ShapeRegistry {
    /// Registry holding every [`ShapeId`].
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for id in ShapeId::ALL {
            registry.register(id.name(), id.generator());
        }
        registry
    }

    /// Registry with no shapes.
    pub fn empty() -> Self {
        Self { shapes: Vec::new() }
    }

    /// Add a generator, replacing any existing entry with the same name.
    pub fn register(&mut self, name: impl Into<String>, generator: Box<dyn ShapeGenerator>) {
        let name = name.into();
        match self.shapes.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = generator,
            None => self.shapes.push((name, generator)),
        }
    }

    /// Look up a generator by name.
    pub fn get(&self, name: &str) -> Option<&dyn ShapeGenerator> {
        self.shapes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, g)| g.as_ref())
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().map(|(n, _)| n.as_str())
    }

    /// Get number of registered shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Generate exactly `count` points for `name`, or `None` if it is unknown.
    pub fn generate(&self, name: &str, count: usize, sampler: &mut Sampler) -> Option<Vec<Vec3>> {
        self.get(name).map(|g| generate(g, count, sampler))
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
