//! Simulation context and per-frame step.
//!
//! [`Simulation`] owns every piece of mutable state: the particle field, the
//! aggregate transform, the shape registry, and the render style. The host
//! owns the frame loop and calls [`Simulation::advance`] once per display
//! refresh. Renderers only ever see a borrowed [`FrameView`].
//!
//! ```ignore
//! let mut sim = Simulation::from_config(&EngineConfig::default());
//! let mut feed = spawn_gesture_source(camera);
//! let mut clock = FrameClock::new();
//!
//! loop {
//!     let reading = feed.latest();
//!     let frame = sim.advance(&reading, clock.tick());
//!     renderer.draw(frame.positions_flat(), frame.model_matrix());
//! }
//! ```

use crate::config::{EngineConfig, FieldParams, TransformParams};
use crate::gesture::{GestureFeed, GestureReading};
use crate::particles::ParticleField;
use crate::shapes::{ShapeGenerator, ShapeId, ShapeRegistry};
use crate::spawn::Sampler;
use crate::time::frame_scale;
use crate::transform::FieldTransform;
use crate::visuals::RenderStyle;
use crate::{Mat4, Vec3};
use bytemuck::{Pod, Zeroable};

/// The whole engine state for one point cloud.
pub struct Simulation {
    field: ParticleField,
    transform: FieldTransform,
    transform_params: TransformParams,
    shapes: ShapeRegistry,
    shape: Option<String>,
    style: RenderStyle,
    sampler: Sampler,
    frame: u64,
}

impl Simulation {
    /// Simulation with `particle_count` particles and default tuning,
    /// morphing toward the heart.
    pub fn new(particle_count: usize) -> Self {
        Self::from_config(&EngineConfig {
            particle_count,
            ..EngineConfig::default()
        })
    }

    /// Build a simulation from a configuration.
    ///
    /// An unknown `initial_shape` leaves the particles at their scattered
    /// start positions.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut sampler = config.seed.map(Sampler::seeded).unwrap_or_default();
        let field = ParticleField::new(config.particle_count, config.field.clone(), &mut sampler);

        let mut sim = Self {
            field,
            transform: FieldTransform::new(),
            transform_params: config.transform.clone(),
            shapes: ShapeRegistry::new(),
            shape: None,
            style: config.style,
            sampler,
            frame: 0,
        };
        if !sim.set_shape(&config.initial_shape) {
            log::warn!("initial shape '{}' is not registered", config.initial_shape);
        }
        log::info!(
            "simulation ready: {} particles, shape {:?}",
            sim.field.len(),
            sim.shape
        );
        sim
    }

    // ========== Shape selection ==========

    /// Morph toward the shape registered as `name`.
    ///
    /// Unknown names are ignored and return `false`. Selecting the shape that
    /// is already the target does nothing, so repeated selection is
    /// idempotent.
    pub fn set_shape(&mut self, name: &str) -> bool {
        if self.shape.as_deref() == Some(name) {
            return true;
        }
        let Some(points) = self.shapes.generate(name, self.field.len(), &mut self.sampler) else {
            log::debug!("ignoring unknown shape '{}'", name);
            return false;
        };
        self.field.retarget_points(points);
        self.shape = Some(name.to_string());
        log::debug!("retargeted to '{}'", name);
        true
    }

    /// Morph toward a built-in shape.
    pub fn set_shape_id(&mut self, id: ShapeId) -> bool {
        self.set_shape(id.name())
    }

    /// Register an extra shape, or replace a built-in one.
    ///
    /// Replacing the current shape does not retarget until it is selected
    /// again.
    pub fn register_shape(&mut self, name: impl Into<String>, generator: Box<dyn ShapeGenerator>) {
        let name = name.into();
        if self.shapes.contains(&name) {
            log::debug!("replacing shape '{}'", name);
        }
        if self.shape.as_deref() == Some(name.as_str()) {
            self.shape = None;
        }
        self.shapes.register(name, generator);
    }

    /// Name of the current target shape, if any.
    pub fn shape(&self) -> Option<&str> {
        self.shape.as_deref()
    }

    /// The shape registry.
    pub fn shapes(&self) -> &ShapeRegistry {
        &self.shapes
    }

    // ========== Frame step ==========

    /// Advance particles and transform by `dt` seconds using `gesture`.
    ///
    /// Never fails: a missing or failed gesture is just factor 0 and idle
    /// drift.
    pub fn advance(&mut self, gesture: &GestureReading, dt: f32) -> FrameView<'_> {
        let frames = frame_scale(dt);
        if frames > 0.0 {
            self.field.advance(gesture.effective_factor(), frames);
            self.transform.update(gesture, &self.transform_params, frames);
            self.frame += 1;
        }
        self.view()
    }

    /// Pull the newest reading from `feed`, advance, and hand the frame to `sink`.
    ///
    /// Returns the reading used so UI glue can show its status.
    pub fn step(&mut self, feed: &mut GestureFeed, sink: &mut dyn RenderSink, dt: f32) -> GestureReading {
        let reading = feed.latest();
        let view = self.advance(&reading, dt);
        sink.present(&view);
        reading
    }

    /// Read-only view of the current state.
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            positions: self.field.positions(),
            transform: self.transform,
            style: &self.style,
            frame: self.frame,
        }
    }

    // ========== Accessors ==========

    /// The particle field.
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Field tuning constants.
    pub fn field_params(&self) -> &FieldParams {
        self.field.params()
    }

    /// Replace the field tuning constants. Buffers are untouched.
    pub fn set_field_params(&mut self, params: FieldParams) {
        self.field.set_params(params);
    }

    /// Overwrite the smoothed gesture factor, clamped to `[0, 1]`.
    pub fn set_smoothed_factor(&mut self, factor: f32) {
        self.field.set_smoothed_factor(factor);
    }

    /// Current aggregate transform.
    pub fn transform(&self) -> FieldTransform {
        self.transform
    }

    /// Transform tuning constants.
    pub fn transform_params(&self) -> &TransformParams {
        &self.transform_params
    }

    /// Replace the transform tuning constants.
    pub fn set_transform_params(&mut self, params: TransformParams) {
        self.transform_params = params;
    }

    /// Frames advanced so far. Paused steps do not count.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Current render style.
    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Set the render color.
    pub fn set_color(&mut self, rgb: Vec3) {
        self.style.set_color(rgb);
    }

    /// Set the render color from `#rrggbb`. Invalid strings are ignored.
    pub fn set_color_hex(&mut self, hex: &str) -> bool {
        self.style.set_color_hex(hex)
    }

    /// Set the render point size.
    pub fn set_point_size(&mut self, size: f32) {
        self.style.set_point_size(size);
    }
}

// ========== Render sink ==========

/// Anything that draws (or records) a frame.
pub trait RenderSink {
    fn present(&mut self, frame: &FrameView<'_>);
}

/// Per-frame draw parameters laid out for a GPU uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct TransformUniform {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
    /// RGB color and opacity.
    pub color: [f32; 4],
    pub point_size: f32,
    pub _padding: [f32; 3],
}

/// Borrowed, read-only snapshot of one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    positions: &'a [Vec3],
    transform: FieldTransform,
    style: &'a RenderStyle,
    frame: u64,
}

impl<'a> FrameView<'a> {
    /// Particle positions in model space.
    pub fn positions(&self) -> &'a [Vec3] {
        self.positions
    }

    /// Positions as a flat `N × 3` float slice.
    pub fn positions_flat(&self) -> &'a [f32] {
        bytemuck::cast_slice(self.positions)
    }

    /// Positions as raw bytes for vertex buffer upload.
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.positions)
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether there are no particles.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Aggregate transform.
    pub fn transform(&self) -> FieldTransform {
        self.transform
    }

    /// Render style.
    pub fn style(&self) -> &'a RenderStyle {
        self.style
    }

    /// Frame number this view was taken at.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Model matrix for the whole cloud.
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.model_matrix()
    }

    /// Uniform block for the renderer.
    pub fn uniform(&self) -> TransformUniform {
        TransformUniform {
            model: self.model_matrix().to_cols_array_2d(),
            color: self.style.color_vec().extend(self.style.opacity).to_array(),
            point_size: self.style.point_size,
            _padding: [0.0; 3],
        }
    }

    /// Axis-aligned bounds of the particles in model space.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FRAME_DT;
    use crate::Vec2;
    use std::sync::mpsc;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(u64, FieldTransform)>,
    }

    impl RenderSink for Recorder {
        fn present(&mut self, frame: &FrameView<'_>) {
            self.frames.push((frame.frame(), frame.transform()));
        }
    }

    fn seeded(count: usize) -> Simulation {
        Simulation::from_config(&EngineConfig {
            particle_count: count,
            seed: Some(42),
            ..EngineConfig::default()
        })
    }

    #[test]
    fn test_starts_on_initial_shape() {
        let sim = seeded(64);
        assert_eq!(sim.shape(), Some("heart"));
        assert_eq!(sim.field().len(), 64);
        assert_eq!(sim.frame(), 0);
    }

    #[test]
    fn test_unknown_initial_shape_keeps_scatter() {
        let sim = Simulation::from_config(&EngineConfig {
            particle_count: 8,
            initial_shape: "dodecahedron".into(),
            seed: Some(1),
            ..EngineConfig::default()
        });
        assert_eq!(sim.shape(), None);
        assert_eq!(sim.field().targets(), sim.field().positions());
    }

    #[test]
    fn test_unknown_shape_is_noop() {
        let mut sim = seeded(32);
        let before = sim.field().targets().to_vec();
        assert!(!sim.set_shape("teapot"));
        assert_eq!(sim.field().targets(), before.as_slice());
        assert_eq!(sim.shape(), Some("heart"));
    }

    #[test]
    fn test_same_shape_twice_is_idempotent() {
        let mut sim = seeded(32);
        assert!(sim.set_shape("saturn"));
        let once = sim.field().targets().to_vec();
        assert!(sim.set_shape("saturn"));
        assert_eq!(sim.field().targets(), once.as_slice());
    }

    #[test]
    fn test_register_shape_replacing_current_allows_reselect() {
        let mut sim = seeded(4);
        sim.register_shape("heart", Box::new(|n: usize, _: &mut Sampler| vec![Vec3::Y; n]));
        assert_eq!(sim.shape(), None);
        assert!(sim.set_shape("heart"));
        assert_eq!(sim.field().targets(), &[Vec3::Y; 4]);
    }

    #[test]
    fn test_field_params_setter_keeps_buffers() {
        let mut sim = seeded(8);
        let targets = sim.field().targets().to_vec();
        sim.set_field_params(FieldParams {
            lerp_speed: 1.0,
            ..FieldParams::default()
        });
        assert_eq!(sim.field_params().lerp_speed, 1.0);
        assert_eq!(sim.field().targets(), targets.as_slice());

        sim.advance(&GestureReading::NONE, FRAME_DT);
        assert_eq!(sim.view().len(), 8);
        for (p, t) in sim.field().positions().iter().zip(&targets) {
            assert!((*p - *t).length() < 1e-4);
        }
    }

    #[test]
    fn test_set_smoothed_factor_clamps() {
        let mut sim = seeded(4);
        sim.set_smoothed_factor(3.0);
        assert_eq!(sim.field().smoothed_factor(), 1.0);
        sim.set_smoothed_factor(f32::NAN);
        assert_eq!(sim.field().smoothed_factor(), 0.0);
    }

    #[test]
    fn test_paused_step_changes_nothing() {
        let mut sim = seeded(16);
        let before = sim.field().positions().to_vec();
        let view = sim.advance(&GestureReading::detected(1.0, Vec2::ZERO), 0.0);
        assert_eq!(view.positions(), before.as_slice());
        assert_eq!(view.transform(), FieldTransform::new());
        assert_eq!(sim.frame(), 0);
    }

    #[test]
    fn test_view_flat_layout() {
        let mut sim = seeded(10);
        let view = sim.advance(&GestureReading::NONE, FRAME_DT);
        assert_eq!(view.len(), 10);
        assert_eq!(view.positions_flat().len(), 30);
        assert_eq!(view.as_bytes().len(), 120);
        assert_eq!(view.positions_flat()[3], view.positions()[1].x);
        assert_eq!(view.frame(), 1);
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<TransformUniform>(), 96);
        let sim = seeded(4);
        let uniform = sim.view().uniform();
        assert_eq!(uniform.model, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(uniform.color[3], sim.style().opacity);
        assert_eq!(&uniform.color[..3], &sim.style().color[..]);
        assert_eq!(bytemuck::bytes_of(&uniform).len(), 96);
    }

    #[test]
    fn test_style_is_pass_through() {
        let mut a = seeded(16);
        let mut b = seeded(16);
        b.set_color_hex("#00ff00");
        b.set_point_size(0.5);
        for _ in 0..5 {
            a.advance(&GestureReading::NONE, FRAME_DT);
            b.advance(&GestureReading::NONE, FRAME_DT);
        }
        assert_eq!(a.field().positions(), b.field().positions());
        assert_eq!(b.style().color, [0.0, 1.0, 0.0]);
        assert_eq!(b.style().point_size, 0.5);
    }

    #[test]
    fn test_step_presents_latest_reading() {
        let mut sim = seeded(8);
        let (tx, rx) = mpsc::channel();
        let mut feed = GestureFeed::new(rx);
        tx.send(GestureReading::detected(0.9, Vec2::new(0.9, 0.5))).unwrap();

        let mut sink = Recorder::default();
        let reading = sim.step(&mut feed, &mut sink, FRAME_DT);

        assert!(reading.detected);
        assert_eq!(sink.frames.len(), 1);
        assert_eq!(sink.frames[0].0, 1);
        assert!(sink.frames[0].1.rotation_y > 0.0);
    }

    #[test]
    fn test_bounds() {
        let sim = seeded(100);
        let (lo, hi) = sim.view().bounds().unwrap();
        assert!(sim.view().positions().iter().all(|p| p.cmpge(lo).all() && p.cmple(hi).all()));
    }
}
