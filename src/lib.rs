//! # morphcloud
//!
//! A large point cloud that morphs between named target shapes and reacts in
//! real time to a hand-gesture signal.
//!
//! morphcloud is the simulation core only. It owns the particle buffers and
//! the cloud's pose, advances them once per frame, and hands renderers a
//! read-only view. Capture devices and drawing are left to the host.
//!
//! ## Quick Start
//!
//! ```ignore
//! use morphcloud::prelude::*;
//!
//! let mut sim = Simulation::new(20_000);
//! sim.set_shape("saturn");
//!
//! let reading = GestureReading::from_hands(&hands_from_camera);
//! let frame = sim.advance(&reading, FRAME_DT);
//! upload(frame.as_bytes(), frame.uniform());
//! ```
//!
//! ## Core Concepts
//!
//! ### Shapes
//!
//! A shape is a [`ShapeGenerator`]: a function from a point count to random
//! points on or in the shape. Five are built in ([`ShapeId`]); more can be
//! registered at runtime. Generators that come up short are padded with the
//! origin, and unknown shape names are ignored.
//!
//! ### Gesture
//!
//! Hand landmarks become a [`GestureReading`]: an openness factor in
//! `[0, 1]` and a screen position. Two hands use wrist separation, one hand
//! uses the thumb/index pinch. Capture can run on its own thread and be read
//! through a [`GestureFeed`] without blocking the frame loop.
//!
//! ### Field and transform
//!
//! Every frame, particles move a fixed fraction toward their target, scaled
//! outward and jittered by the smoothed factor ([`ParticleField`]). The whole
//! cloud rotates and shifts with the hand position, or drifts on its own when
//! no hand is seen ([`FieldTransform`]).
//!
//! ## Tuning
//!
//! | Constant | Default | Effect |
//! |----------|---------|--------|
//! | `lerp_speed` | 0.05 | fraction of the distance covered per frame |
//! | `k_expand` | 2.0 | cloud is `1 + k_expand` times larger at factor 1 |
//! | `k_noise` | 0.5 | jitter magnitude at factor 1 |
//! | `vertical_range` | 4.0 | offset span between screen top and bottom |
//! | `rotation_gain` | 0.1 | spin speed per unit of horizontal deviation |
//!
//! All of them live in [`EngineConfig`] and can be loaded from JSON.

pub mod config;
pub mod error;
pub mod gesture;
pub mod particles;
pub mod shapes;
mod simulation;
pub mod spawn;
pub mod time;
pub mod transform;
pub mod visuals;

pub use bytemuck;
pub use config::{EngineConfig, FieldParams, TransformParams};
pub use error::{ConfigError, GestureError};
pub use gesture::{
    spawn_gesture_source, GestureFeed, GestureReading, GestureSource, GestureStatus, HandLandmarks,
    ScriptedGestureSource,
};
pub use glam::{Mat4, Vec2, Vec3};
pub use particles::ParticleField;
pub use shapes::{ShapeGenerator, ShapeId, ShapeRegistry};
pub use simulation::{FrameView, RenderSink, Simulation, TransformUniform};
pub use spawn::Sampler;
pub use transform::FieldTransform;
pub use visuals::{BlendMode, RenderStyle};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use morphcloud::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{EngineConfig, FieldParams, TransformParams};
    pub use crate::gesture::{
        spawn_gesture_source, GestureFeed, GestureReading, GestureSource, GestureStatus,
        HandLandmarks, ScriptedGestureSource,
    };
    pub use crate::particles::ParticleField;
    pub use crate::shapes::{ShapeGenerator, ShapeId, ShapeRegistry};
    pub use crate::simulation::{FrameView, RenderSink, Simulation, TransformUniform};
    pub use crate::spawn::Sampler;
    pub use crate::time::{FrameClock, FRAME_DT};
    pub use crate::transform::FieldTransform;
    pub use crate::visuals::{BlendMode, RenderStyle};
    pub use crate::{Mat4, Vec2, Vec3};
}
