//! Headless demo: runs the engine against a scripted gesture stream and logs
//! what a renderer would receive.
//!
//! Run with: `cargo run --release -- [shape] [frames] [config.json]`

use std::thread;
use std::time::Duration;

use morphcloud::prelude::*;
use morphcloud::gesture::DetectionFrame;
use morphcloud::GestureError;

/// Capture cadence of the simulated camera.
const CAPTURE_INTERVAL: Duration = Duration::from_millis(33);

/// Frames between automatic shape changes.
const SHAPE_PERIOD: u64 = 150;

/// Sink that logs a summary every second of frames.
struct LogSink {
    every: u64,
}

impl RenderSink for LogSink {
    fn present(&mut self, frame: &FrameView<'_>) {
        if frame.frame() % self.every != 0 {
            return;
        }
        let t = frame.transform();
        let extent = frame
            .bounds()
            .map(|(lo, hi)| hi - lo)
            .unwrap_or(Vec3::ZERO);
        log::info!(
            "frame {:>4}  extent ({:5.2}, {:5.2}, {:5.2})  rot ({:+.3}, {:+.3})  y {:+.3}",
            frame.frame(),
            extent.x,
            extent.y,
            extent.z,
            t.rotation_x,
            t.rotation_y,
            t.position_y,
        );
    }
}

/// A capture session: nobody, then one hand pinching open while drifting
/// up and right, then two hands spreading apart, then a camera dropout.
fn scripted_session() -> Vec<DetectionFrame> {
    let mut frames: Vec<DetectionFrame> = Vec::new();

    frames.extend((0..60).map(|_| Ok(Vec::new())));

    for i in 0..90 {
        let t = i as f32 / 89.0;
        let wrist = Vec2::new(0.5 + 0.35 * t, 0.6 - 0.4 * t);
        let thumb = wrist + Vec2::new(0.0, -0.15);
        let index = thumb + Vec2::new(0.02 + 0.2 * t, 0.0);
        frames.push(Ok(vec![HandLandmarks::pinch(wrist, thumb, index)]));
    }

    for i in 0..90 {
        let half = 0.05 + 0.3 * (i as f32 / 89.0);
        let left = Vec2::new(0.5 - half, 0.5);
        let right = Vec2::new(0.5 + half, 0.5);
        frames.push(Ok(vec![
            HandLandmarks::pinch(left, left, left),
            HandLandmarks::pinch(right, right, right),
        ]));
    }

    frames.push(Err(GestureError::DeviceUnavailable("camera unplugged".into())));
    frames
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let shape = args.next();
    let total_frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(600);
    let config = match args.next() {
        Some(path) => EngineConfig::load(&path)?,
        None => EngineConfig::default(),
    };

    let mut sim = Simulation::from_config(&config);
    if let Some(name) = &shape {
        if !sim.set_shape(name) {
            log::warn!("unknown shape '{}', keeping '{}'", name, config.initial_shape);
        }
    }

    let mut feed = spawn_gesture_source(ScriptedGestureSource::new(scripted_session(), CAPTURE_INTERVAL));
    let mut sink = LogSink { every: 60 };
    let mut clock = FrameClock::fixed(FRAME_DT);
    let mut status = GestureStatus::Searching;

    for _ in 0..total_frames {
        let reading = sim.step(&mut feed, &mut sink, clock.tick());

        if reading.status() != status {
            status = reading.status();
            log::info!("gesture status: {:?}", status);
        }

        // Cycle shapes while nobody is steering, unless one was pinned on the command line.
        if shape.is_none() && !reading.detected && sim.frame() % SHAPE_PERIOD == 0 {
            let next = ShapeId::ALL[(sim.frame() / SHAPE_PERIOD) as usize % ShapeId::ALL.len()];
            sim.set_shape_id(next);
            log::info!("shape -> {}", next);
        }

        thread::sleep(Duration::from_secs_f32(FRAME_DT));
    }

    Ok(())
}
