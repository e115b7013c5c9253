//! Gesture signal — from hand landmarks to a normalized reading.
//!
//! A landmark detector reports zero, one, or two hands per capture frame,
//! each as 21 normalized `(x, y)` points. This module turns that into a
//! [`GestureReading`]: an openness `factor` in `[0, 1]` and a screen-space
//! `center`.
//!
//! ## Mapping
//!
//! | Hands | Factor | Center |
//! |---|---|---|
//! | 2 | `(wrist distance − 0.1) × 2.0` | midpoint of the wrists |
//! | 1 | `(thumb tip ↔ index tip − 0.02) × 5.0` | the wrist |
//! | 0 / failure | `0`, not detected | none |
//!
//! One hand uses the pinch for openness but the wrist for position: pinch
//! geometry jitters too much to steer with.
//!
//! ## Delivery
//!
//! Capture runs on its own cadence. A [`GestureSource`] is spawned on a
//! thread and sends readings over a channel; the frame loop reads the most
//! recent one through a [`GestureFeed`] without ever blocking.

use crate::error::GestureError;
use crate::Vec2;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

/// Landmarks per hand in the MediaPipe hand topology.
pub const LANDMARK_COUNT: usize = 21;
/// Landmark index of the wrist.
pub const WRIST: usize = 0;
/// Landmark index of the thumb tip.
pub const THUMB_TIP: usize = 4;
/// Landmark index of the index fingertip.
pub const INDEX_TIP: usize = 8;

/// Wrist distance that maps to factor 0 with two hands.
pub const TWO_HAND_OFFSET: f32 = 0.1;
/// Gain applied to the two-hand wrist distance.
pub const TWO_HAND_GAIN: f32 = 2.0;
/// Pinch distance that maps to factor 0 with one hand.
pub const PINCH_OFFSET: f32 = 0.02;
/// Gain applied to the one-hand pinch distance.
pub const PINCH_GAIN: f32 = 5.0;

// ════════════════════════════════════════════════════════════════════════════
// Landmarks
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand: an ordered list of normalized 2-D landmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    points: Vec<Vec2>,
}

impl HandLandmarks {
    /// Wrap a landmark list as delivered by the detector.
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Synthetic hand with every landmark at the wrist except the two pinch
    /// tips. Handy for simulated sources and tests.
    pub fn pinch(wrist: Vec2, thumb_tip: Vec2, index_tip: Vec2) -> Self {
        let mut points = vec![wrist; LANDMARK_COUNT];
        points[THUMB_TIP] = thumb_tip;
        points[INDEX_TIP] = index_tip;
        Self { points }
    }

    /// Landmark at `index`, if present.
    pub fn get(&self, index: usize) -> Option<Vec2> {
        self.points.get(index).copied()
    }

    /// The wrist landmark.
    pub fn wrist(&self) -> Option<Vec2> {
        self.get(WRIST)
    }

    /// Distance between thumb tip and index fingertip.
    pub fn pinch_distance(&self) -> Option<f32> {
        Some(self.get(THUMB_TIP)?.distance(self.get(INDEX_TIP)?))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureReading
// ════════════════════════════════════════════════════════════════════════════

/// What the UI should show about gesture tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureStatus {
    /// At least one hand is being tracked.
    Detected,
    /// No hands in view; the cloud drifts on its own.
    Searching,
    /// The capture source failed.
    SourceError,
}

/// Normalized gesture state for one capture frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureReading {
    /// Whether any hand was found.
    pub detected: bool,
    /// Openness in `[0, 1]`. Always `0` when not detected.
    pub factor: f32,
    /// Normalized screen position in `[0, 1]²`, `None` when not detected.
    pub center: Option<Vec2>,
    /// Set when the capture source failed this frame.
    pub source_error: bool,
}

impl GestureReading {
    /// Reading for "no hands in view".
    pub const NONE: GestureReading = GestureReading {
        detected: false,
        factor: 0.0,
        center: None,
        source_error: false,
    };

    /// A detected reading. `factor` is clamped to `[0, 1]`.
    pub fn detected(factor: f32, center: Vec2) -> Self {
        Self {
            detected: true,
            factor: clamp_factor(factor),
            center: Some(center),
            source_error: false,
        }
    }

    /// Reading for a failed capture: not detected, error flag raised.
    pub fn failed() -> Self {
        Self {
            source_error: true,
            ..Self::NONE
        }
    }

    /// Convert one frame of detector output into a reading.
    ///
    /// With more than two hands only the first two are used. A hand missing
    /// the landmarks a rule needs counts as no detection.
    pub fn from_hands(hands: &[HandLandmarks]) -> Self {
        match hands {
            [] => None,
            [hand] => Self::from_one_hand(hand),
            [a, b, ..] => Self::from_two_hands(a, b),
        }
        .unwrap_or(Self::NONE)
    }

    /// Convert a detector result, folding failures into [`GestureReading::failed`].
    pub fn from_detection(result: Result<&[HandLandmarks], &GestureError>) -> Self {
        match result {
            Ok(hands) => Self::from_hands(hands),
            Err(e) => {
                log::warn!("gesture source error: {}", e);
                Self::failed()
            }
        }
    }

    fn from_two_hands(a: &HandLandmarks, b: &HandLandmarks) -> Option<Self> {
        let (wa, wb) = (a.wrist()?, b.wrist()?);
        let factor = (wa.distance(wb) - TWO_HAND_OFFSET) * TWO_HAND_GAIN;
        Some(Self::detected(factor, (wa + wb) * 0.5))
    }

    fn from_one_hand(hand: &HandLandmarks) -> Option<Self> {
        let factor = (hand.pinch_distance()? - PINCH_OFFSET) * PINCH_GAIN;
        Some(Self::detected(factor, hand.wrist()?))
    }

    /// Factor fed to the particle field: the reading's factor, or `0` when
    /// nothing is detected.
    pub fn effective_factor(&self) -> f32 {
        if self.detected {
            self.factor
        } else {
            0.0
        }
    }

    /// Tracking status for UI feedback.
    pub fn status(&self) -> GestureStatus {
        if self.source_error {
            GestureStatus::SourceError
        } else if self.detected {
            GestureStatus::Detected
        } else {
            GestureStatus::Searching
        }
    }
}

impl Default for GestureReading {
    fn default() -> Self {
        Self::NONE
    }
}

/// Clamp to `[0, 1]`, mapping NaN to `0`.
fn clamp_factor(factor: f32) -> f32 {
    if factor.is_nan() {
        0.0
    } else {
        factor.clamp(0.0, 1.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSource — capture running on its own thread
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`GestureReading`]s over a channel.
///
/// `run` owns the capture loop and returns when the receiver hangs up or the
/// source is exhausted.
pub trait GestureSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<GestureReading>);
}

/// Spawn a gesture source on its own thread and return a feed reading from it.
pub fn spawn_gesture_source<G: GestureSource>(source: G) -> GestureFeed {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    GestureFeed::new(rx)
}

/// One scripted capture frame: the detector output for that frame.
pub type DetectionFrame = Result<Vec<HandLandmarks>, GestureError>;

/// Gesture source that replays a fixed list of detector frames.
///
/// Stands in for a camera in demos and tests.
pub struct ScriptedGestureSource {
    frames: Vec<DetectionFrame>,
    interval: Duration,
}

impl ScriptedGestureSource {
    /// Replay `frames`, sleeping `interval` between them.
    pub fn new(frames: Vec<DetectionFrame>, interval: Duration) -> Self {
        Self { frames, interval }
    }
}

impl GestureSource for ScriptedGestureSource {
    fn run(self: Box<Self>, tx: Sender<GestureReading>) {
        let Self { frames, interval } = *self;
        for frame in frames {
            let reading = GestureReading::from_detection(frame.as_deref());
            if tx.send(reading).is_err() {
                return;
            }
            if !interval.is_zero() {
                thread::sleep(interval);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureFeed — latest-value reader
// ════════════════════════════════════════════════════════════════════════════

/// Non-blocking reader that always yields the most recent reading.
///
/// There is no queue semantics from the caller's point of view: older
/// readings that piled up between frames are skipped. When the source is
/// slow the previous reading is served again; when it has stopped the last
/// reading stays in effect.
#[derive(Debug)]
pub struct GestureFeed {
    rx: Receiver<GestureReading>,
    latest: GestureReading,
    connected: bool,
}

impl GestureFeed {
    /// Wrap the receiving end of a reading channel.
    pub fn new(rx: Receiver<GestureReading>) -> Self {
        Self {
            rx,
            latest: GestureReading::NONE,
            connected: true,
        }
    }

    /// Drain pending readings and return the newest one available.
    pub fn latest(&mut self) -> GestureReading {
        loop {
            match self.rx.try_recv() {
                Ok(reading) => self.latest = reading,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        log::info!("gesture source disconnected, holding last reading");
                        self.connected = false;
                    }
                    break;
                }
            }
        }
        self.latest
    }

    /// Whether the source is still sending.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}
