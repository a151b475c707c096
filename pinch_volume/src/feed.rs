//! Frame acquisition and hand detection seams.
//!
//! The capture loop consumes two traits: [`FrameSource`] for images and
//! [`HandDetector`] for fingertip landmarks.  Consumers don't need to know
//! whether frames come from a real webcam or the keyboard-driven simulator.
//!
//! * (default) **Simulation** — [`SimCamera`] renders a synthetic scene and
//!   [`SimTracker`] reports a hand whose pinch span is driven by key events.
//! * `camera` feature — [`CameraFeed`] pulls real frames through `nokhwa`;
//!   landmark models stay external and plug in behind [`HandDetector`].

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use gesture_map::Point2D;

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// One captured image, 0RGB pixels row-major, ready for the framebuffer.
pub struct Frame {
    pub width:  usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Frame {
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Frame { width, height, pixels: vec![color; width * height] }
    }
}

/// Default capture resolution for the simulated camera.
pub const SIM_FRAME_W: usize = 640;
pub const SIM_FRAME_H: usize = 480;

// ════════════════════════════════════════════════════════════════════════════
// FrameSource / HandDetector traits
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver camera frames.
///
/// `next_frame` may fail transiently (device busy, dropped frame); the
/// capture loop treats a failure as a skipped cycle, not a crash.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Frame, String>;
}

/// One detected hand: the two fingertips the volume gesture cares about,
/// in normalized frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hand {
    pub thumb_tip: Point2D,
    pub index_tip: Point2D,
}

/// Anything that can locate hands in a frame.
///
/// The returned order is the detector's own ranking; the capture loop
/// always takes the first entry, so implementations must keep that order
/// stable frame to frame.
pub trait HandDetector {
    fn detect(&mut self, frame: &Frame) -> Vec<Hand>;
}

// ════════════════════════════════════════════════════════════════════════════
// SimInput — key events from the window, driving the simulated hand
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    /// Spread thumb and index further apart.
    Widen,
    /// Bring thumb and index closer together.
    Narrow,
    /// Toggle whether a hand is in view at all.
    ToggleHand,
    /// Make the next frame acquisition fail once.
    FailFrame,
}

// ── shared simulator state ───────────────────────────────────────────────────

struct SimState {
    /// Thumb-to-index separation in normalized units.
    separation: f32,
    present:    bool,
    fail_next:  bool,
}

const SIM_SEP_STEP: f32 = 0.01;
const SIM_SEP_MAX:  f32 = 0.45;

impl SimState {
    fn new() -> Self {
        // Start mid-ramp so the first tracked frame lands near 50%.
        SimState { separation: 0.175, present: true, fail_next: false }
    }

    fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::Widen  => {
                self.separation = (self.separation + SIM_SEP_STEP).min(SIM_SEP_MAX);
            }
            SimInput::Narrow => {
                self.separation = (self.separation - SIM_SEP_STEP).max(0.0);
            }
            SimInput::ToggleHand => self.present = !self.present,
            SimInput::FailFrame  => self.fail_next = true,
        }
    }

    fn hand(&self) -> Option<Hand> {
        if !self.present {
            return None;
        }
        // Pinch opens horizontally about the frame centre, so the reported
        // span equals `separation` exactly.
        let half = self.separation / 2.0;
        Some(Hand {
            thumb_tip: Point2D::new(0.5 - half, 0.5),
            index_tip: Point2D::new(0.5 + half, 0.5),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimTracker — keyboard-driven hand detector (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Detector whose single hand follows [`SimInput`] events.
///
/// Drains its input channel at every `detect` call, so a key press takes
/// effect on the frame being processed.  Detection is deterministic: at most
/// one hand, always first in order.
pub struct SimTracker {
    state: Arc<Mutex<SimState>>,
    rx:    Receiver<SimInput>,
}

impl SimTracker {
    /// Build a tracker for use with a real frame source (`camera` feature).
    pub fn standalone(rx: Receiver<SimInput>) -> Self {
        SimTracker { state: Arc::new(Mutex::new(SimState::new())), rx }
    }
}

impl HandDetector for SimTracker {
    fn detect(&mut self, _frame: &Frame) -> Vec<Hand> {
        let mut state = self.state.lock().expect("sim state poisoned");
        while let Ok(input) = self.rx.try_recv() {
            state.apply(input);
        }
        state.hand().into_iter().collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimCamera — synthetic frame source (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Frame source that renders the simulated hand onto a flat backdrop.
///
/// The rendered dots trail the detector by one frame; at interactive rates
/// that is invisible.
pub struct SimCamera {
    state: Arc<Mutex<SimState>>,
}

const SIM_BG:    u32 = 0xFF1A1A2E;
const SIM_THUMB: u32 = 0xFF55C8FA;
const SIM_INDEX: u32 = 0xFFFAC855;

impl FrameSource for SimCamera {
    fn next_frame(&mut self) -> Result<Frame, String> {
        {
            let mut state = self.state.lock().expect("sim state poisoned");
            if state.fail_next {
                state.fail_next = false;
                return Err("simulated frame drop".to_string());
            }
        }

        let mut frame = Frame::filled(SIM_FRAME_W, SIM_FRAME_H, SIM_BG);
        let hand = self.state.lock().expect("sim state poisoned").hand();
        if let Some(hand) = hand {
            draw_dot(&mut frame, hand.thumb_tip, 9, SIM_THUMB);
            draw_dot(&mut frame, hand.index_tip, 9, SIM_INDEX);
        }
        Ok(frame)
    }
}

fn draw_dot(frame: &mut Frame, p: Point2D, r: isize, color: u32) {
    let cx = (p.x * frame.width as f32) as isize;
    let cy = (p.y * frame.height as f32) as isize;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && y >= 0 && (x as usize) < frame.width && (y as usize) < frame.height {
                frame.pixels[y as usize * frame.width + x as usize] = color;
            }
        }
    }
}

/// Build the simulated camera/tracker pair sharing one hand state.
pub fn sim_pair(rx: Receiver<SimInput>) -> (SimCamera, SimTracker) {
    let state = Arc::new(Mutex::new(SimState::new()));
    (
        SimCamera  { state: state.clone() },
        SimTracker { state, rx },
    )
}

// ════════════════════════════════════════════════════════════════════════════
// CameraFeed — real webcam frames (feature = "camera")
// ════════════════════════════════════════════════════════════════════════════

/// Frame source backed by a real webcam through `nokhwa`.
///
/// Frames are decoded to RGB and repacked as 0RGB for the framebuffer.
#[cfg(feature = "camera")]
pub struct CameraFeed {
    camera: nokhwa::Camera,
}

#[cfg(feature = "camera")]
impl CameraFeed {
    pub fn open(index: u32) -> Result<Self, String> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = nokhwa::Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| format!("camera {} unavailable: {}", index, e))?;
        camera.open_stream()
            .map_err(|e| format!("failed to start camera stream: {}", e))?;
        eprintln!("[capture] opened camera {}: {}", index, camera.info().human_name());
        Ok(CameraFeed { camera })
    }
}

#[cfg(feature = "camera")]
impl FrameSource for CameraFeed {
    fn next_frame(&mut self) -> Result<Frame, String> {
        use nokhwa::pixel_format::RgbFormat;

        let buffer = self.camera.frame().map_err(|e| e.to_string())?;
        let decoded = buffer.decode_image::<RgbFormat>().map_err(|e| e.to_string())?;
        let (width, height) = (decoded.width() as usize, decoded.height() as usize);

        let mut pixels = Vec::with_capacity(width * height);
        for rgb in decoded.as_raw().chunks_exact(3) {
            pixels.push(
                0xFF00_0000
                    | (rgb[0] as u32) << 16
                    | (rgb[1] as u32) << 8
                    | rgb[2] as u32,
            );
        }
        Ok(Frame { width, height, pixels })
    }
}

#[cfg(feature = "camera")]
impl Drop for CameraFeed {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
