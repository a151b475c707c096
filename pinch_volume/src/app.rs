//! Top-level wiring.
//!
//! `run` owns every resource: the window, the frame source, the capture
//! engine (and with it the audio sink), and the feedback thread.  The
//! capture loop runs on the calling thread; the feedback thread is joined
//! before `run` returns, so nothing outlives the main control flow.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gesture_map::VolumeMap;

use crate::audio::open_audio_sink;
use crate::capture::CaptureEngine;
use crate::feed::{FrameSource, HandDetector, SimInput};
use crate::feedback::{ChannelProgress, Feedback};
use crate::shared::GestureCell;
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    /// Which camera to open (ignored in simulation mode).
    pub camera_index:  u32,
    /// Pinch span thresholds for the volume ramp.
    pub map:           VolumeMap,
    pub window_title:  String,
    /// Feedback window size (width, height).
    pub window_size:   (usize, usize),
    /// Polling period of the feedback thread.
    pub poll_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            camera_index:  0,
            map:           VolumeMap::default(),
            window_title:  "Pinch Volume".to_string(),
            window_size:   (crate::visualizer::DEFAULT_WIN_W, crate::visualizer::DEFAULT_WIN_H),
            poll_interval: Duration::from_millis(33),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Feed selection — simulation by default, webcam with `--features camera`
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "camera")]
fn open_feed(
    camera_index: u32,
    sim_rx:       Receiver<SimInput>,
) -> Result<(Box<dyn FrameSource>, Box<dyn HandDetector>), String> {
    use crate::feed::{CameraFeed, SimTracker};

    let camera = CameraFeed::open(camera_index)?;
    // Landmark models stay external; the keyboard tracker drives the
    // gesture over the live picture.
    Ok((Box::new(camera), Box::new(SimTracker::standalone(sim_rx))))
}

#[cfg(not(feature = "camera"))]
fn open_feed(
    _camera_index: u32,
    sim_rx:        Receiver<SimInput>,
) -> Result<(Box<dyn FrameSource>, Box<dyn HandDetector>), String> {
    let (camera, tracker) = crate::feed::sim_pair(sim_rx);
    Ok((Box::new(camera), Box::new(tracker)))
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It opens the window and
/// the frame source, spawns the feedback thread, and drives the capture
/// loop until the user quits.  Returns `Ok(())` on a user-initiated quit.
pub fn run(cfg: AppConfig) -> Result<(), String> {
    // ── channels: sim input into the feed, percentages out to the HUD ────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let (progress_tx, progress_rx) = mpsc::channel::<f32>();

    // ── window (owns the sim input sender and the progress receiver) ─────
    let mut vis = Visualizer::new(&cfg.window_title, cfg.window_size, sim_tx, progress_rx)?;

    // ── frame source + detector ──────────────────────────────────────────
    let (mut camera, mut tracker) = open_feed(cfg.camera_index, sim_rx)?;

    // ── shared cell and the two loops around it ──────────────────────────
    let cell = Arc::new(GestureCell::new());
    let mut feedback = Feedback::spawn(
        cell.clone(),
        Box::new(ChannelProgress::new(progress_tx)),
        cfg.poll_interval,
    );
    let mut engine = CaptureEngine::new(cfg.map, cell, open_audio_sink());

    let result = capture_loop(&mut vis, camera.as_mut(), tracker.as_mut(), &mut engine);

    // Feedback is joined before the window and camera unwind.
    feedback.shutdown();
    result
}

fn capture_loop(
    vis:     &mut Visualizer,
    camera:  &mut dyn FrameSource,
    tracker: &mut dyn HandDetector,
    engine:  &mut CaptureEngine,
) -> Result<(), String> {
    while vis.is_open() {
        // 1. Input first, so a quit never waits on a slow frame.
        if !vis.poll_input() {
            break;
        }

        // 2. Acquire → detect → map → apply → publish.
        match camera.next_frame() {
            Ok(frame) => {
                let hands = tracker.detect(&frame);
                engine.observe(&hands);

                // 3. Render the frame with the overlay.
                vis.render(
                    &frame,
                    engine.last(),
                    engine.is_tracking(),
                    engine.audio_live(),
                );
            }
            Err(e) => {
                let wait = engine
                    .frame_failed()
                    .map_err(|msg| format!("{} (last error: {})", msg, e))?;
                eprintln!("[capture] frame acquisition failed: {} — retrying in {:?}", e, wait);
                thread::sleep(wait);
            }
        }
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_thresholds() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.camera_index, 0);
        assert_eq!(cfg.map.min_distance, 0.05);
        assert_eq!(cfg.map.max_distance, 0.3);
        assert_eq!(cfg.poll_interval, Duration::from_millis(33));
    }

    #[cfg(not(feature = "camera"))]
    #[test]
    fn sim_feed_opens_without_hardware() {
        let (_tx, rx) = mpsc::channel();
        assert!(open_feed(0, rx).is_ok());
    }
}
