//! Per-frame capture engine.
//!
//! Turns one frame's detector output into a volume update: select a hand,
//! measure the pinch span, map it, drive the audio sink, and publish the
//! reading for the feedback thread.  The engine is the sole writer of both
//! the audio sink and the shared cell.

use std::sync::Arc;
use std::time::Duration;

use gesture_map::{GestureSample, VolumeMap};

use crate::audio::AudioSink;
use crate::feed::Hand;
use crate::shared::{GestureCell, VolumeReading};

// ════════════════════════════════════════════════════════════════════════════
// Tracking state
// ════════════════════════════════════════════════════════════════════════════

/// Whether a hand was visible in the most recent frame.
///
/// Re-evaluated from scratch every frame; a single missed detection drops
/// straight back to `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackState {
    Idle,
    Tracking,
}

// ════════════════════════════════════════════════════════════════════════════
// Frame-failure policy
// ════════════════════════════════════════════════════════════════════════════

/// Consecutive acquisition failures tolerated before the loop gives up.
pub const MAX_FRAME_FAILURES: u32 = 30;

const RETRY_BASE: Duration = Duration::from_millis(20);
const RETRY_CAP:  Duration = Duration::from_millis(500);

// ════════════════════════════════════════════════════════════════════════════
// CaptureEngine
// ════════════════════════════════════════════════════════════════════════════

pub struct CaptureEngine {
    map:         VolumeMap,
    cell:        Arc<GestureCell>,
    sink:        Box<dyn AudioSink>,
    audio_live:  bool,
    state:       TrackState,
    fail_streak: u32,
    last:        Option<VolumeReading>,
}

impl CaptureEngine {
    pub fn new(map: VolumeMap, cell: Arc<GestureCell>, sink: Box<dyn AudioSink>) -> Self {
        CaptureEngine {
            map,
            cell,
            sink,
            audio_live:  true,
            state:       TrackState::Idle,
            fail_streak: 0,
            last:        None,
        }
    }

    /// Process one successfully acquired frame's detections.
    ///
    /// With at least one hand present, the FIRST hand in detector order is
    /// used; its fingertips become the sample, the mapped level goes to the
    /// audio sink, and the reading is published.  With no hand, nothing is
    /// published and the last applied volume holds.
    pub fn observe(&mut self, hands: &[Hand]) -> Option<VolumeReading> {
        self.fail_streak = 0;

        let hand = match hands.first() {
            Some(hand) => hand,
            None => {
                self.state = TrackState::Idle;
                return None;
            }
        };
        self.state = TrackState::Tracking;

        let sample = GestureSample::new(hand.thumb_tip, hand.index_tip);
        let level = self.map.level(sample.span());

        if self.audio_live {
            if let Err(e) = self.sink.set_volume(level.fraction()) {
                eprintln!("[capture] audio sink failed: {} — continuing display-only", e);
                self.audio_live = false;
            }
        }

        let reading = VolumeReading { sample, level };
        self.cell.publish(reading);
        self.last = Some(reading);
        Some(reading)
    }

    /// Record a frame-acquisition failure.
    ///
    /// Returns how long to back off before retrying, or an error once
    /// [`MAX_FRAME_FAILURES`] consecutive cycles have failed.
    pub fn frame_failed(&mut self) -> Result<Duration, String> {
        self.fail_streak += 1;
        if self.fail_streak >= MAX_FRAME_FAILURES {
            return Err(format!(
                "frame source failed {} times in a row",
                self.fail_streak
            ));
        }
        Ok((RETRY_BASE * self.fail_streak).min(RETRY_CAP))
    }

    // ── accessors for the render loop ────────────────────────────────────

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state == TrackState::Tracking
    }

    pub fn audio_live(&self) -> bool {
        self.audio_live
    }

    /// The most recent published reading, held across hand dropouts.
    pub fn last(&self) -> Option<VolumeReading> {
        self.last
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_map::Point2D;
    use std::sync::Mutex;

    struct RecordingSink {
        calls:    Arc<Mutex<Vec<f32>>>,
        fail_all: bool,
    }

    impl AudioSink for RecordingSink {
        fn set_volume(&mut self, fraction: f32) -> Result<(), String> {
            if self.fail_all {
                return Err("device unavailable".to_string());
            }
            self.calls.lock().unwrap().push(fraction);
            Ok(())
        }
        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn engine_with_sink(fail_all: bool) -> (CaptureEngine, Arc<GestureCell>, Arc<Mutex<Vec<f32>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Box::new(RecordingSink { calls: calls.clone(), fail_all });
        let cell = Arc::new(GestureCell::new());
        (CaptureEngine::new(VolumeMap::default(), cell.clone(), sink), cell, calls)
    }

    fn hand_with_span(span: f32) -> Hand {
        Hand {
            thumb_tip: Point2D::new(0.5, 0.5),
            index_tip: Point2D::new(0.5 + span, 0.5),
        }
    }

    #[test]
    fn tracked_frame_sets_volume_and_publishes() {
        let (mut engine, cell, calls) = engine_with_sink(false);

        let reading = engine.observe(&[hand_with_span(0.175)]).unwrap();
        assert_eq!(engine.state(), TrackState::Tracking);
        assert!((reading.level.percent() - 50.0).abs() < 0.01);
        assert_eq!(cell.snapshot(), Some(reading));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn no_hand_goes_idle_without_publishing() {
        let (mut engine, cell, calls) = engine_with_sink(false);

        assert!(engine.observe(&[]).is_none());
        assert_eq!(engine.state(), TrackState::Idle);
        assert!(cell.snapshot().is_none());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn volume_holds_across_hand_dropout() {
        let (mut engine, cell, calls) = engine_with_sink(false);

        let reading = engine.observe(&[hand_with_span(0.3)]).unwrap();
        for _ in 0..10 {
            engine.observe(&[]);
        }

        // One sink call, and the published reading is untouched.
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(cell.snapshot(), Some(reading));
        assert_eq!(engine.last(), Some(reading));
    }

    #[test]
    fn single_missed_detection_reverts_to_idle() {
        let (mut engine, _cell, _calls) = engine_with_sink(false);

        engine.observe(&[hand_with_span(0.2)]);
        assert!(engine.is_tracking());
        engine.observe(&[]);
        assert_eq!(engine.state(), TrackState::Idle);
        engine.observe(&[hand_with_span(0.2)]);
        assert!(engine.is_tracking());
    }

    #[test]
    fn first_hand_in_detector_order_wins() {
        let (mut engine, _cell, _calls) = engine_with_sink(false);

        let first  = hand_with_span(0.05);
        let second = hand_with_span(0.3);
        let reading = engine.observe(&[first, second]).unwrap();

        assert_eq!(reading.sample.thumb, first.thumb_tip);
        assert_eq!(reading.sample.index, first.index_tip);
        assert_eq!(reading.level.fraction(), 0.0);
    }

    #[test]
    fn sink_failure_downgrades_to_display_only() {
        let (mut engine, cell, _calls) = engine_with_sink(true);

        assert!(engine.audio_live());
        let reading = engine.observe(&[hand_with_span(0.2)]);
        assert!(reading.is_some(), "engine must keep running past a sink failure");
        assert!(!engine.audio_live());

        // Still publishing for the display side.
        engine.observe(&[hand_with_span(0.25)]);
        assert!(cell.snapshot().is_some());
    }

    #[test]
    fn backoff_grows_then_caps() {
        let (mut engine, _cell, _calls) = engine_with_sink(false);

        let first = engine.frame_failed().unwrap();
        let second = engine.frame_failed().unwrap();
        assert!(second > first);

        let mut longest = second;
        for _ in 0..27 {
            if let Ok(wait) = engine.frame_failed() {
                longest = wait;
            }
        }
        assert_eq!(longest, Duration::from_millis(500));
    }

    #[test]
    fn escalates_after_consecutive_failures() {
        let (mut engine, _cell, _calls) = engine_with_sink(false);

        for _ in 0..MAX_FRAME_FAILURES - 1 {
            assert!(engine.frame_failed().is_ok());
        }
        assert!(engine.frame_failed().is_err());
    }

    #[test]
    fn good_frame_resets_failure_streak() {
        let (mut engine, _cell, _calls) = engine_with_sink(false);

        for _ in 0..MAX_FRAME_FAILURES - 1 {
            engine.frame_failed().unwrap();
        }
        engine.observe(&[]);
        assert!(engine.frame_failed().is_ok());
    }
}
