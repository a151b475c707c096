//! Cross-thread gesture state.
//!
//! The capture loop publishes one [`VolumeReading`] per tracked frame; the
//! feedback thread snapshots the latest one on its own schedule.  The slot
//! is replaced as a whole under one lock, so a snapshot can never observe
//! the thumb of one frame paired with the index of another.

use std::sync::Mutex;

use gesture_map::{GestureSample, VolumeLevel};

// ════════════════════════════════════════════════════════════════════════════
// VolumeReading — what the capture loop publishes
// ════════════════════════════════════════════════════════════════════════════

/// One frame's result: the fingertip sample and the volume computed from it.
///
/// The level travels with the sample so the feedback side displays exactly
/// the value the capture loop applied, rather than re-deriving its own.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeReading {
    pub sample: GestureSample,
    pub level:  VolumeLevel,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureCell — single-slot atomic publish / snapshot
// ════════════════════════════════════════════════════════════════════════════

/// Single-slot cell shared between the capture loop (writer) and the
/// feedback thread (reader).
///
/// Empty until the first hand is detected.  `publish` swaps the entire
/// reading under the lock; `snapshot` copies it out.  Neither call blocks
/// longer than the swap itself.
pub struct GestureCell {
    slot: Mutex<Option<VolumeReading>>,
}

impl GestureCell {
    pub fn new() -> Self {
        GestureCell { slot: Mutex::new(None) }
    }

    /// Replace the stored reading.  Called only by the capture loop.
    pub fn publish(&self, reading: VolumeReading) {
        *self.slot.lock().expect("gesture slot poisoned") = Some(reading);
    }

    /// Copy out the latest reading, or `None` before the first detection.
    /// Called only by the feedback thread.
    pub fn snapshot(&self) -> Option<VolumeReading> {
        *self.slot.lock().expect("gesture slot poisoned")
    }
}

impl Default for GestureCell {
    fn default() -> Self {
        Self::new()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_map::{Point2D, VolumeMap};
    use std::sync::Arc;
    use std::thread;

    fn reading(x: f32) -> VolumeReading {
        // Correlated fields: index mirrors thumb, and the level is the
        // mapped span.  Any torn read breaks one of the correlations.
        let sample = GestureSample::new(Point2D::new(x, x), Point2D::new(1.0 - x, x));
        VolumeReading { sample, level: VolumeMap::default().level(sample.span()) }
    }

    #[test]
    fn empty_until_first_publish() {
        let cell = GestureCell::new();
        assert!(cell.snapshot().is_none());
    }

    #[test]
    fn snapshot_returns_latest() {
        let cell = GestureCell::new();
        cell.publish(reading(0.2));
        cell.publish(reading(0.4));
        assert_eq!(cell.snapshot(), Some(reading(0.4)));
    }

    #[test]
    fn snapshot_does_not_consume() {
        let cell = GestureCell::new();
        cell.publish(reading(0.3));
        assert!(cell.snapshot().is_some());
        assert!(cell.snapshot().is_some());
    }

    #[test]
    fn concurrent_publishes_never_tear() {
        let cell = Arc::new(GestureCell::new());
        let writer_cell = cell.clone();

        let writer = thread::spawn(move || {
            for i in 0..20_000u32 {
                let x = (i % 1000) as f32 / 1000.0;
                writer_cell.publish(reading(x));
            }
        });

        let map = VolumeMap::default();
        for _ in 0..20_000 {
            if let Some(r) = cell.snapshot() {
                let t = r.sample.thumb;
                let ix = r.sample.index;
                assert_eq!(t.y, ix.y, "y fields from different publishes");
                assert!((t.x + ix.x - 1.0).abs() < 1e-6, "x fields from different publishes");
                assert_eq!(r.level, map.level(r.sample.span()), "level from a different publish");
            }
        }

        writer.join().unwrap();
    }
}
