//! Volume feedback thread.
//!
//! Polls the shared [`GestureCell`] on a fixed interval and pushes the
//! published percentage to a progress indicator.  Runs on its own cadence,
//! decoupled from frame arrival, and never touches the audio sink.
//! Shutdown is cooperative: the command channel doubles as the interval
//! timer, so a quit request lands within one polling period.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::shared::GestureCell;

// ════════════════════════════════════════════════════════════════════════════
// ProgressIndicator — where the percentage goes
// ════════════════════════════════════════════════════════════════════════════

/// A display element showing a percentage in `[0, 100]`.
pub trait ProgressIndicator: Send {
    fn set_value(&mut self, percent: f32);
}

/// Indicator that forwards percentages over a channel.
///
/// The render loop drains the receiving end each frame, which keeps window
/// drawing on the main thread while this side stays free of any UI types.
pub struct ChannelProgress {
    tx: Sender<f32>,
}

impl ChannelProgress {
    pub fn new(tx: Sender<f32>) -> Self {
        ChannelProgress { tx }
    }
}

impl ProgressIndicator for ChannelProgress {
    fn set_value(&mut self, percent: f32) {
        // A closed window just means nobody is watching anymore.
        let _ = self.tx.send(percent);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FeedbackCommand — sent to the feedback thread
// ════════════════════════════════════════════════════════════════════════════

pub enum FeedbackCommand {
    /// Terminate the thread.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Feedback — handle owning the thread
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the feedback thread.  Owned by the main control flow and
/// joined at shutdown; never left running detached.
pub struct Feedback {
    cmd_tx: Sender<FeedbackCommand>,
    handle: Option<JoinHandle<()>>,
}

impl Feedback {
    /// Spawn the feedback thread.
    ///
    /// `interval` is the polling period; the thread reads the cell once per
    /// period and pushes the stored percentage to `indicator`.
    pub fn spawn(
        cell:      Arc<GestureCell>,
        indicator: Box<dyn ProgressIndicator>,
        interval:  Duration,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<FeedbackCommand>();

        let handle = thread::spawn(move || {
            feedback_thread(cell, indicator, interval, cmd_rx);
        });

        Feedback { cmd_tx, handle: Some(handle) }
    }

    /// Request termination and wait for the thread to exit.
    pub fn shutdown(&mut self) {
        let _ = self.cmd_tx.send(FeedbackCommand::Quit);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Feedback {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// feedback_thread — the actual loop
// ════════════════════════════════════════════════════════════════════════════

fn feedback_thread(
    cell:          Arc<GestureCell>,
    mut indicator: Box<dyn ProgressIndicator>,
    interval:      Duration,
    cmd_rx:        Receiver<FeedbackCommand>,
) {
    loop {
        match cmd_rx.recv_timeout(interval) {
            Ok(FeedbackCommand::Quit) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {
                if let Some(reading) = cell.snapshot() {
                    indicator.set_value(reading.level.percent().clamp(0.0, 100.0));
                }
                // Before the first detection there is nothing to show.
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::VolumeReading;
    use gesture_map::{GestureSample, Point2D, VolumeLevel};
    use std::sync::Mutex;
    use std::time::Instant;

    struct RecordingIndicator {
        values: Arc<Mutex<Vec<f32>>>,
    }

    impl ProgressIndicator for RecordingIndicator {
        fn set_value(&mut self, percent: f32) {
            self.values.lock().unwrap().push(percent);
        }
    }

    fn recorder() -> (Box<dyn ProgressIndicator>, Arc<Mutex<Vec<f32>>>) {
        let values = Arc::new(Mutex::new(Vec::new()));
        (Box::new(RecordingIndicator { values: values.clone() }), values)
    }

    fn reading(fraction: f32) -> VolumeReading {
        VolumeReading {
            sample: GestureSample::new(Point2D::new(0.4, 0.5), Point2D::new(0.6, 0.5)),
            level:  VolumeLevel::from_fraction(fraction),
        }
    }

    #[test]
    fn pushes_published_percentage() {
        let cell = Arc::new(GestureCell::new());
        cell.publish(reading(0.65));

        let (indicator, values) = recorder();
        let mut fb = Feedback::spawn(cell, indicator, Duration::from_millis(5));
        thread::sleep(Duration::from_millis(40));
        fb.shutdown();

        let values = values.lock().unwrap();
        assert!(!values.is_empty());
        assert!(values.iter().all(|&v| (v - 65.0).abs() < 0.01));
    }

    #[test]
    fn silent_before_first_publish() {
        let cell = Arc::new(GestureCell::new());
        let (indicator, values) = recorder();

        let mut fb = Feedback::spawn(cell, indicator, Duration::from_millis(5));
        thread::sleep(Duration::from_millis(30));
        fb.shutdown();

        assert!(values.lock().unwrap().is_empty());
    }

    #[test]
    fn values_always_in_display_range() {
        let cell = Arc::new(GestureCell::new());
        cell.publish(reading(1.0));

        let (indicator, values) = recorder();
        let mut fb = Feedback::spawn(cell, indicator, Duration::from_millis(5));
        thread::sleep(Duration::from_millis(30));
        fb.shutdown();

        assert!(values.lock().unwrap().iter().all(|&v| (0.0..=100.0).contains(&v)));
    }

    #[test]
    fn shutdown_joins_within_one_interval() {
        let cell = Arc::new(GestureCell::new());
        let (indicator, _values) = recorder();
        let mut fb = Feedback::spawn(cell, indicator, Duration::from_millis(50));

        let started = Instant::now();
        fb.shutdown();
        // One interval plus generous scheduling slack.
        assert!(started.elapsed() < Duration::from_millis(250));
    }

    #[test]
    fn drop_terminates_the_thread() {
        let cell = Arc::new(GestureCell::new());
        let (indicator, values) = recorder();
        {
            let _fb = Feedback::spawn(cell.clone(), indicator, Duration::from_millis(5));
            thread::sleep(Duration::from_millis(15));
        }
        // After drop, no further pushes arrive.
        cell.publish(reading(0.9));
        let count = values.lock().unwrap().len();
        thread::sleep(Duration::from_millis(25));
        assert_eq!(values.lock().unwrap().len(), count);
    }
}
