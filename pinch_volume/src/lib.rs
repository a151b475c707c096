//! # pinch_volume
//!
//! Touchless system-volume controller.  The thumb-to-index pinch span seen
//! through a camera is mapped onto the master volume by clamped linear
//! interpolation, with a software-rendered window showing the live frame
//! and a volume bar fed by an independently-paced feedback thread.
//!
//! ## Pipeline
//!
//! | Step | Component |
//! |---|---|
//! | Acquire frame | [`feed::FrameSource`] |
//! | Locate fingertips | [`feed::HandDetector`] (first hand wins) |
//! | Span → volume | `gesture_map::VolumeMap` |
//! | Apply to mixer | [`audio::AudioSink`] (capture loop is the only writer) |
//! | Publish | [`shared::GestureCell`] (atomic replace) |
//! | Display | [`feedback::Feedback`] thread → progress bar in the window |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: a keyboard-driven hand, no hardware.
//! * `camera` — real webcam frames via `nokhwa`.
//! * `mixer`  — drive the ALSA `Master` element instead of display-only.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Effect |
//! |---|---|
//! | `Up` / `Down` | Widen / narrow the pinch |
//! | `H` | Toggle hand presence (volume holds while absent) |
//! | `F` | Inject one frame-acquisition failure |
//! | `Q` / `Escape` | Quit |

pub mod audio;
pub mod capture;
pub mod feed;
pub mod feedback;
pub mod shared;
pub mod visualizer;
pub mod app;
