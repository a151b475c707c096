//! System-volume sink.
//!
//! The capture loop is the only component allowed to call [`AudioSink`];
//! everything else displays the published level.  When no usable mixer is
//! available the process keeps running in display-only mode behind
//! [`NullSink`].

// ════════════════════════════════════════════════════════════════════════════
// AudioSink — abstraction over alsa / null (for testing and display-only)
// ════════════════════════════════════════════════════════════════════════════

/// A destination for volume updates.
///
/// `fraction` is already clamped to `[0, 1]` by the caller.  A failure means
/// the device went away; the caller downgrades to display-only rather than
/// terminating.
pub trait AudioSink: Send {
    fn set_volume(&mut self, fraction: f32) -> Result<(), String>;
    fn name(&self) -> &'static str;
}

// ── null backend (display-only mode) ──────────────────────────────────────

/// Sink that accepts every update and does nothing.
pub struct NullSink;

impl AudioSink for NullSink {
    fn set_volume(&mut self, _fraction: f32) -> Result<(), String> {
        Ok(())
    }
    fn name(&self) -> &'static str {
        "null"
    }
}

// ── ALSA backend (feature = "mixer") ──────────────────────────────────────

/// Sink that drives the ALSA `Master` simple mixer element.
#[cfg(feature = "mixer")]
pub struct AlsaSink {
    mixer:   alsa::mixer::Mixer,
    elem_id: alsa::mixer::SelemId,
}

#[cfg(feature = "mixer")]
impl AlsaSink {
    pub fn open(card: &str, element: &str) -> Result<Self, String> {
        use alsa::mixer::{Mixer, SelemId};

        let mixer = Mixer::new(card, false)
            .map_err(|e| format!("cannot open mixer on {}: {}", card, e))?;
        let elem_id = SelemId::new(element, 0);
        if mixer.find_selem(&elem_id).is_none() {
            return Err(format!("no \"{}\" element on {}", element, card));
        }
        Ok(AlsaSink { mixer, elem_id })
    }
}

#[cfg(feature = "mixer")]
impl AudioSink for AlsaSink {
    fn set_volume(&mut self, fraction: f32) -> Result<(), String> {
        let selem = self.mixer.find_selem(&self.elem_id)
            .ok_or_else(|| "mixer element disappeared".to_string())?;
        let (min, max) = selem.get_playback_volume_range();
        let raw = min + ((max - min) as f64 * fraction as f64).round() as i64;
        selem.set_playback_volume_all(raw).map_err(|e| e.to_string())
    }
    fn name(&self) -> &'static str {
        "alsa"
    }
}

// ════════════════════════════════════════════════════════════════════════════
// open_audio_sink — pick the best available backend
// ════════════════════════════════════════════════════════════════════════════

/// Open the system mixer, falling back to display-only with a report.
pub fn open_audio_sink() -> Box<dyn AudioSink> {
    #[cfg(feature = "mixer")]
    {
        match AlsaSink::open("default", "Master") {
            Ok(sink) => {
                eprintln!("[audio] driving ALSA Master volume");
                return Box::new(sink);
            }
            Err(e) => {
                eprintln!("[audio] {} — running display-only", e);
            }
        }
    }

    #[cfg(not(feature = "mixer"))]
    eprintln!("[audio] built without mixer support — running display-only");

    Box::new(NullSink)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sink_accepts_whole_range() {
        let mut sink = NullSink;
        assert!(sink.set_volume(0.0).is_ok());
        assert!(sink.set_volume(0.5).is_ok());
        assert!(sink.set_volume(1.0).is_ok());
    }

    #[cfg(not(feature = "mixer"))]
    #[test]
    fn default_build_falls_back_to_null() {
        let mut sink = open_audio_sink();
        assert_eq!(sink.name(), "null");
        assert!(sink.set_volume(0.7).is_ok());
    }
}
