//! Software-rendered feedback window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  camera frame (or simulated scene)          │
//! │  overlay: span / volume / tracking state    │
//! │                                             │
//! ├─────────────────────────────────────────────┤
//! │  VOL [█████████░░░░░░░░░░░]  47%            │
//! │  key legend                                 │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The bottom strip is the progress indicator: the feedback thread pushes
//! percentages through a channel and the render loop drains it here, so all
//! drawing stays on the main thread.

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use std::sync::mpsc::{Receiver, Sender};

use crate::feed::{Frame, SimInput};
use crate::shared::VolumeReading;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

/// Default window size: a 640×480 frame area plus the HUD strip.
pub const DEFAULT_WIN_W: usize = 640;
pub const DEFAULT_WIN_H: usize = 480 + HUD_H;

const HUD_H:   usize = 64;
const MIN_W:   usize = 240;
const MIN_H:   usize = HUD_H + 120;
const BAR_X:   usize = 64;
const BAR_H:   usize = 16;

const HUD_BG:     u32 = 0xFF0F3460;
const BAR_EMPTY:  u32 = 0xFF16213E;
const BAR_FILL:   u32 = 0xFF53D86A;
const TEXT_MAIN:  u32 = 0xFFEEEEEE;
const TEXT_DIM:   u32 = 0xFF888888;
const TEXT_WARN:  u32 = 0xFFFFB347;
const OVERLAY_FG: u32 = 0xFF00FFFF;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:          Window,
    buf:             Vec<u32>,
    win_w:           usize,
    win_h:           usize,
    frame_h:         usize,
    sim_tx:          Sender<SimInput>,
    progress_rx:     Receiver<f32>,
    display_percent: Option<f32>,
}

impl Visualizer {
    pub fn new(
        title:       &str,
        size:        (usize, usize),
        sim_tx:      Sender<SimInput>,
        progress_rx: Receiver<f32>,
    ) -> Result<Self, String> {
        let (win_w, win_h) = (size.0.max(MIN_W), size.1.max(MIN_H));

        let mut window = Window::new(
            title,
            win_w, win_h,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![0xFF000000; win_w * win_h],
            win_w,
            win_h,
            frame_h: win_h - HUD_H,
            sim_tx,
            progress_rx,
            display_percent: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll keyboard input.  Returns `false` when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }

        let one_shot = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);
        let held     = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(&self.window, Key::Q) || one_shot(&self.window, Key::Escape) {
            return false;
        }
        if held(&self.window, Key::Up) {
            let _ = self.sim_tx.send(SimInput::Widen);
        }
        if held(&self.window, Key::Down) {
            let _ = self.sim_tx.send(SimInput::Narrow);
        }
        if one_shot(&self.window, Key::H) {
            let _ = self.sim_tx.send(SimInput::ToggleHand);
        }
        if one_shot(&self.window, Key::F) {
            let _ = self.sim_tx.send(SimInput::FailFrame);
        }

        true
    }

    /// Render one frame plus overlay and the volume bar.
    pub fn render(
        &mut self,
        frame:      &Frame,
        reading:    Option<VolumeReading>,
        tracking:   bool,
        audio_live: bool,
    ) {
        // Latest percentage pushed by the feedback thread, if any.
        while let Ok(percent) = self.progress_rx.try_recv() {
            self.display_percent = Some(percent);
        }

        self.blit_frame(frame);

        // ── Overlay: span / volume / state ────────────────────────────────
        match reading.filter(|_| tracking) {
            Some(r) => {
                let text = format!(
                    "SPAN {:.3}  VOL {:.1}%",
                    r.sample.span(),
                    r.level.percent()
                );
                self.draw_text(&text, 10, 10, OVERLAY_FG);
            }
            None => {
                self.draw_text("NO HAND - VOLUME HELD", 10, 10, TEXT_WARN);
            }
        }
        if !audio_live {
            self.draw_text("AUDIO OFFLINE - DISPLAY ONLY", 10, 20, TEXT_WARN);
        }

        // ── HUD strip ─────────────────────────────────────────────────────
        let bar_y = self.frame_h + 14;
        let bar_w = self.win_w.saturating_sub(BAR_X + 80);
        self.fill_rect(0, self.frame_h, self.win_w, HUD_H, HUD_BG);
        self.draw_text("VOL", 28, bar_y + 5, TEXT_MAIN);
        self.fill_rect(BAR_X, bar_y, bar_w, BAR_H, BAR_EMPTY);
        if let Some(percent) = self.display_percent {
            let fill = bar_fill_px(percent, bar_w);
            self.fill_rect(BAR_X, bar_y, fill, BAR_H, BAR_FILL);
            let label = format!("{:.0}%", percent);
            self.draw_text(&label, BAR_X + bar_w + 12, bar_y + 5, TEXT_MAIN);
        }

        self.draw_text(
            "UP/DOWN=PINCH  H=HAND  F=DROP FRAME  Q=QUIT",
            28, self.win_h - 16, TEXT_DIM,
        );

        self.window.update_with_buffer(&self.buf, self.win_w, self.win_h).ok();
    }

    // ── frame blit ────────────────────────────────────────────────────────

    /// Nearest-neighbour copy of the captured frame into the display area.
    fn blit_frame(&mut self, frame: &Frame) {
        if frame.width == 0 || frame.height == 0 {
            return;
        }
        for y in 0..self.frame_h {
            let sy = y * frame.height / self.frame_h;
            for x in 0..self.win_w {
                let sx = x * frame.width / self.win_w;
                self.buf[y * self.win_w + x] = frame.pixels[sy * frame.width + sx];
            }
        }
    }

    // ── primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.win_h) {
            for col in x..(x + w).min(self.win_w) {
                self.buf[row * self.win_w + col] = color;
            }
        }
    }

    fn put_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.win_w && y < self.win_h {
            self.buf[y * self.win_w + x] = color;
        }
    }

    /// Minimal 3×5 bitmap font for the overlay and HUD labels.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let rows = glyph(ch.to_ascii_uppercase());
            for (row, &bits) in rows.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (0b100 >> col) != 0 {
                        self.put_pixel(cx + col, y + row, color);
                    }
                }
            }
            cx += 4; // 3 wide + 1 gap
            if cx + 4 > self.win_w {
                break;
            }
        }
    }
}

/// Filled width of the volume bar for a percentage in `[0, 100]`.
pub fn bar_fill_px(percent: f32, bar_width: usize) -> usize {
    let clamped = percent.clamp(0.0, 100.0);
    (bar_width as f32 * clamped / 100.0).round() as usize
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 glyphs, one row per byte, low 3 bits used
// ────────────────────────────────────────────────────────────────────────────

fn glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b110, 0b010, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b011, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b100, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b001],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b011, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b110, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b011],
        'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b010, 0b010, 0b010, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '%' => [0b100, 0b001, 0b010, 0b100, 0b001],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        ':' => [0b000, 0b100, 0b000, 0b100, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b111, 0b111, 0b111, 0b111, 0b111], // unknown: solid block
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_empty_at_zero() {
        assert_eq!(bar_fill_px(0.0, 420), 0);
    }

    #[test]
    fn bar_full_at_hundred() {
        assert_eq!(bar_fill_px(100.0, 420), 420);
    }

    #[test]
    fn bar_clamps_out_of_range() {
        assert_eq!(bar_fill_px(-20.0, 420), 0);
        assert_eq!(bar_fill_px(250.0, 420), 420);
    }

    #[test]
    fn bar_midpoint() {
        assert_eq!(bar_fill_px(50.0, 420), 210);
    }

    #[test]
    fn glyphs_cover_hud_strings() {
        // Every character the window ever draws has a real glyph.
        let strings = [
            "SPAN 0.123  VOL 45.6%",
            "NO HAND - VOLUME HELD",
            "AUDIO OFFLINE - DISPLAY ONLY",
            "UP/DOWN=PINCH  H=HAND  F=DROP FRAME  Q=QUIT",
        ];
        let solid = glyph('\u{7f}');
        for s in strings {
            for ch in s.chars() {
                assert_ne!(glyph(ch.to_ascii_uppercase()), solid, "missing glyph for {:?}", ch);
            }
        }
    }
}
