//! pinch_volume — interactive entry point.

use pinch_volume::app::{run, AppConfig};
use gesture_map::VolumeMap;
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Pinch Volume — Touchless Master-Volume Control        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "camera")]
    println!("  Frames: webcam (nokhwa)");
    #[cfg(not(feature = "camera"))]
    println!("  Frames: simulation  (use --features camera for a real webcam)");

    #[cfg(feature = "mixer")]
    println!("  Audio:  ALSA Master element");
    #[cfg(not(feature = "mixer"))]
    println!("  Audio:  display-only  (use --features mixer to drive ALSA)");
    println!();

    let cfg = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: camera 0, thresholds 0.05/0.3\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };

    println!();
    println!("  Opening feedback window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> AppConfig {
    let camera_index: u32 = read_line("  Camera index (default 0): ")
        .trim().parse().unwrap_or(0);

    let map = loop {
        let min: f32 = read_line("  Silence threshold (default 0.05): ")
            .trim().parse().unwrap_or(0.05);
        let max: f32 = read_line("  Full-volume threshold (default 0.3): ")
            .trim().parse().unwrap_or(0.3);
        if max > min {
            break VolumeMap::new(min, max);
        }
        println!("  ⚠  Full-volume threshold must exceed the silence threshold.");
    };

    AppConfig {
        camera_index,
        map,
        ..AppConfig::default()
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
