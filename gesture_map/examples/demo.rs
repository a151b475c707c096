//! Demonstrates the distance metric and the volume mapping end to end.

use gesture_map::{distance, GestureSample, Point2D, VolumeMap};

fn main() {
    println!("\n=== Pinch Span → Volume Mapping Demo ===\n");

    // ── 1. Fingertip distances ────────────────────────────────────────────
    println!("1. Normalized fingertip distances");
    let thumb = Point2D::new(0.42, 0.55);
    for (label, index) in [
        ("touching", Point2D::new(0.42, 0.55)),
        ("relaxed",  Point2D::new(0.45, 0.59)),
        ("half",     Point2D::new(0.42, 0.725)),
        ("spread",   Point2D::new(0.42, 0.87)),
    ] {
        println!("   {:<10} distance = {:.4}", label, distance(thumb, index));
    }
    println!();

    // ── 2. Default mapping sweep ─────────────────────────────────────────
    println!("2. Default thresholds (0.05 → 0%, 0.3 → 100%)");
    let map = VolumeMap::default();
    for d in [0.0, 0.05, 0.1, 0.175, 0.25, 0.3, 0.4] {
        println!("   span {:<5.3} → {:>5.1}%", d, map.percent(d));
    }
    println!();

    // ── 3. Full sample pipeline ──────────────────────────────────────────
    println!("3. GestureSample → span → level");
    let sample = GestureSample::new(
        Point2D::new(0.40, 0.50),
        Point2D::new(0.40, 0.675),
    );
    let level = map.level(sample.span());
    println!("   span {:.4} → {:.1}% of full volume\n", sample.span(), level.percent());
}
