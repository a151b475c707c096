//! Interactive mapping explorer: probe spans against configurable thresholds.

use gesture_map::{distance, Point2D, VolumeMap};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║             Pinch Span → Volume Map Explorer             ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let mut map = pick_map();
    println!("\n  ✓  silence below {:.3}, full volume above {:.3}\n",
             map.min_distance, map.max_distance);

    loop {
        print_ops_menu();
        let choice = read_line("Command: ").trim().to_ascii_lowercase();

        match choice.as_str() {
            "1" => {
                let d: f32 = read_line("  Span (normalized units): ")
                    .trim().parse().unwrap_or(0.0);
                println!("  span {:.4}  →  fraction {:.4}  →  {:.1}%",
                         d, map.fraction(d), map.percent(d));
            }
            "2" => {
                let (tx, ty) = read_point("thumb");
                let (ix, iy) = read_point("index");
                let d = distance(Point2D::new(tx, ty), Point2D::new(ix, iy));
                println!("  distance {:.4}  →  {:.1}%", d, map.percent(d));
            }
            "3" => {
                let steps = 12;
                let lo = map.min_distance - 0.02;
                let hi = map.max_distance + 0.02;
                println!("  {:>8}  {:>8}  {:>7}", "span", "fraction", "pct");
                for i in 0..=steps {
                    let d = lo + (hi - lo) * i as f32 / steps as f32;
                    println!("  {:>8.4}  {:>8.4}  {:>6.1}%",
                             d, map.fraction(d), map.percent(d));
                }
            }
            "4" => {
                map = pick_map();
                println!("  Thresholds now {:.3} / {:.3}.",
                         map.min_distance, map.max_distance);
            }
            "q" | "quit" => {
                println!("\nGoodbye!\n");
                break;
            }
            _ => println!("  ⚠  Unknown command."),
        }
        println!();
    }
}

fn print_ops_menu() {
    println!("  ┌─────────────────────────────────────────────────────────┐");
    println!("  │  1. Map a span              3. Print a sweep table      │");
    println!("  │  2. Map two fingertips      4. Change thresholds        │");
    println!("  │                             q. Quit                     │");
    println!("  └─────────────────────────────────────────────────────────┘");
}

fn pick_map() -> VolumeMap {
    loop {
        let min: f32 = read_line("  Silence threshold (default 0.05): ")
            .trim().parse().unwrap_or(0.05);
        let max: f32 = read_line("  Full-volume threshold (default 0.3): ")
            .trim().parse().unwrap_or(0.3);
        if max > min {
            break VolumeMap::new(min, max);
        }
        println!("  ⚠  Full-volume threshold must exceed the silence threshold.");
    }
}

fn read_point(label: &str) -> (f32, f32) {
    let x: f32 = read_line(&format!("  {} x (0–1): ", label))
        .trim().parse().unwrap_or(0.5);
    let y: f32 = read_line(&format!("  {} y (0–1): ", label))
        .trim().parse().unwrap_or(0.5);
    (x, y)
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
