//! # Mixed-Initiative Episodes
//!
//! Replays three scripted teleoperation episodes through the reference
//! controller, one decision per control cycle, and prints where the LOA
//! switcher would hand control over.
//!
//! - **Corridor** — the robot drifts off its path while driving forward.
//! - **Reversal** — the same drift, but the operator is already backing out.
//! - **Docking** — slow approach with small, noisy errors.
//!
//! Deterministic: no randomness, no timing. Run with
//!
//! ```bash
//! cargo run --example episodes
//! ```

use mi_fuzzy_core::controller::{LoaTerm, MixedInitiativeController};

// ── Episodes ─────────────────────────────────────────────────────────────────

/// `(error, speed)` per control cycle.
type Episode = Vec<(f64, f64)>;

fn corridor() -> Episode {
    (0..20).map(|t| (t as f64 * 0.005, 0.3)).collect()
}

fn reversal() -> Episode {
    (0..20).map(|t| (t as f64 * 0.005, -0.2)).collect()
}

fn docking() -> Episode {
    let wobble = [0.0, 0.004, 0.009, 0.003, 0.012, 0.006];
    (0..18)
        .map(|t| {
            let speed = 0.1 - t as f64 * 0.007;
            (0.03 + wobble[t % wobble.len()], speed)
        })
        .collect()
}

// ── Display helpers ───────────────────────────────────────────────────────────

fn bar(score: f64) -> String {
    // score in [-1, 1] → 0..=20 cells, centre at 10
    let filled = ((score + 1.0) * 10.0).round() as usize;
    let filled = filled.min(20);
    let mut out = String::with_capacity(22);
    out.push('[');
    for i in 0..20 {
        out.push(if i == 10 {
            '│'
        } else if i < filled {
            '█'
        } else {
            '░'
        });
    }
    out.push(']');
    out
}

fn run(name: &str, mi: &MixedInitiativeController, episode: &Episode) {
    println!("▶  {}\n", name);
    println!("  cycle   error    speed    score  {:22}  no_change  change", "");
    let mut handovers = 0;
    for (t, &(error, speed)) in episode.iter().enumerate() {
        match mi.decide_detailed(error, speed) {
            Ok(d) => {
                let marker = if d.value > 0.0 {
                    handovers += 1;
                    "  ← change LOA"
                } else {
                    ""
                };
                println!(
                    "  {:>5}  {:>6.3}  {:>+7.3}  {:>+7.3}  {}  {:>9.2}  {:>6.2}{}",
                    t,
                    error,
                    speed,
                    d.value,
                    bar(d.value),
                    d.activation(LoaTerm::NoChange).unwrap_or(0.0),
                    d.activation(LoaTerm::Change).unwrap_or(0.0),
                    marker,
                );
            }
            Err(e) => println!("  {:>5}  {:>6.3}  {:>+7.3}  error: {}", t, error, speed, e),
        }
    }
    println!("\n  {} of {} cycles would change LOA.\n", handovers, episode.len());
}

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║  Mixed-initiative LOA switcher — scripted episodes                  ║");
    println!("╚══════════════════════════════════════════════════════════════════════╝\n");

    let mi = match MixedInitiativeController::new() {
        Ok(mi) => mi,
        Err(e) => {
            eprintln!("reference configuration rejected: {}", e);
            return;
        }
    };

    run("CORRIDOR — drift while driving forward", &mi, &corridor());
    run("REVERSAL — same drift, operator already backing out", &mi, &reversal());
    run("DOCKING — slow approach, small noisy error", &mi, &docking());
}
