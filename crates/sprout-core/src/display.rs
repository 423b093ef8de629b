//! Text rendering helpers for snapshots: clock, growth stage, progress bar.

use crate::events::Snapshot;

/// Format seconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Sprout growth stage for a progress value, `1..=stages`.
///
/// Progress is clamped to `[0, 1]`. Returns 0 when `stages` is 0.
pub fn growth_level(progress: f64, stages: u32) -> u32 {
    if stages == 0 {
        return 0;
    }
    let p = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    let filled = (p * stages as f64).floor() as u32;
    filled.saturating_add(1).min(stages)
}

/// `[######------]` style bar, `width` cells wide.
pub fn progress_bar(progress: f64, width: usize) -> String {
    let p = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    let filled = ((p * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// One status line: clock, mode label, bar, growth stage and run state.
pub fn status_line(snapshot: &Snapshot, bar_width: usize, stages: u32) -> String {
    let state = if snapshot.running { "running" } else { "paused" };
    format!(
        "{} {:<11} {} sprout {}/{} ({})",
        format_clock(snapshot.seconds_left),
        snapshot.mode.label(),
        progress_bar(snapshot.progress, bar_width),
        growth_level(snapshot.progress, stages),
        stages,
        state,
    )
}
