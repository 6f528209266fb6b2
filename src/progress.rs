//! Progress reporting for batch runs.
//!
//! Either an indicatif bar, or, in log-only mode, periodic
//! `[phase] n/total (pct%)` lines on stderr for tail-friendly output.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Format duration in human-readable format
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}

/// Shared progress tracker; `inc` may be called from rayon workers.
pub struct Progress {
    bar: ProgressBar,
    phase: String,
    total: u64,
    interval: u64,
    done: AtomicU64,
    log_only: bool,
}

impl Progress {
    pub fn new(phase: &str, total: u64, log_only: bool) -> Self {
        let bar = ProgressBar::new(total);
        if log_only {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message(phase.to_string());

        Self {
            bar,
            phase: phase.to_string(),
            total,
            interval: (total / 20).max(1),
            done: AtomicU64::new(0),
            log_only,
        }
    }

    pub fn inc(&self) {
        let current = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        self.bar.inc(1);
        if self.log_only && should_log(current, self.total, self.interval) {
            let pct = 100.0 * current as f64 / self.total as f64;
            eprintln!("[{}] {}/{} ({:.1}%)", self.phase, current, self.total, pct);
        }
    }

    pub fn finish(&self, msg: &str) {
        self.bar.finish_with_message(msg.to_string());
    }
}

fn should_log(current: u64, total: u64, interval: u64) -> bool {
    current % interval == 0 || current == total
}
