//! Adaptive backoff policy.
//!
//! Projects with frequent edits stay at the 30-minute floor; quiescent ones
//! double toward the 24-hour ceiling. Doubling and reset are unconditional
//! and deterministic — no jitter — so every sequence is testable.

use quill_core::types::{clamp_interval, TrackedEntry, MAX_INTERVAL_SEC, MIN_INTERVAL_SEC};

/// Next backoff interval after one check.
///
/// A detected change (including an undeterminable head pair) resets to the
/// floor; an unchanged check doubles, clamped to the ceiling.
pub fn next_interval(current_sec: i64, changed: bool) -> i64 {
    if changed {
        MIN_INTERVAL_SEC
    } else {
        clamp_interval(current_sec.saturating_mul(2))
    }
}

/// Apply one check outcome to an entry: new interval plus deadline.
///
/// A persisted interval outside the allowed band (hand-edited state file) is
/// clamped before the step, so the invariant holds after every update.
pub fn apply(entry: &mut TrackedEntry, changed: bool, now: i64) {
    let current = clamp_interval(entry.interval_sec);
    entry.interval_sec = next_interval(current, changed);
    entry.next_due_ts = now + entry.interval_sec;
}
