//! Progress and ETA accounting

use serde::Serialize;
use std::time::Duration;

/// Below this many seconds the ETA is shown as hours, minutes and seconds
const EXACT_ETA_LIMIT_SECS: f64 = 36_000.0;

/// Above this many seconds the ETA switches to scientific notation
const WHOLE_HOURS_LIMIT_SECS: f64 = 3.6e6;

/// Snapshot of scan progress
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub scanned: u128,
    pub total: u128,
    pub percent: f64,
    /// `scanned/total`
    pub label: String,
    pub eta_seconds: f64,
    pub eta_label: String,
}

impl ProgressReport {
    /// Derive progress from counters and the active (unpaused) elapsed time
    pub fn compute(scanned: u128, total: u128, elapsed: Duration) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            (scanned as f64 / total as f64) * 100.0
        };

        let elapsed_secs = elapsed.as_secs_f64();
        let average = if scanned > 0 {
            elapsed_secs / scanned as f64
        } else {
            0.0
        };
        let estimated_total = average * total as f64;
        let remaining = estimated_total - elapsed_secs;
        let eta_seconds = if remaining.is_nan() || remaining < 0.0 {
            0.0
        } else {
            remaining
        };

        Self {
            scanned,
            total,
            percent,
            label: format!("{}/{}", scanned, total),
            eta_seconds,
            eta_label: format_eta(eta_seconds),
        }
    }
}

/// Format a remaining time in seconds.
///
/// * under 10 hours: `1h 23m 45s`
/// * up to 1000 hours: whole hours, `11h`
/// * beyond: hours in scientific notation, `1.11e+6h`
///
/// Every tier counts real hours (seconds / 3600), the scientific one included,
/// so 4e9 seconds reads `1.11e+6h` and not a thousandth of that.
pub fn format_eta(remaining_secs: f64) -> String {
    let secs = if remaining_secs.is_nan() || remaining_secs < 0.0 {
        0.0
    } else if remaining_secs.is_infinite() {
        f64::MAX
    } else {
        remaining_secs
    };

    if secs < EXACT_ETA_LIMIT_SECS {
        let hours = (secs / 3600.0).floor();
        let rest = secs % 3600.0;
        let minutes = (rest / 60.0).floor();
        let seconds = (rest % 60.0).floor();
        format!("{}h {}m {}s", hours as u64, minutes as u64, seconds as u64)
    } else if secs <= WHOLE_HOURS_LIMIT_SECS {
        format!("{}h", (secs / 3600.0).floor() as u64)
    } else {
        format!("{}h", to_exponential(secs / 3600.0))
    }
}

/// Two-decimal scientific notation with an explicit exponent sign (`1.11e+6`)
fn to_exponential(value: f64) -> String {
    let formatted = format!("{:.2e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => formatted,
    }
}
