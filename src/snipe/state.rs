//! Scan state and its control transitions

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

use super::progress::ProgressReport;
use crate::error::{Result, SniperError};
use crate::types::ScanStatus;

/// State of the current scan.
///
/// Only the scanner and its controller mutate this, always under the
/// scanner's lock.
#[derive(Debug, Clone)]
pub struct ScanState {
    /// Increments with every started scan
    pub scan_id: u64,
    /// Size of the candidate space
    pub total: u128,
    /// Candidates submitted so far, successful or not
    pub scanned: u128,
    pub status: ScanStatus,
    /// Monotonic start instant used for ETA accounting
    pub started_at: Instant,
    /// Wall-clock start time for display
    pub started_wall: DateTime<Utc>,
    /// Sum of all completed pause intervals
    pub paused_total: Duration,
    /// Start of the pause in progress, if any
    pub pause_started: Option<Instant>,
}

impl Default for ScanState {
    fn default() -> Self {
        Self::idle()
    }
}

impl ScanState {
    /// A state with no scan attached
    pub fn idle() -> Self {
        Self {
            scan_id: 0,
            total: 0,
            scanned: 0,
            status: ScanStatus::Idle,
            started_at: Instant::now(),
            started_wall: Utc::now(),
            paused_total: Duration::ZERO,
            pause_started: None,
        }
    }

    /// A freshly started, running scan over `total` candidates
    pub fn begin(scan_id: u64, total: u128) -> Self {
        Self {
            scan_id,
            total,
            status: ScanStatus::Running,
            ..Self::idle()
        }
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.status != ScanStatus::Running {
            return Err(SniperError::scan_state("pause", self.status));
        }
        self.status = ScanStatus::Paused;
        self.pause_started = Some(Instant::now());
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.status != ScanStatus::Paused {
            return Err(SniperError::scan_state("resume", self.status));
        }
        self.close_pause();
        self.status = ScanStatus::Running;
        Ok(())
    }

    /// Cancel the scan, or complete it when every candidate was already
    /// submitted
    pub fn stop(&mut self) -> Result<()> {
        if !self.status.is_active() {
            return Err(SniperError::scan_state("stop", self.status));
        }
        self.close_pause();
        self.status = ScanStatus::Cancelled;
        self.finish_if_exhausted();
        Ok(())
    }

    /// Count a submitted batch, whatever its lookup outcome was
    pub fn record_batch(&mut self, size: usize) {
        self.scanned = self.scanned.saturating_add(size as u128).min(self.total);
    }

    /// Finish a running scan; terminal states are left alone
    pub fn mark_completed(&mut self) {
        if self.status.is_active() {
            self.close_pause();
            self.status = ScanStatus::Completed;
        }
    }

    /// Once every candidate is counted the scan is complete, whether it was
    /// running, paused or stopped during the last batch
    pub fn finish_if_exhausted(&mut self) {
        if self.is_exhausted() && self.status != ScanStatus::Idle {
            self.close_pause();
            self.status = ScanStatus::Completed;
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.scanned >= self.total
    }

    /// Total pause time, including a pause still in progress
    pub fn paused_duration(&self) -> Duration {
        let ongoing = self
            .pause_started
            .map(|since| since.elapsed())
            .unwrap_or_default();
        self.paused_total + ongoing
    }

    /// Time spent scanning, excluding pauses
    pub fn active_elapsed(&self) -> Duration {
        self.started_at
            .elapsed()
            .saturating_sub(self.paused_duration())
    }

    pub fn progress(&self) -> ProgressReport {
        ProgressReport::compute(self.scanned, self.total, self.active_elapsed())
    }

    fn close_pause(&mut self) {
        if let Some(since) = self.pause_started.take() {
            self.paused_total += since.elapsed();
        }
    }
}
