//! Name sniper - walk every candidate name and classify it in bulk batches

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

use super::generator::NameGenerator;
use super::progress::ProgressReport;
use super::state::ScanState;
use super::{estimate_total, Alphabet};
use crate::error::{Result, SniperError};
use crate::lookup::{ProfileLookup, RetryPolicy};
use crate::output::ResultLog;
use crate::types::{ClaimedProfile, NameCheck, NameStatus, ScanConfig, ScanStatus, MAX_BATCH_SIZE};

/// Events emitted while a scan runs
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// A classified name; claimed names only appear when requested
    Result(NameCheck),
    /// Progress after a batch
    Progress(ProgressReport),
    /// A bulk lookup failed; its names were counted as scanned
    LookupFailed {
        batch_len: usize,
        kind: &'static str,
        message: String,
    },
    Completed,
    Cancelled,
}

/// Final report of a scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub status: ScanStatus,
    pub scanned: u128,
    pub total: u128,
    pub available: u64,
    pub claimed: u64,
    pub failed_batches: u64,
    pub started_at: DateTime<Utc>,
    /// Active scanning time, pauses excluded
    pub elapsed_secs: f64,
}

struct Shared {
    state: Mutex<ScanState>,
    wake: Notify,
    log: Mutex<ResultLog>,
}

/// Handle for controlling and observing the scan from other tasks
#[derive(Clone)]
pub struct ScanController {
    shared: Arc<Shared>,
}

impl ScanController {
    /// Suspend batch submission; the in-flight batch still completes
    pub fn pause(&self) -> Result<()> {
        self.shared.state.lock().pause()?;
        tracing::info!("Scan paused");
        Ok(())
    }

    pub fn resume(&self) -> Result<()> {
        self.shared.state.lock().resume()?;
        self.shared.wake.notify_one();
        tracing::info!("Scan resumed");
        Ok(())
    }

    /// Cancel the scan; takes effect once the in-flight batch returns.
    ///
    /// A scan whose last batch was already counted completes instead.
    pub fn stop(&self) -> Result<()> {
        self.shared.state.lock().stop()?;
        self.shared.wake.notify_one();
        tracing::info!("Scan stopped");
        Ok(())
    }

    /// Pause when running, resume when paused
    pub fn toggle_pause(&self) -> Result<ScanStatus> {
        let mut state = self.shared.state.lock();
        match state.status {
            ScanStatus::Paused => {
                state.resume()?;
                self.shared.wake.notify_one();
            }
            _ => state.pause()?,
        }
        Ok(state.status)
    }

    pub fn status(&self) -> ScanStatus {
        self.shared.state.lock().status
    }

    /// Copy of the current scan state
    pub fn snapshot(&self) -> ScanState {
        self.shared.state.lock().clone()
    }

    pub fn progress(&self) -> ProgressReport {
        self.shared.state.lock().progress()
    }

    /// Result lines emitted so far
    pub fn output_text(&self) -> String {
        self.shared.log.lock().text()
    }

    pub fn result_log(&self) -> ResultLog {
        self.shared.log.lock().clone()
    }
}

/// Scanner owning the single scan slot
pub struct NameSniper<L> {
    lookup: Arc<L>,
    batch_retry: RetryPolicy,
    controller: ScanController,
}

impl<L: ProfileLookup> NameSniper<L> {
    /// Create a sniper; failed batches are not retried
    pub fn new(lookup: L) -> Self {
        Self::from_arc(Arc::new(lookup))
    }

    pub fn from_arc(lookup: Arc<L>) -> Self {
        Self {
            lookup,
            batch_retry: RetryPolicy::once(),
            controller: ScanController {
                shared: Arc::new(Shared {
                    state: Mutex::new(ScanState::idle()),
                    wake: Notify::new(),
                    log: Mutex::new(ResultLog::new()),
                }),
            },
        }
    }

    /// Retry policy applied to each bulk lookup
    pub fn with_batch_retry(mut self, policy: RetryPolicy) -> Self {
        self.batch_retry = policy;
        self
    }

    pub fn controller(&self) -> ScanController {
        self.controller.clone()
    }

    pub fn lookup(&self) -> &Arc<L> {
        &self.lookup
    }

    /// Validate `config` and claim the scan slot.
    ///
    /// Fails without touching the current scan when one is running or paused.
    pub fn start(&self, config: &ScanConfig) -> Result<ActiveScan<L>> {
        let mut state = self.controller.shared.state.lock();
        if state.status.is_active() {
            return Err(SniperError::config("A scan is already in progress"));
        }

        config.validate_length()?;
        let alphabet = Alphabet::from_flags(
            config.include_letters,
            config.include_numbers,
            config.include_underscore,
        )?;
        let total = estimate_total(
            config.length,
            config.include_letters,
            config.include_numbers,
            config.include_underscore,
        );
        let generator = NameGenerator::new(config.length, alphabet);

        let scan_id = state.scan_id.wrapping_add(1);
        *state = ScanState::begin(scan_id, total);
        self.controller.shared.log.lock().clear();

        tracing::info!(
            length = config.length,
            total = %total,
            include_claimed = config.include_claimed,
            "Scan started"
        );

        Ok(ActiveScan {
            scan_id,
            lookup: Arc::clone(&self.lookup),
            retry: self.batch_retry.clone(),
            generator: Some(generator),
            include_claimed: config.include_claimed,
            controller: self.controller.clone(),
            available: 0,
            claimed: 0,
            failed_batches: 0,
            scanned: 0,
            total,
            elapsed_secs: 0.0,
            started_at: state.started_wall,
        })
    }

    /// Start a scan and drive it to the end
    pub async fn scan<F>(&self, config: &ScanConfig, on_event: F) -> Result<ScanSummary>
    where
        F: FnMut(&ScanEvent) + Send,
    {
        self.start(config)?.run(on_event).await
    }
}

/// A started scan, driven by [`ActiveScan::run`]
pub struct ActiveScan<L> {
    scan_id: u64,
    lookup: Arc<L>,
    retry: RetryPolicy,
    generator: Option<NameGenerator>,
    include_claimed: bool,
    controller: ScanController,
    available: u64,
    claimed: u64,
    failed_batches: u64,
    /// Last counters seen for this scan, kept if a newer scan takes the slot
    scanned: u128,
    total: u128,
    elapsed_secs: f64,
    started_at: DateTime<Utc>,
}

impl<L: ProfileLookup> ActiveScan<L> {
    pub fn controller(&self) -> ScanController {
        self.controller.clone()
    }

    pub fn total(&self) -> u128 {
        self.total
    }

    /// Run the batch loop until the candidates run out or the scan is stopped
    pub async fn run<F>(mut self, mut on_event: F) -> Result<ScanSummary>
    where
        F: FnMut(&ScanEvent) + Send,
    {
        let shared = Arc::clone(&self.controller.shared);

        loop {
            let status = {
                let mut state = shared.state.lock();
                if state.scan_id != self.scan_id {
                    // Stopped, then replaced by a newer scan
                    ScanStatus::Cancelled
                } else {
                    state.finish_if_exhausted();
                    state.status
                }
            };

            match status {
                ScanStatus::Running => {}
                ScanStatus::Paused => {
                    shared.wake.notified().await;
                    continue;
                }
                ScanStatus::Idle | ScanStatus::Completed | ScanStatus::Cancelled => break,
            }

            let batch = match self.generator.as_mut() {
                Some(generator) => generator.next_batch(MAX_BATCH_SIZE),
                None => Vec::new(),
            };
            if batch.is_empty() {
                let mut state = shared.state.lock();
                if state.scan_id == self.scan_id {
                    state.mark_completed();
                }
                break;
            }

            let lookup = self.lookup.as_ref();
            let names = batch.as_slice();
            let outcome = self
                .retry
                .run("bulk lookup", || lookup.lookup_bulk(names))
                .await;

            match outcome {
                Ok(profiles) => self.emit_results(&batch, &profiles, &mut on_event),
                Err(e) => {
                    self.failed_batches += 1;
                    tracing::warn!(
                        first = %batch[0],
                        batch_len = batch.len(),
                        error = %e,
                        "Bulk lookup failed, skipping batch"
                    );
                    on_event(&ScanEvent::LookupFailed {
                        batch_len: batch.len(),
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }

            let report = {
                let mut state = shared.state.lock();
                if state.scan_id == self.scan_id {
                    state.record_batch(batch.len());
                    self.elapsed_secs = state.active_elapsed().as_secs_f64();
                    state.progress()
                } else {
                    ProgressReport::compute(
                        self.scanned.saturating_add(batch.len() as u128).min(self.total),
                        self.total,
                        std::time::Duration::from_secs_f64(self.elapsed_secs),
                    )
                }
            };
            self.scanned = report.scanned;
            tracing::debug!(scanned = %report.scanned, total = %report.total, eta = %report.eta_label, "Batch processed");
            on_event(&ScanEvent::Progress(report));

            // Pause and stop requests are observed here
            tokio::task::yield_now().await;
        }

        let summary = self.summary();
        match summary.status {
            ScanStatus::Cancelled => {
                self.generator = None;
                on_event(&ScanEvent::Cancelled);
            }
            _ => on_event(&ScanEvent::Completed),
        }

        tracing::info!(
            status = %summary.status,
            scanned = %summary.scanned,
            total = %summary.total,
            available = summary.available,
            claimed = summary.claimed,
            failed_batches = summary.failed_batches,
            "Scan finished"
        );

        Ok(summary)
    }

    fn emit_results<F>(&mut self, batch: &[String], profiles: &[ClaimedProfile], on_event: &mut F)
    where
        F: FnMut(&ScanEvent) + Send,
    {
        for check in classify_batch(batch, profiles) {
            let emit = match check.status {
                NameStatus::Available => {
                    self.available += 1;
                    true
                }
                NameStatus::Claimed => {
                    self.claimed += 1;
                    self.include_claimed
                }
            };

            if emit {
                {
                    let state = self.controller.shared.state.lock();
                    if state.scan_id == self.scan_id {
                        self.controller.shared.log.lock().push_check(&check);
                    }
                }
                on_event(&ScanEvent::Result(check));
            }
        }
    }

    fn summary(&self) -> ScanSummary {
        let state = self.controller.shared.state.lock();
        let owned = state.scan_id == self.scan_id;
        ScanSummary {
            status: if owned { state.status } else { ScanStatus::Cancelled },
            scanned: self.scanned,
            total: self.total,
            available: self.available,
            claimed: self.claimed,
            failed_batches: self.failed_batches,
            started_at: self.started_at,
            elapsed_secs: if owned {
                state.active_elapsed().as_secs_f64()
            } else {
                self.elapsed_secs
            },
        }
    }
}

impl<L> Drop for ActiveScan<L> {
    fn drop(&mut self) {
        // An abandoned scan must not hold the slot forever
        let mut state = self.controller.shared.state.lock();
        if state.scan_id == self.scan_id && state.status.is_active() {
            let _ = state.stop();
        }
    }
}

/// Classify requested names against the claimed profiles, ignoring case.
///
/// Profiles for names that were not requested are ignored.
pub(crate) fn classify_batch(batch: &[String], profiles: &[ClaimedProfile]) -> Vec<NameCheck> {
    let mut claimed: HashMap<String, &ClaimedProfile> = HashMap::with_capacity(profiles.len());
    for profile in profiles {
        // First match wins when a name is listed twice
        claimed.entry(profile.name.to_lowercase()).or_insert(profile);
    }

    batch
        .iter()
        .map(|name| match claimed.get(&name.to_lowercase()) {
            Some(profile) => NameCheck::claimed((*profile).clone()),
            None => NameCheck::available(name.clone()),
        })
        .collect()
}
