//! Name Sniper - find unclaimed short player names
//!
//! Enumerates every name of a given length over a chosen alphabet, checks
//! them against the profile lookup service in bulk batches and reports which
//! ones are still available.

pub mod error;
pub mod lookup;
pub mod output;
pub mod snipe;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SniperError};
pub use types::{
    ClaimedProfile, ClientConfig, LookupOutcome, NameCheck, NameStatus, ScanConfig, ScanStatus,
    MAX_BATCH_SIZE, MAX_NAME_LENGTH, MIN_NAME_LENGTH,
};

// Re-export main functionality
pub use lookup::{check_name, MojangClient, NameChecker, NameValidator, ProfileLookup, RetryPolicy};
pub use output::ResultLog;
pub use snipe::{
    estimate_total, format_eta, ActiveScan, Alphabet, NameGenerator, NameSniper, ProgressReport,
    ScanController, ScanEvent, ScanState, ScanSummary,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
