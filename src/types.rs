//! Core types and structures for name-sniper

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, SniperError};

/// Shortest name the lookup service accepts
pub const MIN_NAME_LENGTH: usize = 1;

/// Longest name the lookup service accepts
pub const MAX_NAME_LENGTH: usize = 16;

/// Maximum number of names per bulk lookup request
pub const MAX_BATCH_SIZE: usize = 10;

/// Lifecycle of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Idle,
    Running,
    Paused,
    Completed,
    Cancelled,
}

impl ScanStatus {
    /// A scan in this state still holds the scan slot
    pub fn is_active(&self) -> bool {
        matches!(self, ScanStatus::Running | ScanStatus::Paused)
    }

    /// No further transitions are possible from this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Cancelled)
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStatus::Idle => write!(f, "idle"),
            ScanStatus::Running => write!(f, "running"),
            ScanStatus::Paused => write!(f, "paused"),
            ScanStatus::Completed => write!(f, "completed"),
            ScanStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Classification of a single name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStatus {
    Available,
    Claimed,
}

impl std::fmt::Display for NameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameStatus::Available => write!(f, "available"),
            NameStatus::Claimed => write!(f, "claimed"),
        }
    }
}

/// A profile returned by the lookup service for a claimed name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedProfile {
    pub name: String,
    pub id: String,
}

/// Raw outcome of a single-name lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The name belongs to an existing profile
    Found(ClaimedProfile),
    /// The service has no profile with this name
    NotFound,
    /// The response was neither a definitive hit nor a definitive miss
    Indeterminate,
}

/// Final result of checking one name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCheck {
    pub name: String,
    pub status: NameStatus,
    pub owner_id: Option<String>,
}

impl NameCheck {
    pub fn available(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: NameStatus::Available,
            owner_id: None,
        }
    }

    pub fn claimed(profile: ClaimedProfile) -> Self {
        Self {
            name: profile.name,
            status: NameStatus::Claimed,
            owner_id: Some(profile.id),
        }
    }

    /// Text line recorded in the result log
    pub fn line(&self) -> String {
        match (&self.status, &self.owner_id) {
            (NameStatus::Claimed, Some(id)) => format!("{} is claimed - {}", self.name, id),
            (NameStatus::Claimed, None) => format!("{} is claimed", self.name),
            (NameStatus::Available, _) => format!("{} is available", self.name),
        }
    }
}

/// Scan options, the equivalent of the scan form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Length of every generated name
    pub length: usize,
    /// Include a-z
    pub include_letters: bool,
    /// Include 0-9
    pub include_numbers: bool,
    /// Include '_'
    pub include_underscore: bool,
    /// Report claimed names as well as available ones
    pub include_claimed: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            length: 3,
            include_letters: true,
            include_numbers: true,
            include_underscore: true,
            include_claimed: false,
        }
    }
}

impl ScanConfig {
    /// Check the length range; alphabet validation happens in `Alphabet::from_flags`
    pub fn validate_length(&self) -> Result<()> {
        if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&self.length) {
            return Err(SniperError::config(format!(
                "Name length must be between {} and {}, got {}",
                MIN_NAME_LENGTH, MAX_NAME_LENGTH, self.length
            )));
        }
        Ok(())
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix prepended to every request URL (CORS or rotating proxy)
    pub proxy_url: Option<String>,
    /// Base URL of the single-name profile endpoint
    pub profile_url: String,
    /// Base URL of the bulk lookup endpoint
    pub services_url: String,
    pub timeout: Duration,
    /// Delay between retries of a single-name lookup
    pub retry_delay: Duration,
    /// Cap on single-name attempts; `None` retries until a definitive answer
    pub max_retries: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: None,
            profile_url: "https://api.mojang.com".to_string(),
            services_url: "https://api.minecraftservices.com".to_string(),
            timeout: Duration::from_secs(15),
            retry_delay: Duration::from_millis(1000),
            max_retries: None,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from `NAME_SNIPER_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(proxy) = get("NAME_SNIPER_PROXY_URL").filter(|v| !v.trim().is_empty()) {
            config.proxy_url = Some(proxy.trim().to_string());
        }
        if let Some(url) = get("NAME_SNIPER_PROFILE_URL").filter(|v| !v.trim().is_empty()) {
            config.profile_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(url) = get("NAME_SNIPER_SERVICES_URL").filter(|v| !v.trim().is_empty()) {
            config.services_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = get("NAME_SNIPER_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_number("NAME_SNIPER_TIMEOUT_SECS", &secs)?);
        }
        if let Some(ms) = get("NAME_SNIPER_RETRY_DELAY_MS") {
            config.retry_delay = Duration::from_millis(parse_number("NAME_SNIPER_RETRY_DELAY_MS", &ms)?);
        }
        if let Some(max) = get("NAME_SNIPER_MAX_RETRIES") {
            let max = parse_number("NAME_SNIPER_MAX_RETRIES", &max)?;
            // 0 keeps the unbounded default
            config.max_retries = if max == 0 {
                None
            } else {
                Some(u32::try_from(max).unwrap_or(u32::MAX))
            };
        }

        Ok(config)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| SniperError::config(format!("{} must be a non-negative integer: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_name_check_lines() {
        assert_eq!(NameCheck::available("abc").line(), "abc is available");
        let claimed = NameCheck::claimed(ClaimedProfile {
            name: "Notch".to_string(),
            id: "069a79f4".to_string(),
        });
        assert_eq!(claimed.line(), "Notch is claimed - 069a79f4");
    }

    #[test]
    fn test_length_validation() {
        let mut config = ScanConfig::default();
        assert!(config.validate_length().is_ok());
        config.length = 0;
        assert!(config.validate_length().is_err());
        config.length = 17;
        assert!(config.validate_length().is_err());
        config.length = 16;
        assert!(config.validate_length().is_ok());
    }

    #[test]
    fn test_client_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("NAME_SNIPER_PROXY_URL", "https://proxy.example/"),
            ("NAME_SNIPER_PROFILE_URL", "http://localhost:8080/"),
            ("NAME_SNIPER_RETRY_DELAY_MS", "250"),
            ("NAME_SNIPER_MAX_RETRIES", "5"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.proxy_url.as_deref(), Some("https://proxy.example/"));
        assert_eq!(config.profile_url, "http://localhost:8080");
        assert_eq!(config.services_url, "https://api.minecraftservices.com");
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert_eq!(config.max_retries, Some(5));
    }

    #[test]
    fn test_client_config_rejects_garbage() {
        let result = ClientConfig::from_lookup(|k| {
            (k == "NAME_SNIPER_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(SniperError::Config { .. })));
    }

    #[test]
    fn test_status_flags() {
        assert!(ScanStatus::Running.is_active());
        assert!(ScanStatus::Paused.is_active());
        assert!(!ScanStatus::Completed.is_active());
        assert!(ScanStatus::Cancelled.is_terminal());
        assert!(!ScanStatus::Idle.is_terminal());
    }
}
