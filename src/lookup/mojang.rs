//! HTTP transport against the public Mojang profile endpoints

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::ProfileLookup;
use crate::error::{Result, SniperError};
use crate::types::{ClaimedProfile, ClientConfig, LookupOutcome, MAX_BATCH_SIZE};

/// Message the profile endpoint uses for unknown names
const NOT_FOUND_MESSAGE: &str = "Couldn't find any profile with name";

/// Profile lookup client
#[derive(Debug, Clone)]
pub struct MojangClient {
    client: Client,
    config: ClientConfig,
}

impl MojangClient {
    /// Create a new client from configuration
    pub fn new(config: ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("name-sniper/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to create configured HTTP client: {}. Using default.", e);
                Client::new()
            });

        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL of the single-name profile endpoint
    pub fn profile_url(&self, name: &str) -> String {
        format!(
            "{}{}/users/profiles/minecraft/{}",
            self.proxy_prefix(),
            self.config.profile_url,
            name
        )
    }

    /// URL of the bulk lookup endpoint
    pub fn bulk_url(&self) -> String {
        format!(
            "{}{}/minecraft/profile/lookup/bulk/byname",
            self.proxy_prefix(),
            self.config.services_url
        )
    }

    fn proxy_prefix(&self) -> &str {
        self.config.proxy_url.as_deref().unwrap_or("")
    }
}

#[async_trait]
impl ProfileLookup for MojangClient {
    async fn lookup(&self, name: &str) -> Result<LookupOutcome> {
        let url = self.profile_url(name);
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND {
            return Ok(LookupOutcome::NotFound);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(rate_limited(&response));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SniperError::network(e.to_string(), Some(status.as_u16()), Some(url.clone())))?;

        let outcome = classify_profile_body(name, &body);
        tracing::debug!(name = %name, status = %status.as_u16(), outcome = ?outcome, "Profile lookup");
        Ok(outcome)
    }

    async fn lookup_bulk(&self, names: &[String]) -> Result<Vec<ClaimedProfile>> {
        if names.len() > MAX_BATCH_SIZE {
            return Err(SniperError::validation(format!(
                "Bulk lookups accept at most {} names, got {}",
                MAX_BATCH_SIZE,
                names.len()
            )));
        }

        let url = self.bulk_url();
        let response = self.client.post(&url).json(names).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(rate_limited(&response));
        }
        if !status.is_success() {
            return Err(SniperError::network(
                format!("Bulk lookup failed with status {}", status),
                Some(status.as_u16()),
                Some(url),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SniperError::network(e.to_string(), Some(status.as_u16()), Some(url.clone())))?;

        parse_bulk_body(&body)
    }
}

fn rate_limited(response: &reqwest::Response) -> SniperError {
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    SniperError::rate_limit("profile service returned 429", retry_after)
}

/// Classify the body of a single-name profile response.
///
/// A JSON `null` or the service's not-found message means the name is free,
/// an object carrying an `id` means it is taken, anything else is
/// indeterminate.
pub fn classify_profile_body(requested: &str, body: &str) -> LookupOutcome {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return LookupOutcome::Indeterminate,
    };

    if value.is_null() {
        return LookupOutcome::NotFound;
    }

    let not_found = value
        .get("errorMessage")
        .and_then(|m| m.as_str())
        .is_some_and(|m| m.contains(NOT_FOUND_MESSAGE));
    if not_found {
        return LookupOutcome::NotFound;
    }

    match value.get("id").and_then(|id| id.as_str()) {
        Some(id) => {
            let name = value
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or(requested);
            LookupOutcome::Found(ClaimedProfile {
                name: name.to_string(),
                id: id.to_string(),
            })
        }
        None => LookupOutcome::Indeterminate,
    }
}

/// Parse a bulk lookup body: a JSON array of `{ "name", "id" }` objects
pub fn parse_bulk_body(body: &str) -> Result<Vec<ClaimedProfile>> {
    serde_json::from_str::<Vec<ClaimedProfile>>(body)
        .map_err(|e| SniperError::parse(e.to_string(), Some(body.to_string())))
}
