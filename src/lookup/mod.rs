//! Profile lookup capability and single-name checking

pub mod mojang;
pub mod retry;
pub mod validator;

pub use mojang::MojangClient;
pub use retry::{Definitive, RetryPolicy};
pub use validator::NameValidator;

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Result, SniperError};
use crate::types::{ClaimedProfile, LookupOutcome, NameCheck};

/// Transport used to ask the profile service about names
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// Look up one name
    async fn lookup(&self, name: &str) -> Result<LookupOutcome>;

    /// Look up up to ten names at once, returning only the claimed ones.
    ///
    /// Malformed responses are errors, never partial results.
    async fn lookup_bulk(&self, names: &[String]) -> Result<Vec<ClaimedProfile>>;
}

#[async_trait]
impl<T: ProfileLookup + ?Sized> ProfileLookup for Arc<T> {
    async fn lookup(&self, name: &str) -> Result<LookupOutcome> {
        (**self).lookup(name).await
    }

    async fn lookup_bulk(&self, names: &[String]) -> Result<Vec<ClaimedProfile>> {
        (**self).lookup_bulk(names).await
    }
}

/// Check one name: validate it, then look it up under the retry policy
pub async fn check_name<L>(
    lookup: &L,
    validator: &NameValidator,
    policy: &RetryPolicy,
    name: &str,
) -> Result<NameCheck>
where
    L: ProfileLookup + ?Sized,
{
    let name = validator.validate(name)?;
    let started = Instant::now();

    let outcome = policy.run("profile lookup", || lookup.lookup(&name)).await?;

    tracing::debug!(
        name = %name,
        outcome = ?outcome,
        duration_ms = %started.elapsed().as_millis(),
        "Name check completed"
    );

    match outcome {
        LookupOutcome::Found(profile) => Ok(NameCheck::claimed(profile)),
        LookupOutcome::NotFound => Ok(NameCheck::available(name)),
        LookupOutcome::Indeterminate => Err(SniperError::internal(
            "retry policy returned an indeterminate outcome",
        )),
    }
}

/// Single-name checker bundling a transport, validator and retry policy
pub struct NameChecker<L: ?Sized> {
    lookup: Arc<L>,
    validator: NameValidator,
    policy: RetryPolicy,
}

impl<L: ProfileLookup + ?Sized> NameChecker<L> {
    pub fn new(lookup: Arc<L>) -> Self {
        Self::with_policy(lookup, RetryPolicy::default())
    }

    pub fn with_policy(lookup: Arc<L>, policy: RetryPolicy) -> Self {
        Self {
            lookup,
            validator: NameValidator::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Check a single name
    pub async fn check(&self, name: &str) -> Result<NameCheck> {
        check_name(self.lookup.as_ref(), &self.validator, &self.policy, name).await
    }

    /// Check several names concurrently, keeping input order
    pub async fn check_many(&self, names: &[String]) -> Vec<(String, Result<NameCheck>)> {
        let started = Instant::now();
        let results = join_all(names.iter().map(|name| self.check(name))).await;

        let errors = results.iter().filter(|r| r.is_err()).count();
        tracing::info!(
            names_requested = %names.len(),
            errors = %errors,
            duration_ms = %started.elapsed().as_millis(),
            "Name checks completed"
        );

        names.iter().cloned().zip(results).collect()
    }
}
