//! The matching pipeline: combine, aggregate, resolve, merge and rank.

use crate::error::MatchResult;
use crate::matching::aggregator::{Aggregator, LookupStrategy};
use crate::matching::combinator::combine;
use crate::matching::lookup::LookupPolicy;
use crate::matching::ranker::merge;
use crate::matching::resolver::{AngelOnlyPolicy, Resolver, DEFAULT_ANGEL_LIMIT};
use crate::models::{MatchedInvestor, QueryKey, StartupProfile};
use crate::store::StoreHandle;
use std::time::Duration;
use tracing::{debug, info};

/// Tunables for a matching run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSettings {
    pub strategy: LookupStrategy,
    /// Maximum in-flight ledger lookups in fan-out mode.
    pub concurrency: usize,
    pub lookup: LookupPolicy,
    pub angel_limit: usize,
    pub angel_only_policy: AngelOnlyPolicy,
    /// Show a progress bar for fan-out lookups.
    pub show_progress: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            strategy: LookupStrategy::default(),
            concurrency: 4,
            lookup: LookupPolicy::default(),
            angel_limit: DEFAULT_ANGEL_LIMIT,
            angel_only_policy: AngelOnlyPolicy::default(),
            show_progress: false,
        }
    }
}

impl From<&crate::config::MatchingConfig> for MatchSettings {
    fn from(config: &crate::config::MatchingConfig) -> Self {
        Self {
            strategy: config.strategy,
            concurrency: config.concurrency,
            lookup: LookupPolicy {
                timeout: Duration::from_secs(config.lookup_timeout_seconds),
                retries: config.retries,
                backoff: Duration::from_millis(config.retry_backoff_ms),
            },
            angel_limit: config.angel_limit,
            angel_only_policy: config.angel_only_policy,
            show_progress: false,
        }
    }
}

/// Runs matching requests against an injected set of stores.
///
/// Holds no per-request state, so one engine can serve concurrent runs.
#[derive(Clone)]
pub struct MatchEngine {
    stores: StoreHandle,
    settings: MatchSettings,
}

impl MatchEngine {
    pub fn new(stores: StoreHandle, settings: MatchSettings) -> Self {
        Self { stores, settings }
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// The query plan a profile expands to.
    pub fn plan(profile: &StartupProfile) -> Vec<QueryKey> {
        combine(
            &profile.verticals,
            &profile.target_funding_stages,
            &profile.target_locations,
        )
    }

    /// Produce the ranked investor list for a profile.
    ///
    /// Any lookup failure fails the whole run; there are no partial results.
    pub async fn run(&self, profile: &StartupProfile) -> MatchResult<Vec<MatchedInvestor>> {
        let keys = Self::plan(profile);
        if keys.is_empty() {
            info!("No target combinations selected, returning empty result");
            return Ok(Vec::new());
        }
        debug!("Query plan has {} combinations", keys.len());

        let accumulator = Aggregator::new(self.stores.ledger.as_ref(), &self.settings.lookup)
            .with_strategy(self.settings.strategy)
            .with_concurrency(self.settings.concurrency)
            .with_progress(self.settings.show_progress)
            .aggregate(&keys)
            .await?;

        if accumulator.is_empty() {
            info!("No investor IDs found, returning empty result");
            return Ok(Vec::new());
        }

        let resolved = Resolver::new(
            self.stores.institutional.as_ref(),
            self.stores.angels.as_ref(),
            &self.settings.lookup,
        )
        .with_angel_limit(self.settings.angel_limit)
        .with_angel_only_policy(self.settings.angel_only_policy)
        .resolve(accumulator.investor_ids().collect::<Vec<_>>(), profile)
        .await?;

        let ranked = merge(resolved.institutional, resolved.angels, accumulator);
        info!("Matched {} investors", ranked.len());

        Ok(ranked)
    }
}
