//! Resolution of aggregated investor ids into full profiles.
//!
//! Two independent lookups: institutional profiles by id (optionally
//! restricted by investor type) and angel profiles by target location.

use crate::error::MatchResult;
use crate::matching::lookup::LookupPolicy;
use crate::models::{AngelInvestor, InstitutionalInvestor, InvestorId, StartupProfile};
use crate::store::{AngelStore, InstitutionalStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default cap on angel profiles fetched per run.
pub const DEFAULT_ANGEL_LIMIT: usize = 1000;

/// What the institutional lookup does when only angels were requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AngelOnlyPolicy {
    /// Query institutional profiles by id with no type restriction.
    #[default]
    Widen,
    /// Skip the institutional lookup entirely.
    Suppress,
}

/// Profiles fetched for one run.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub institutional: Vec<InstitutionalInvestor>,
    pub angels: Vec<AngelInvestor>,
}

pub struct Resolver<'a> {
    institutional: &'a dyn InstitutionalStore,
    angels: &'a dyn AngelStore,
    policy: &'a LookupPolicy,
    angel_limit: usize,
    angel_only_policy: AngelOnlyPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(
        institutional: &'a dyn InstitutionalStore,
        angels: &'a dyn AngelStore,
        policy: &'a LookupPolicy,
    ) -> Self {
        Self {
            institutional,
            angels,
            policy,
            angel_limit: DEFAULT_ANGEL_LIMIT,
            angel_only_policy: AngelOnlyPolicy::default(),
        }
    }

    pub fn with_angel_limit(mut self, limit: usize) -> Self {
        self.angel_limit = limit;
        self
    }

    pub fn with_angel_only_policy(mut self, policy: AngelOnlyPolicy) -> Self {
        self.angel_only_policy = policy;
        self
    }

    /// Fetch both populations concurrently. Either branch failing fails the
    /// whole resolution.
    pub async fn resolve<'i>(
        &self,
        investor_ids: impl IntoIterator<Item = &'i str>,
        profile: &StartupProfile,
    ) -> MatchResult<Resolved> {
        let ids = parse_ids(investor_ids);

        let (institutional, angels) = futures::try_join!(
            self.resolve_institutional(&ids, profile),
            self.resolve_angels(profile)
        )?;

        Ok(Resolved {
            institutional,
            angels,
        })
    }

    async fn resolve_institutional(
        &self,
        ids: &[InvestorId],
        profile: &StartupProfile,
    ) -> MatchResult<Vec<InstitutionalInvestor>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let types = profile.institutional_types();
        let type_filter = if !types.is_empty() {
            Some(types.as_slice())
        } else if !profile.wants_angels() {
            debug!("No investor types requested: institutional lookup by id only");
            None
        } else {
            match self.angel_only_policy {
                AngelOnlyPolicy::Widen => {
                    debug!("Angel-only request: institutional lookup by id only");
                    None
                }
                AngelOnlyPolicy::Suppress => {
                    debug!("Angel-only request: institutional lookup suppressed");
                    return Ok(Vec::new());
                }
            }
        };

        let store = self.institutional;
        let investors = self
            .policy
            .run("investor store", || store.find(ids, type_filter))
            .await?;
        info!("Fetched {} investors from the store", investors.len());

        let fetched = investors.len();
        let eligible: Vec<_> = investors.into_iter().filter(|i| i.is_eligible()).collect();
        if eligible.len() < fetched {
            debug!(
                "Dropped {} investors without a website",
                fetched - eligible.len()
            );
        }

        Ok(eligible)
    }

    async fn resolve_angels(&self, profile: &StartupProfile) -> MatchResult<Vec<AngelInvestor>> {
        if !profile.wants_angels() {
            return Ok(Vec::new());
        }

        let store = self.angels;
        let locations = &profile.target_locations;
        let limit = self.angel_limit;
        let angels = self
            .policy
            .run("angel store", || store.find(locations, limit))
            .await?;
        info!("Fetched {} angel investors from the store", angels.len());

        Ok(angels)
    }
}

/// Parse raw ids, dropping malformed ones with a warning.
fn parse_ids<'i>(raw: impl IntoIterator<Item = &'i str>) -> Vec<InvestorId> {
    raw.into_iter()
        .filter_map(|id| {
            let parsed = InvestorId::parse(id);
            if parsed.is_none() {
                warn!("Invalid investor id: {:?}", id);
            }
            parsed
        })
        .collect()
}
