//! Data models for investor matching.
//!
//! This module contains the request shape, the startup profile derived from
//! it, ledger rows, stored investor documents, and the tagged match result
//! produced by the ranker.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Investor type label that selects the angel store.
pub const ANGEL_INVESTOR: &str = "Angel Investor";

/// Validated investor identity.
///
/// Stored documents are trusted and deserialize without checks; ids that
/// come from ledger rows go through [`InvestorId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvestorId(String);

impl InvestorId {
    /// Parse a raw identity. Returns `None` for empty ids or ids containing
    /// anything other than ASCII alphanumerics, `-` or `_`.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvestorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request body accepted by the caller boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    #[serde(default)]
    pub startup_data: StartupData,
    #[serde(default)]
    pub fundraising_data: FundraisingData,
}

/// Startup attributes relevant to matching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupData {
    #[serde(default)]
    pub verticals: Vec<String>,
}

/// Fundraising targets relevant to matching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundraisingData {
    #[serde(default)]
    pub target_funding_stages: Vec<String>,
    #[serde(default)]
    pub target_locations: Vec<String>,
    #[serde(default)]
    pub target_investors: Vec<String>,
}

impl MatchRequest {
    /// Build the immutable profile used by the engine.
    pub fn profile(&self) -> StartupProfile {
        StartupProfile::new(
            &self.startup_data.verticals,
            &self.fundraising_data.target_funding_stages,
            &self.fundraising_data.target_locations,
            &self.fundraising_data.target_investors,
        )
    }
}

/// The attribute sets a matching run is driven by.
///
/// Each list is de-duplicated keeping the first occurrence, so the lists
/// behave as ordered sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupProfile {
    pub verticals: Vec<String>,
    pub target_funding_stages: Vec<String>,
    pub target_locations: Vec<String>,
    pub target_investor_types: Vec<String>,
}

impl StartupProfile {
    pub fn new<S: AsRef<str>>(
        verticals: &[S],
        target_funding_stages: &[S],
        target_locations: &[S],
        target_investor_types: &[S],
    ) -> Self {
        Self {
            verticals: dedup_ordered(verticals),
            target_funding_stages: dedup_ordered(target_funding_stages),
            target_locations: dedup_ordered(target_locations),
            target_investor_types: dedup_ordered(target_investor_types),
        }
    }

    /// Whether the angel store should be consulted.
    pub fn wants_angels(&self) -> bool {
        self.target_investor_types
            .iter()
            .any(|t| t == ANGEL_INVESTOR)
    }

    /// The requested investor types that live in the institutional store.
    pub fn institutional_types(&self) -> Vec<String> {
        self.target_investor_types
            .iter()
            .filter(|t| t.as_str() != ANGEL_INVESTOR)
            .cloned()
            .collect()
    }
}

fn dedup_ordered<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| seen.insert(*s))
        .map(String::from)
        .collect()
}

/// One (vertical, stage, location) aggregation bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub vertical: String,
    pub funding_stage: String,
    pub location: String,
}

impl QueryKey {
    pub fn new(
        vertical: impl Into<String>,
        funding_stage: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            vertical: vertical.into(),
            funding_stage: funding_stage.into(),
            location: location.into(),
        }
    }

    /// Canonical `"{vertical}-{stage}-{country}"` label.
    pub fn label(&self) -> String {
        format!("{}-{}-{}", self.vertical, self.funding_stage, self.location)
    }

    /// Equality match on all three dimensions.
    pub fn matches(&self, record: &InvestmentRecord) -> bool {
        record.investment_sector == self.vertical
            && record.investment_stage == self.funding_stage
            && record.investment_country == self.location
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.vertical, self.funding_stage, self.location)
    }
}

/// A historical investment fact from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentRecord {
    pub investor_id: String,
    pub investment_sector: String,
    pub investment_stage: String,
    pub investment_country: String,
    /// Number of investments; absent means zero.
    #[serde(default)]
    pub investments: Option<u64>,
}

impl InvestmentRecord {
    pub fn count(&self) -> u64 {
        self.investments.unwrap_or(0)
    }
}

/// A stored institutional investor profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionalInvestor {
    #[serde(rename = "_id")]
    pub id: InvestorId,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub investor_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hq_location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_investments: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferred_vertical: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferred_industry: Vec<String>,
    /// Any other stored fields, passed through to the output untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InstitutionalInvestor {
    /// Only investors with a non-blank website can be acted upon.
    pub fn is_eligible(&self) -> bool {
        self.website
            .as_deref()
            .map(str::trim)
            .is_some_and(|w| !w.is_empty())
    }
}

/// A stored angel investor profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngelInvestor {
    #[serde(rename = "_id")]
    pub id: InvestorId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Stored either as a single location or a list of them.
    #[serde(default, deserialize_with = "one_or_many")]
    pub target_location: Vec<String>,
    #[serde(default)]
    pub total_investments: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AngelInvestor {
    pub fn total(&self) -> u64 {
        self.total_investments.unwrap_or(0)
    }

    pub fn targets_any(&self, locations: &[String]) -> bool {
        self.target_location.iter().any(|l| locations.contains(l))
    }
}

/// Stored documents are schemaless; a `null` reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Null(()) => Vec::new(),
    })
}

/// Institutional investor annotated with its per-key matched counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionalMatch {
    #[serde(flatten)]
    pub investor: InstitutionalInvestor,
    #[serde(rename = "investmentCounts")]
    pub investment_counts: IndexMap<String, u64>,
}

impl InstitutionalMatch {
    pub fn new(mut investor: InstitutionalInvestor, investment_counts: IndexMap<String, u64>) -> Self {
        investor.extra.remove("investmentCounts");
        Self {
            investor,
            investment_counts,
        }
    }

    pub fn matched_total(&self) -> u64 {
        self.investment_counts
            .values()
            .copied()
            .fold(0u64, u64::saturating_add)
    }
}

/// Angel investor normalized to the common display contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngelMatch {
    #[serde(flatten)]
    pub angel: AngelInvestor,
    pub investor_type: String,
    /// The angel's name, shown where institutional entries show a website.
    pub website: String,
    #[serde(rename = "investmentCounts")]
    pub investment_counts: u64,
}

impl AngelMatch {
    pub fn new(mut angel: AngelInvestor) -> Self {
        for key in ["investor_type", "website", "investmentCounts"] {
            angel.extra.remove(key);
        }
        let website = angel.name.clone();
        let investment_counts = angel.total();

        Self {
            angel,
            investor_type: ANGEL_INVESTOR.to_string(),
            website,
            investment_counts,
        }
    }
}

/// A ranked match: either an institutional or an angel investor.
///
/// Serialized untagged so each branch keeps its stored shape; the
/// `investor_type` field tells them apart on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MatchedInvestor {
    Institutional(InstitutionalMatch),
    Angel(AngelMatch),
}

impl MatchedInvestor {
    /// Total used for ranking: the scalar for angels, the sum of matched
    /// per-key counts for institutional investors.
    pub fn rankable_total(&self) -> u64 {
        match self {
            MatchedInvestor::Institutional(m) => m.matched_total(),
            MatchedInvestor::Angel(m) => m.investment_counts,
        }
    }

    /// Stored fields passed through verbatim.
    pub fn extra_mut(&mut self) -> &mut Map<String, Value> {
        match self {
            MatchedInvestor::Institutional(m) => &mut m.investor.extra,
            MatchedInvestor::Angel(m) => &mut m.angel.extra,
        }
    }

    pub fn id(&self) -> &InvestorId {
        match self {
            MatchedInvestor::Institutional(m) => &m.investor.id,
            MatchedInvestor::Angel(m) => &m.angel.id,
        }
    }

    pub fn website(&self) -> &str {
        match self {
            MatchedInvestor::Institutional(m) => m.investor.website.as_deref().unwrap_or(""),
            MatchedInvestor::Angel(m) => &m.website,
        }
    }

    pub fn investor_type(&self) -> &str {
        match self {
            MatchedInvestor::Institutional(m) => &m.investor.investor_type,
            MatchedInvestor::Angel(m) => &m.investor_type,
        }
    }

    /// HQ location for institutional investors, target locations for angels.
    pub fn location(&self) -> String {
        match self {
            MatchedInvestor::Institutional(m) => m.investor.hq_location.clone(),
            MatchedInvestor::Angel(m) => m.angel.target_location.join(", "),
        }
    }

    /// Stored lifetime investment volume.
    pub fn total_investments(&self) -> u64 {
        match self {
            MatchedInvestor::Institutional(m) => m.investor.total_investments,
            MatchedInvestor::Angel(m) => m.angel.total(),
        }
    }

    pub fn preferred_verticals(&self) -> &[String] {
        match self {
            MatchedInvestor::Institutional(m) => &m.investor.preferred_vertical,
            MatchedInvestor::Angel(_) => &[],
        }
    }

    pub fn preferred_industries(&self) -> &[String] {
        match self {
            MatchedInvestor::Institutional(m) => &m.investor.preferred_industry,
            MatchedInvestor::Angel(_) => &[],
        }
    }

    pub fn is_angel(&self) -> bool {
        matches!(self, MatchedInvestor::Angel(_))
    }
}
