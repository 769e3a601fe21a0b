//! Presentation of ranked matches: filtering, paging and rendering.

pub mod generator;
pub mod view;

use crate::models::{MatchedInvestor, StartupProfile};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use view::{Page, RankedMatch};

/// A displayable column of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Column {
    Rank,
    Website,
    InvestorType,
    Location,
    TotalInvestments,
    MatchedTotal,
    MatchedCounts,
    PreferredVerticals,
    PreferredIndustries,
}

const DEFAULT_COLUMNS: &[Column] = &[
    Column::Rank,
    Column::Website,
    Column::InvestorType,
    Column::Location,
    Column::MatchedTotal,
    Column::MatchedCounts,
];

impl Column {
    pub fn defaults() -> &'static [Column] {
        DEFAULT_COLUMNS
    }

    pub fn title(&self) -> &'static str {
        match self {
            Column::Rank => "Rank",
            Column::Website => "Website",
            Column::InvestorType => "Investor Type",
            Column::Location => "Location",
            Column::TotalInvestments => "Total Investments",
            Column::MatchedTotal => "Matched Total",
            Column::MatchedCounts => "Matched Counts",
            Column::PreferredVerticals => "Preferred Verticals",
            Column::PreferredIndustries => "Preferred Industries",
        }
    }

    /// Cell text for `entry`.
    pub fn value(&self, entry: &RankedMatch) -> String {
        let investor = &entry.investor;
        match self {
            Column::Rank => entry.rank.to_string(),
            Column::Website => investor.website().to_string(),
            Column::InvestorType => investor.investor_type().to_string(),
            Column::Location => investor.location(),
            Column::TotalInvestments => investor.total_investments().to_string(),
            Column::MatchedTotal => entry.matched_total.to_string(),
            Column::MatchedCounts => match investor {
                MatchedInvestor::Institutional(m) if m.investment_counts.is_empty() => {
                    "-".to_string()
                }
                MatchedInvestor::Institutional(m) => m
                    .investment_counts
                    .iter()
                    .map(|(label, count)| format!("{}: {}", label, count))
                    .collect::<Vec<_>>()
                    .join("; "),
                MatchedInvestor::Angel(m) => m.investment_counts.to_string(),
            },
            Column::PreferredVerticals => investor.preferred_verticals().join(", "),
            Column::PreferredIndustries => investor.preferred_industries().join(", "),
        }
    }
}

/// Query summary shown above the results.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub verticals: Vec<String>,
    pub funding_stages: Vec<String>,
    pub locations: Vec<String>,
    pub investor_types: Vec<String>,
    /// Number of (vertical, stage, location) combinations queried.
    pub combinations: usize,
    /// Investors in the full ranked list, before filtering.
    pub total_matches: usize,
    pub filter: Option<String>,
    pub duration_seconds: f64,
}

impl ReportMetadata {
    pub fn new(profile: &StartupProfile, total_matches: usize, duration_seconds: f64) -> Self {
        Self {
            generated_at: Utc::now(),
            verticals: profile.verticals.clone(),
            funding_stages: profile.target_funding_stages.clone(),
            locations: profile.target_locations.clone(),
            investor_types: profile.target_investor_types.clone(),
            combinations: profile.verticals.len()
                * profile.target_funding_stages.len()
                * profile.target_locations.len(),
            total_matches,
            filter: None,
            duration_seconds,
        }
    }
}

/// A rendered-ready report: metadata plus one page of matches.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub metadata: ReportMetadata,
    pub page: Page,
}
