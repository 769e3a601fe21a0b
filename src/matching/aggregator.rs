//! Per-investor accumulation of matched investment counts.

use crate::error::{MatchError, MatchResult};
use crate::matching::combinator::dimensions;
use crate::matching::lookup::LookupPolicy;
use crate::models::{InvestmentRecord, QueryKey};
use crate::store::InvestmentLedger;
use futures::stream::{self, StreamExt, TryStreamExt};
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// How the ledger is queried for a plan of keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LookupStrategy {
    /// One set-membership lookup, grouped client-side.
    #[default]
    Batched,
    /// One equality lookup per key, bounded concurrency.
    FanOut,
}

/// Matched counts per investor, per query-key label.
///
/// Both levels keep insertion order: investors in the order they were first
/// seen, labels in the order they were first recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvestorAccumulator {
    investors: IndexMap<String, IndexMap<String, u64>>,
}

impl InvestorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (not add) the count for this investor under this key.
    pub fn record(&mut self, key: &QueryKey, record: &InvestmentRecord) {
        self.investors
            .entry(record.investor_id.clone())
            .or_default()
            .insert(key.label(), record.count());
    }

    pub fn len(&self) -> usize {
        self.investors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.investors.is_empty()
    }

    /// Raw investor ids in first-seen order.
    pub fn investor_ids(&self) -> impl Iterator<Item = &str> {
        self.investors.keys().map(String::as_str)
    }

    pub fn counts(&self, investor_id: &str) -> Option<&IndexMap<String, u64>> {
        self.investors.get(investor_id)
    }

    /// Consume into (investor id, counts) pairs in first-seen order.
    pub fn into_entries(self) -> impl Iterator<Item = (String, IndexMap<String, u64>)> {
        self.investors.into_iter()
    }
}

/// Runs the ledger lookups for a plan and folds them into an accumulator.
pub struct Aggregator<'a> {
    ledger: &'a dyn InvestmentLedger,
    policy: &'a LookupPolicy,
    strategy: LookupStrategy,
    concurrency: usize,
    show_progress: bool,
}

impl<'a> Aggregator<'a> {
    pub fn new(ledger: &'a dyn InvestmentLedger, policy: &'a LookupPolicy) -> Self {
        Self {
            ledger,
            policy,
            strategy: LookupStrategy::default(),
            concurrency: 4,
            show_progress: false,
        }
    }

    pub fn with_strategy(mut self, strategy: LookupStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Accumulate matched counts for every key in the plan.
    pub async fn aggregate(&self, keys: &[QueryKey]) -> MatchResult<InvestorAccumulator> {
        if keys.is_empty() {
            return Ok(InvestorAccumulator::new());
        }

        let accumulator = match self.strategy {
            LookupStrategy::Batched => self.aggregate_batched(keys).await?,
            LookupStrategy::FanOut => self.aggregate_fan_out(keys).await?,
        };

        info!("Unique investor IDs found: {}", accumulator.len());
        Ok(accumulator)
    }

    async fn aggregate_batched(&self, keys: &[QueryKey]) -> MatchResult<InvestorAccumulator> {
        let (sectors, stages, countries) = dimensions(keys);
        debug!(
            "Batched ledger lookup: {} sectors x {} stages x {} countries",
            sectors.len(),
            stages.len(),
            countries.len()
        );

        let ledger = self.ledger;
        let records = self
            .policy
            .run("investment ledger", || {
                ledger.find_any(&sectors, &stages, &countries)
            })
            .await?;

        let mut grouped: HashMap<(&str, &str, &str), Vec<&InvestmentRecord>> = HashMap::new();
        for record in &records {
            grouped
                .entry((
                    record.investment_sector.as_str(),
                    record.investment_stage.as_str(),
                    record.investment_country.as_str(),
                ))
                .or_default()
                .push(record);
        }

        // Replay in plan order so first-seen order matches per-key lookups.
        let mut accumulator = InvestorAccumulator::new();
        for key in keys {
            let bucket = (
                key.vertical.as_str(),
                key.funding_stage.as_str(),
                key.location.as_str(),
            );
            if let Some(matches) = grouped.get(&bucket) {
                debug!("Found {} matching investments for {}", matches.len(), key);
                for record in matches {
                    accumulator.record(key, record);
                }
            }
        }

        Ok(accumulator)
    }

    async fn aggregate_fan_out(&self, keys: &[QueryKey]) -> MatchResult<InvestorAccumulator> {
        let progress = self.progress_bar(keys.len());
        let progress_ref = &progress;
        let ledger = self.ledger;
        let policy = self.policy;

        // `buffered` yields results in plan order whatever order they finish in.
        let results: Vec<Vec<InvestmentRecord>> = stream::iter(keys.iter().cloned())
            .map(move |key: QueryKey| async move {
                debug!("Searching for: {}", key);
                let what = format!("investment ledger [{}]", key);
                let records = policy.run(&what, || ledger.find(&key)).await?;
                progress_ref.inc(1);
                Ok::<_, MatchError>(records)
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        progress.finish_and_clear();

        let mut accumulator = InvestorAccumulator::new();
        for (key, records) in keys.iter().zip(&results) {
            debug!("Found {} matching investments for {}", records.len(), key);
            for record in records {
                accumulator.record(key, record);
            }
        }

        Ok(accumulator)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lookups")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}
