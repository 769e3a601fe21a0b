//! In-memory store backed by a JSON dataset file.
//!
//! The file holds the three collections the engine reads:
//!
//! ```json
//! { "investments": [...], "investors": [...], "angels": [...] }
//! ```

use super::{AngelStore, InstitutionalStore, InvestmentLedger};
use crate::error::StoreResult;
use crate::models::{AngelInvestor, InstitutionalInvestor, InvestmentRecord, InvestorId, QueryKey};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Raw contents of a dataset file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub investments: Vec<InvestmentRecord>,
    #[serde(default)]
    pub investors: Vec<InstitutionalInvestor>,
    #[serde(default)]
    pub angels: Vec<AngelInvestor>,
}

/// Read-only store answering all three lookups from memory.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    dataset: Dataset,
}

impl DatasetStore {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Load a dataset from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;

        let store = Self::from_json(&content)
            .with_context(|| format!("Failed to parse dataset file: {}", path.display()))?;

        info!(
            "Loaded dataset from {}: {} investments, {} investors, {} angels",
            path.display(),
            store.dataset.investments.len(),
            store.dataset.investors.len(),
            store.dataset.angels.len()
        );

        Ok(store)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(content)?;
        Ok(Self::new(dataset))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

#[async_trait]
impl InvestmentLedger for DatasetStore {
    async fn find(&self, key: &QueryKey) -> StoreResult<Vec<InvestmentRecord>> {
        Ok(self
            .dataset
            .investments
            .iter()
            .filter(|r| key.matches(r))
            .cloned()
            .collect())
    }

    async fn find_any(
        &self,
        sectors: &[String],
        stages: &[String],
        countries: &[String],
    ) -> StoreResult<Vec<InvestmentRecord>> {
        let records: Vec<_> = self
            .dataset
            .investments
            .iter()
            .filter(|r| {
                sectors.contains(&r.investment_sector)
                    && stages.contains(&r.investment_stage)
                    && countries.contains(&r.investment_country)
            })
            .cloned()
            .collect();

        debug!("Batched ledger lookup matched {} records", records.len());
        Ok(records)
    }
}

#[async_trait]
impl InstitutionalStore for DatasetStore {
    async fn find(
        &self,
        ids: &[InvestorId],
        investor_types: Option<&[String]>,
    ) -> StoreResult<Vec<InstitutionalInvestor>> {
        let wanted: HashSet<&InvestorId> = ids.iter().collect();

        Ok(self
            .dataset
            .investors
            .iter()
            .filter(|i| wanted.contains(&i.id))
            .filter(|i| investor_types.map_or(true, |types| types.contains(&i.investor_type)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AngelStore for DatasetStore {
    async fn find(&self, locations: &[String], limit: usize) -> StoreResult<Vec<AngelInvestor>> {
        Ok(self
            .dataset
            .angels
            .iter()
            .filter(|a| a.targets_any(locations))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture_store() -> DatasetStore {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/dataset.json");
        DatasetStore::load(&path).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_fixture() {
        let store = fixture_store();
        assert!(!store.dataset().investments.is_empty());
        assert!(!store.dataset().investors.is_empty());
        assert!(!store.dataset().angels.is_empty());
    }

    #[test]
    fn test_load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"investments": [{{"investor_id": "A", "investment_sector": "Fintech",
                "investment_stage": "Seed", "investment_country": "US", "investments": 3}}]}}"#
        )
        .unwrap();

        let store = DatasetStore::load(file.path()).unwrap();
        assert_eq!(store.dataset().investments.len(), 1);
        assert!(store.dataset().investors.is_empty());
    }

    #[test]
    fn test_load_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = DatasetStore::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse dataset file"));
    }

    #[test]
    fn test_null_fields_do_not_reject_the_dataset() {
        let store = DatasetStore::from_json(
            r#"{"investors": [{"_id": "A", "website": "a.com", "investor_type": "Venture Capital",
                "hq_location": null, "preferred_vertical": null}],
                "angels": [{"_id": "x1", "name": null, "target_location": "US"}]}"#,
        )
        .unwrap();

        let investor = &store.dataset().investors[0];
        assert_eq!(investor.hq_location, "");
        assert!(investor.preferred_vertical.is_empty());
        assert!(investor.is_eligible());
        assert_eq!(store.dataset().angels[0].name, "");
    }

    #[test]
    fn test_ledger_equality_lookup() {
        let store = fixture_store();
        let key = QueryKey::new("Fintech", "Seed", "US");

        let records = tokio_test::block_on(InvestmentLedger::find(&store, &key)).unwrap();
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| key.matches(r)));
    }

    #[test]
    fn test_ledger_set_lookup_covers_every_key() {
        let store = fixture_store();
        let sectors = strings(&["Fintech", "AI"]);
        let stages = strings(&["Seed"]);
        let countries = strings(&["US", "UK"]);

        let batched =
            tokio_test::block_on(store.find_any(&sectors, &stages, &countries)).unwrap();

        let mut expected = 0;
        for s in &sectors {
            for st in &stages {
                for c in &countries {
                    let key = QueryKey::new(s, st, c);
                    expected += tokio_test::block_on(InvestmentLedger::find(&store, &key))
                        .unwrap()
                        .len();
                }
            }
        }
        assert_eq!(batched.len(), expected);
    }

    #[tokio::test]
    async fn test_institutional_lookup_filters_by_type() {
        let store = fixture_store();
        let ids: Vec<InvestorId> = store.dataset().investors.iter().map(|i| i.id.clone()).collect();

        let all = InstitutionalStore::find(&store, &ids, None).await.unwrap();
        assert_eq!(all.len(), ids.len());

        let types = strings(&["Venture Capital"]);
        let vcs = InstitutionalStore::find(&store, &ids, Some(&types)).await.unwrap();
        assert!(!vcs.is_empty());
        assert!(vcs.iter().all(|i| i.investor_type == "Venture Capital"));
        assert!(vcs.len() < all.len());
    }

    #[tokio::test]
    async fn test_angel_lookup_respects_limit() {
        let store = fixture_store();
        let locations = strings(&["US", "UK"]);

        let all = AngelStore::find(&store, &locations, 1000).await.unwrap();
        assert!(all.len() > 1);

        let capped = AngelStore::find(&store, &locations, 1).await.unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0], all[0]);

        let none = AngelStore::find(&store, &strings(&["Antarctica"]), 1000)
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
