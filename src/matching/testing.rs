//! Store doubles shared by the matching tests.

use crate::error::{StoreError, StoreResult};
use crate::models::{AngelInvestor, InstitutionalInvestor, InvestmentRecord, InvestorId, QueryKey};
use crate::store::{AngelStore, DatasetStore, InstitutionalStore, InvestmentLedger};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn record(
    investor_id: &str,
    sector: &str,
    stage: &str,
    country: &str,
    investments: Option<u64>,
) -> InvestmentRecord {
    InvestmentRecord {
        investor_id: investor_id.to_string(),
        investment_sector: sector.to_string(),
        investment_stage: stage.to_string(),
        investment_country: country.to_string(),
        investments,
    }
}

fn unavailable(store: &str) -> StoreError {
    StoreError::Unavailable {
        store: store.to_string(),
        reason: "connection reset by peer".to_string(),
    }
}

/// Ledger that fails transiently for its first `failures` calls and counts
/// every call.
pub struct FlakyLedger {
    inner: DatasetStore,
    failures: AtomicUsize,
    calls: AtomicUsize,
}

impl FlakyLedger {
    pub fn new(inner: DatasetStore, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn should_fail(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl InvestmentLedger for FlakyLedger {
    async fn find(&self, key: &QueryKey) -> StoreResult<Vec<InvestmentRecord>> {
        if self.should_fail() {
            return Err(unavailable("ledger"));
        }
        InvestmentLedger::find(&self.inner, key).await
    }

    async fn find_any(
        &self,
        sectors: &[String],
        stages: &[String],
        countries: &[String],
    ) -> StoreResult<Vec<InvestmentRecord>> {
        if self.should_fail() {
            return Err(unavailable("ledger"));
        }
        self.inner.find_any(sectors, stages, countries).await
    }
}

/// Ledger whose first lookup finishes last.
pub struct SlowFirstLedger {
    inner: DatasetStore,
    calls: AtomicUsize,
}

impl SlowFirstLedger {
    pub fn new(inner: DatasetStore) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl InvestmentLedger for SlowFirstLedger {
    async fn find(&self, key: &QueryKey) -> StoreResult<Vec<InvestmentRecord>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
        InvestmentLedger::find(&self.inner, key).await
    }

    async fn find_any(
        &self,
        sectors: &[String],
        stages: &[String],
        countries: &[String],
    ) -> StoreResult<Vec<InvestmentRecord>> {
        self.inner.find_any(sectors, stages, countries).await
    }
}

/// Wraps a dataset store and records what the investor stores were asked.
#[derive(Default)]
pub struct RecordingStore {
    inner: DatasetStore,
    pub institutional_queries: Mutex<Vec<(Vec<InvestorId>, Option<Vec<String>>)>>,
    pub angel_queries: Mutex<Vec<(Vec<String>, usize)>>,
}

impl RecordingStore {
    pub fn new(inner: DatasetStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn institutional_calls(&self) -> usize {
        self.institutional_queries.lock().unwrap().len()
    }

    pub fn angel_calls(&self) -> usize {
        self.angel_queries.lock().unwrap().len()
    }
}

#[async_trait]
impl InvestmentLedger for RecordingStore {
    async fn find(&self, key: &QueryKey) -> StoreResult<Vec<InvestmentRecord>> {
        InvestmentLedger::find(&self.inner, key).await
    }

    async fn find_any(
        &self,
        sectors: &[String],
        stages: &[String],
        countries: &[String],
    ) -> StoreResult<Vec<InvestmentRecord>> {
        self.inner.find_any(sectors, stages, countries).await
    }
}

#[async_trait]
impl InstitutionalStore for RecordingStore {
    async fn find(
        &self,
        ids: &[InvestorId],
        investor_types: Option<&[String]>,
    ) -> StoreResult<Vec<InstitutionalInvestor>> {
        self.institutional_queries
            .lock()
            .unwrap()
            .push((ids.to_vec(), investor_types.map(<[String]>::to_vec)));
        InstitutionalStore::find(&self.inner, ids, investor_types).await
    }
}

#[async_trait]
impl AngelStore for RecordingStore {
    async fn find(&self, locations: &[String], limit: usize) -> StoreResult<Vec<AngelInvestor>> {
        self.angel_queries
            .lock()
            .unwrap()
            .push((locations.to_vec(), limit));
        AngelStore::find(&self.inner, locations, limit).await
    }
}

/// Store that is never reachable.
pub struct DownStore;

#[async_trait]
impl InvestmentLedger for DownStore {
    async fn find(&self, _key: &QueryKey) -> StoreResult<Vec<InvestmentRecord>> {
        Err(unavailable("ledger"))
    }

    async fn find_any(
        &self,
        _sectors: &[String],
        _stages: &[String],
        _countries: &[String],
    ) -> StoreResult<Vec<InvestmentRecord>> {
        Err(unavailable("ledger"))
    }
}

#[async_trait]
impl InstitutionalStore for DownStore {
    async fn find(
        &self,
        _ids: &[InvestorId],
        _investor_types: Option<&[String]>,
    ) -> StoreResult<Vec<InstitutionalInvestor>> {
        Err(unavailable("investors"))
    }
}

#[async_trait]
impl AngelStore for DownStore {
    async fn find(&self, _locations: &[String], _limit: usize) -> StoreResult<Vec<AngelInvestor>> {
        Err(unavailable("angels"))
    }
}
