//! Store interfaces consumed by the matching engine.
//!
//! The engine never opens connections itself: the caller builds a
//! [`StoreHandle`] and passes it in, so every run sees exactly the stores it
//! was given and tests can swap in doubles.

pub mod dataset;

use crate::error::StoreResult;
use crate::models::{AngelInvestor, InstitutionalInvestor, InvestmentRecord, InvestorId, QueryKey};
use async_trait::async_trait;
use std::sync::Arc;

pub use dataset::{Dataset, DatasetStore};

/// Historical investment ledger.
#[async_trait]
pub trait InvestmentLedger: Send + Sync {
    /// Records whose sector, stage and country equal the key's components.
    async fn find(&self, key: &QueryKey) -> StoreResult<Vec<InvestmentRecord>>;

    /// Records whose sector, stage and country are each in the given sets.
    async fn find_any(
        &self,
        sectors: &[String],
        stages: &[String],
        countries: &[String],
    ) -> StoreResult<Vec<InvestmentRecord>>;
}

/// Institutional investor profiles.
#[async_trait]
pub trait InstitutionalStore: Send + Sync {
    /// Profiles whose id is in `ids` and, when given, whose type is in
    /// `investor_types`.
    async fn find(
        &self,
        ids: &[InvestorId],
        investor_types: Option<&[String]>,
    ) -> StoreResult<Vec<InstitutionalInvestor>>;
}

/// Angel investor profiles.
#[async_trait]
pub trait AngelStore: Send + Sync {
    /// At most `limit` angels targeting any of `locations`.
    async fn find(&self, locations: &[String], limit: usize) -> StoreResult<Vec<AngelInvestor>>;
}

/// The store clients a matching run works against.
#[derive(Clone)]
pub struct StoreHandle {
    pub ledger: Arc<dyn InvestmentLedger>,
    pub institutional: Arc<dyn InstitutionalStore>,
    pub angels: Arc<dyn AngelStore>,
}

impl StoreHandle {
    pub fn new(
        ledger: Arc<dyn InvestmentLedger>,
        institutional: Arc<dyn InstitutionalStore>,
        angels: Arc<dyn AngelStore>,
    ) -> Self {
        Self {
            ledger,
            institutional,
            angels,
        }
    }

    /// Use one backend for all three stores.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: InvestmentLedger + InstitutionalStore + AngelStore + 'static,
    {
        Self {
            ledger: store.clone(),
            institutional: store.clone(),
            angels: store,
        }
    }
}
