//! Investor matching and ranking.
//!
//! The pipeline expands a startup profile into query keys, aggregates ledger
//! matches per investor, resolves institutional and angel profiles, and
//! merges them into a single ranked list.

pub mod aggregator;
pub mod combinator;
pub mod engine;
pub mod lookup;
pub mod ranker;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::{InvestorAccumulator, LookupStrategy};
pub use engine::{MatchEngine, MatchSettings};
pub use resolver::AngelOnlyPolicy;
