//! Merging of the two investor populations and ranking by matched volume.

use crate::matching::aggregator::InvestorAccumulator;
use crate::models::{AngelInvestor, AngelMatch, InstitutionalInvestor, InstitutionalMatch, MatchedInvestor};
use indexmap::IndexMap;

/// Union institutional and angel profiles into one ranked list.
///
/// Before sorting, institutional entries follow the accumulator's first-seen
/// order (profiles it never saw go after, in store order) and angels follow
/// in store order. The stable sort keeps that order among equal totals.
pub fn merge(
    institutional: Vec<InstitutionalInvestor>,
    angels: Vec<AngelInvestor>,
    accumulator: InvestorAccumulator,
) -> Vec<MatchedInvestor> {
    let mut merged: Vec<MatchedInvestor> = Vec::with_capacity(institutional.len() + angels.len());

    let mut profiles: IndexMap<String, InstitutionalInvestor> = institutional
        .into_iter()
        .map(|investor| (investor.id.as_str().to_string(), investor))
        .collect();

    for (id, counts) in accumulator.into_entries() {
        if let Some(investor) = profiles.shift_remove(&id) {
            merged.push(MatchedInvestor::Institutional(InstitutionalMatch::new(
                investor, counts,
            )));
        }
    }

    merged.extend(profiles.into_values().map(|investor| {
        MatchedInvestor::Institutional(InstitutionalMatch::new(investor, IndexMap::new()))
    }));

    merged.extend(
        angels
            .into_iter()
            .map(|angel| MatchedInvestor::Angel(AngelMatch::new(angel))),
    );

    rank(&mut merged);
    merged
}

/// Stable sort, highest rankable total first.
pub fn rank(investors: &mut [MatchedInvestor]) {
    investors.sort_by_key(|m| std::cmp::Reverse(m.rankable_total()));
}
