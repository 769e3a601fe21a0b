//! Filtering and pagination over a ranked result list.

use crate::models::MatchedInvestor;
use serde::Serialize;

/// One entry of the ranked list with its position and rankable total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMatch {
    /// 1-based position in the full ranked list.
    pub rank: usize,
    pub matched_total: u64,
    #[serde(flatten)]
    pub investor: MatchedInvestor,
}

/// Keys a ranked entry writes itself; stored fields of the same name are dropped.
const RANKED_KEYS: [&str; 2] = ["rank", "matched_total"];

/// Attach ranks to a ranked list.
pub fn with_ranks(investors: Vec<MatchedInvestor>) -> Vec<RankedMatch> {
    investors
        .into_iter()
        .enumerate()
        .map(|(i, mut investor)| {
            let extra = investor.extra_mut();
            for key in RANKED_KEYS {
                extra.remove(key);
            }
            RankedMatch {
                rank: i + 1,
                matched_total: investor.rankable_total(),
                investor,
            }
        })
        .collect()
}

/// Keep entries whose website or investor type contains `query`,
/// case-insensitively. An empty query keeps everything.
pub fn filter_matches(entries: Vec<RankedMatch>, query: &str) -> Vec<RankedMatch> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries;
    }

    entries
        .into_iter()
        .filter(|m| {
            m.investor.website().to_lowercase().contains(&needle)
                || m.investor.investor_type().to_lowercase().contains(&needle)
        })
        .collect()
}

/// A window of the (filtered) ranked list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// 1-based page number, clamped into range.
    pub number: usize,
    pub size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub entries: Vec<RankedMatch>,
}

/// Cut out page `number` (1-based) of `size` entries.
///
/// Page numbers past the end are clamped to the last page; a size of zero
/// means "everything on one page".
pub fn paginate(entries: Vec<RankedMatch>, number: usize, size: usize) -> Page {
    let total_items = entries.len();
    let size = if size == 0 { total_items.max(1) } else { size };
    let total_pages = total_items.div_ceil(size).max(1);
    let number = number.clamp(1, total_pages);

    let entries = entries
        .into_iter()
        .skip((number - 1) * size)
        .take(size)
        .collect();

    Page {
        number,
        size,
        total_items,
        total_pages,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::{angel, institutional};
    use crate::models::{AngelMatch, InstitutionalMatch};
    use indexmap::IndexMap;

    fn sample() -> Vec<RankedMatch> {
        let mut counts = IndexMap::new();
        counts.insert("Fintech-Seed-US".to_string(), 4);
        with_ranks(vec![
            MatchedInvestor::Institutional(InstitutionalMatch::new(
                institutional("A", "northwind.vc", "Venture Capital"),
                counts,
            )),
            MatchedInvestor::Angel(AngelMatch::new(angel("X", "Jane Doe", "US", 3))),
            MatchedInvestor::Institutional(InstitutionalMatch::new(
                institutional("B", "elmfamily.com", "Family Office"),
                IndexMap::new(),
            )),
        ])
    }

    #[test]
    fn test_ranks_are_one_based() {
        let entries = sample();
        let ranks: Vec<usize> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(entries[0].matched_total, 4);
    }

    #[test]
    fn test_stored_rank_fields_do_not_shadow_ranked_values() {
        let mut stored = institutional("A", "northwind.vc", "Venture Capital");
        stored.extra.insert("rank".to_string(), serde_json::json!(99));
        stored.extra.insert("matched_total".to_string(), serde_json::json!("stale"));
        let mut lone = angel("X", "Jane Doe", "US", 3);
        lone.extra.insert("rank".to_string(), serde_json::json!(7));

        let entries = with_ranks(vec![
            MatchedInvestor::Institutional(InstitutionalMatch::new(stored, IndexMap::new())),
            MatchedInvestor::Angel(AngelMatch::new(lone)),
        ]);

        let json = serde_json::to_string(&entries).unwrap();
        assert_eq!(json.matches("\"rank\"").count(), 2);
        assert_eq!(json.matches("\"matched_total\"").count(), 2);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["rank"], 1);
        assert_eq!(value[0]["matched_total"], 0);
        assert_eq!(value[1]["rank"], 2);
        assert_eq!(value[1]["matched_total"], 3);
    }

    #[test]
    fn test_filter_matches_website_or_type() {
        let by_site = filter_matches(sample(), "NORTHWIND");
        assert_eq!(by_site.len(), 1);
        assert_eq!(by_site[0].investor.id().as_str(), "A");

        let by_type = filter_matches(sample(), "angel");
        assert_eq!(by_type.len(), 1);
        assert_eq!(by_type[0].rank, 2);

        assert_eq!(filter_matches(sample(), "  ").len(), 3);
        assert!(filter_matches(sample(), "nobody").is_empty());
    }

    #[test]
    fn test_paginate_windows() {
        let page = paginate(sample(), 2, 2);
        assert_eq!(page.number, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.total_items, 3);
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].rank, 3);
    }

    #[test]
    fn test_paginate_clamps_out_of_range() {
        let page = paginate(sample(), 9, 2);
        assert_eq!(page.number, 2);

        let page = paginate(sample(), 0, 2);
        assert_eq!(page.number, 1);
        assert_eq!(page.entries.len(), 2);
    }

    #[test]
    fn test_paginate_empty_and_unbounded() {
        let empty = paginate(Vec::new(), 1, 10);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.entries.is_empty());

        let all = paginate(sample(), 1, 0);
        assert_eq!(all.entries.len(), 3);
        assert_eq!(all.total_pages, 1);
    }
}
