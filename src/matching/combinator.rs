//! Expansion of a profile's target attributes into query keys.

use crate::models::QueryKey;

/// Full cartesian product of verticals x stages x locations.
///
/// Order is verticals outer, stages middle, locations inner. Any empty input
/// yields an empty plan.
pub fn combine<S: AsRef<str>>(verticals: &[S], stages: &[S], locations: &[S]) -> Vec<QueryKey> {
    let mut keys = Vec::with_capacity(verticals.len() * stages.len() * locations.len());

    for vertical in verticals {
        for stage in stages {
            for location in locations {
                keys.push(QueryKey::new(
                    vertical.as_ref(),
                    stage.as_ref(),
                    location.as_ref(),
                ));
            }
        }
    }

    keys
}

/// Distinct values of each dimension, in first-seen order.
pub fn dimensions(keys: &[QueryKey]) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut sectors: Vec<String> = Vec::new();
    let mut stages: Vec<String> = Vec::new();
    let mut countries: Vec<String> = Vec::new();

    for key in keys {
        if !sectors.contains(&key.vertical) {
            sectors.push(key.vertical.clone());
        }
        if !stages.contains(&key.funding_stage) {
            stages.push(key.funding_stage.clone());
        }
        if !countries.contains(&key.location) {
            countries.push(key.location.clone());
        }
    }

    (sectors, stages, countries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_product_size_and_uniqueness() {
        let keys = combine(&["Fintech", "AI", "Climate"], &["Seed", "Series A"], &["US", "UK"]);
        assert_eq!(keys.len(), 3 * 2 * 2);

        let labels: HashSet<String> = keys.iter().map(|k| k.label()).collect();
        assert_eq!(labels.len(), keys.len());
    }

    #[test]
    fn test_product_order() {
        let keys = combine(&["Fintech", "AI"], &["Seed", "Series A"], &["US", "UK"]);
        let labels: Vec<String> = keys.iter().map(|k| k.label()).collect();

        assert_eq!(
            labels,
            vec![
                "Fintech-Seed-US",
                "Fintech-Seed-UK",
                "Fintech-Series A-US",
                "Fintech-Series A-UK",
                "AI-Seed-US",
                "AI-Seed-UK",
                "AI-Series A-US",
                "AI-Series A-UK",
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_plan() {
        let empty: [&str; 0] = [];
        assert!(combine(&empty, &["Seed"], &["US"]).is_empty());
        assert!(combine(&["Fintech"], &empty, &["US"]).is_empty());
        assert!(combine(&["Fintech"], &["Seed"], &empty).is_empty());
    }

    #[test]
    fn test_dimensions_round_trip_the_inputs() {
        let keys = combine(&["Fintech", "AI"], &["Seed"], &["US", "UK"]);
        let (sectors, stages, countries) = dimensions(&keys);

        assert_eq!(sectors, vec!["Fintech", "AI"]);
        assert_eq!(stages, vec!["Seed"]);
        assert_eq!(countries, vec!["US", "UK"]);
    }
}
