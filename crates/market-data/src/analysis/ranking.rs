//! Search result ranking.

use std::cmp::Ordering;

use crate::models::SearchResult;

const EXACT_SYMBOL: f64 = 100.0;
const SYMBOL_PREFIX: f64 = 80.0;
const EXACT_NAME: f64 = 70.0;
const NAME_CONTAINS: f64 = 60.0;
const SYMBOL_CONTAINS: f64 = 50.0;
const NO_MATCH: f64 = 10.0;
const MAX_PROVIDER_BONUS: f64 = 10.0;

/// Score one result against a lowercased query.
fn score(query: &str, result: &SearchResult) -> f64 {
    let symbol = result.symbol.to_lowercase();
    let name = result.name.to_lowercase();

    let base = if symbol == query {
        EXACT_SYMBOL
    } else if symbol.starts_with(query) {
        SYMBOL_PREFIX
    } else if name == query {
        EXACT_NAME
    } else if name.contains(query) {
        NAME_CONTAINS
    } else if symbol.contains(query) {
        SYMBOL_CONTAINS
    } else {
        NO_MATCH
    };

    let bonus = result
        .match_score
        .filter(|s| s.is_finite())
        .map(|s| s.clamp(0.0, 1.0) * MAX_PROVIDER_BONUS)
        .unwrap_or(0.0);

    base + bonus
}

/// Score every result and sort best first.
///
/// The sort is stable, so equally scored results keep provider order. An
/// exact symbol match always ranks at or above a partial name match.
pub fn rank_search_results(query: &str, mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    let query = query.trim().to_lowercase();
    for result in &mut results {
        result.score = score(&query, result);
    }
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    results
}
