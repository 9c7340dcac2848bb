//! Query relevance for news articles.

use std::collections::HashSet;

const NO_QUERY_RELEVANCE: u8 = 50;
const TITLE_WEIGHT: u32 = 2;
const DESCRIPTION_WEIGHT: u32 = 1;

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Score how well an article matches `query`, from 0 to 100.
///
/// Each query term found in the title earns 2 points and in the description
/// 1 point, scaled against the maximum of 3 points per term. Without a query
/// every article scores 50.
pub fn score_relevance(query: Option<&str>, title: &str, description: Option<&str>) -> u8 {
    let terms = match query {
        Some(q) => words(q),
        None => return NO_QUERY_RELEVANCE,
    };
    if terms.is_empty() {
        return NO_QUERY_RELEVANCE;
    }

    let title_words = words(title);
    let description_words = description.map(words).unwrap_or_default();

    let earned: u32 = terms
        .iter()
        .map(|term| {
            let mut points = 0;
            if title_words.contains(term) {
                points += TITLE_WEIGHT;
            }
            if description_words.contains(term) {
                points += DESCRIPTION_WEIGHT;
            }
            points
        })
        .sum();
    let possible = terms.len() as u32 * (TITLE_WEIGHT + DESCRIPTION_WEIGHT);

    ((earned as f64 / possible as f64) * 100.0).round() as u8
}
