//! Text and ranking heuristics applied to normalized payloads.
//!
//! - `sentiment` - Keyword-count sentiment for headlines
//! - `relevance` - Query term coverage for articles
//! - `ranking` - Match-tier ranking for symbol search

mod ranking;
mod relevance;
mod sentiment;

pub use ranking::rank_search_results;
pub use relevance::score_relevance;
pub use sentiment::score_sentiment;
