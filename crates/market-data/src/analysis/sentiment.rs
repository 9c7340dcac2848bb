//! Keyword-count sentiment for headlines.
//!
//! Deterministic and stateless: the same text always produces the same
//! score, and word order does not matter.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{SentimentLabel, SentimentScore};

/// Scores above this are positive, below its negation negative.
const LABEL_THRESHOLD: f64 = 0.2;
const BASE_CONFIDENCE: f64 = 50.0;
const MAX_CONFIDENCE: f64 = 95.0;

lazy_static! {
    /// Positive market vocabulary, matched on word boundaries
    static ref POSITIVE_REGEX: Regex = Regex::new(
        r"(?i)\b(surge[sd]?|surging|rall(y|ies|ied|ying)|gains?|gained|ris(e|es|ing)|rose|soar(s|ed|ing)?|jump(s|ed|ing)?|bullish|boom(s|ing)?|growth|grow(s|ing)?|profits?|profitable|beats?|record|strong(er)?|upgrades?|upgraded|outperform(s|ed)?|optimis(m|tic)|recover(s|ed|y)?|climb(s|ed|ing)?)\b"
    )
    .expect("Invalid regex pattern");

    /// Negative market vocabulary, matched on word boundaries
    static ref NEGATIVE_REGEX: Regex = Regex::new(
        r"(?i)\b(crash(es|ed|ing)?|plunge[sd]?|plunging|fall(s|ing)?|fell|drop(s|ped|ping)?|declin(e|es|ed|ing)|loss(es)?|bearish|fraud|lawsuits?|slump(s|ed)?|weak(er|ness)?|downgrades?|downgraded|recession|layoffs?|bankrupt(cy)?|fears?|miss(es|ed)?|tumble[sd]?|sink(s|ing)?|sank|selloff|sell-off)\b"
    )
    .expect("Invalid regex pattern");
}

fn count_matches(regex: &Regex, text: &str) -> usize {
    regex.find_iter(text).count()
}

/// Score a headline and its optional description.
///
/// `score = (pos - neg) / (pos + neg)`, 0 when no keyword matched.
/// Confidence grows with the magnitude of the score and the number of
/// matches, capped at 95; it is 50 when nothing matched.
///
/// # Examples
///
/// ```
/// use oracle_market_data::analysis::score_sentiment;
/// use oracle_market_data::models::SentimentLabel;
///
/// assert_eq!(score_sentiment("stocks surge and rally", None).label, SentimentLabel::Positive);
/// assert_eq!(score_sentiment("shares crash amid fraud", None).label, SentimentLabel::Negative);
/// assert_eq!(score_sentiment("market closed Tuesday", None).label, SentimentLabel::Neutral);
/// ```
pub fn score_sentiment(title: &str, description: Option<&str>) -> SentimentScore {
    let text = match description {
        Some(desc) => format!("{} {}", title, desc),
        None => title.to_string(),
    };

    let positive = count_matches(&POSITIVE_REGEX, &text);
    let negative = count_matches(&NEGATIVE_REGEX, &text);
    let total = positive + negative;

    if total == 0 {
        return SentimentScore {
            label: SentimentLabel::Neutral,
            score: 0.0,
            confidence: BASE_CONFIDENCE as u8,
        };
    }

    let score = (positive as f64 - negative as f64) / total as f64;
    let label = if score > LABEL_THRESHOLD {
        SentimentLabel::Positive
    } else if score < -LABEL_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };
    let confidence =
        (BASE_CONFIDENCE + score.abs() * 30.0 + 5.0 * total as f64).round().min(MAX_CONFIDENCE);

    SentimentScore {
        label,
        score,
        confidence: confidence as u8,
    }
}
