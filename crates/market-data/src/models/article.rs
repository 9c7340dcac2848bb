use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentiment classification of a piece of text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Sentiment attached to an article.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    /// Polarity in [-1, 1]
    pub score: f64,
    /// Confidence in percent, capped at 95
    pub confidence: u8,
}

/// Provider-agnostic news article.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedArticle {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Publisher name
    pub source: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentScore>,

    /// Relevance to the query, 0..=100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<u8>,
}

/// One page of articles.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPage {
    /// Total matches reported by the provider (across all pages)
    pub total_results: u64,
    pub articles: Vec<NormalizedArticle>,
}
