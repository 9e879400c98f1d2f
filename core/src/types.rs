//! Domain DTOs for the feedback API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. Fields the
//! server may omit are `Option` or `#[serde(default)]` so older servers still
//! parse.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall tone of a review as classified by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Rating-derived sentiment used when the server did not classify a review.
    pub fn from_rating(rating: u8) -> Self {
        match rating {
            4..=u8::MAX => Sentiment::Positive,
            0..=2 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

/// Direction of a metric over time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

/// A single feedback entry returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub id: i64,
    pub rating: u8,
    pub review_text: String,
    #[serde(default)]
    pub ai_response: Option<String>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub recommended_actions: Option<Vec<String>>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    pub created_at: String,
}

impl Feedback {
    /// Server sentiment, or the rating-derived one when the server sent none.
    pub fn effective_sentiment(&self) -> Sentiment {
        self.sentiment.unwrap_or_else(|| Sentiment::from_rating(self.rating))
    }

    /// Parse `created_at`, treating timestamps without an offset as UTC.
    ///
    /// Returns `None` for empty or unparseable values.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Request payload for submitting feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFeedback {
    pub rating: u8,
    pub review_text: String,
}

/// Body returned by a successful delete. Servers that answer 204 yield the
/// default value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteConfirmation {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentimentDistribution {
    #[serde(default)]
    pub positive: u64,
    #[serde(default)]
    pub neutral: u64,
    #[serde(default)]
    pub negative: u64,
}

impl SentimentDistribution {
    pub fn total(&self) -> u64 {
        self.positive + self.neutral + self.negative
    }

    pub fn get(&self, sentiment: Sentiment) -> u64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordStat {
    pub keyword: String,
    pub count: u64,
    #[serde(default)]
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RecentTrend {
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub direction: Trend,
}

/// One point of the reviews-over-time series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
    #[serde(default)]
    pub avg_rating: f64,
}

/// Server-computed aggregate over all feedback.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Analytics {
    pub total_reviews: u64,
    pub average_rating: f64,
    pub sentiment_distribution: SentimentDistribution,
    #[serde(default)]
    pub rating_distribution: BTreeMap<u8, u64>,
    #[serde(default)]
    pub top_keywords: Vec<KeywordStat>,
    #[serde(default)]
    pub recent_trend: RecentTrend,
    #[serde(default)]
    pub reviews_over_time: Vec<DailyCount>,
    #[serde(default)]
    pub positive_percentage: f64,
    #[serde(default)]
    pub negative_count: u64,
}
