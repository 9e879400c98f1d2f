//! In-memory view state for the admin dashboard.
//!
//! The server stays the source of truth: collections are only replaced
//! wholesale on refresh, and the sole local mutation is dropping an item the
//! server already confirmed as deleted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::filter::FeedbackFilter;
use crate::types::{Analytics, Feedback, Trend};

/// Items shown in the dashboard's recent-reviews column.
pub const RECENT_LIMIT: usize = 10;

/// A headline number with its trend arrow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub title: &'static str,
    pub value: String,
    pub caption: &'static str,
    pub trend: Trend,
    /// `true` when a rising value is bad news.
    pub inverse: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    feedback: Vec<Feedback>,
    analytics: Option<Analytics>,
    last_updated: Option<DateTime<Utc>>,
    selected: Option<i64>,
    pub filter: FeedbackFilter,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_refresh(&mut self, feedback: Vec<Feedback>, analytics: Analytics, now: DateTime<Utc>) {
        self.feedback = feedback;
        self.analytics = Some(analytics);
        self.last_updated = Some(now);
        if let Some(id) = self.selected {
            if !self.feedback.iter().any(|f| f.id == id) {
                self.selected = None;
            }
        }
    }

    /// Replace only the feedback list (the all-reviews page never loads analytics).
    pub fn set_feedback(&mut self, feedback: Vec<Feedback>) {
        self.feedback = feedback;
    }

    pub fn feedback(&self) -> &[Feedback] {
        &self.feedback
    }

    pub fn analytics(&self) -> Option<&Analytics> {
        self.analytics.as_ref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Drop the item with `id` after the server confirmed the delete.
    pub fn remove(&mut self, id: i64) -> Option<Feedback> {
        let index = self.feedback.iter().position(|f| f.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.feedback.remove(index))
    }

    pub fn visible(&self) -> Vec<&Feedback> {
        self.filter.apply(&self.feedback)
    }

    pub fn recent(&self) -> Vec<&Feedback> {
        let mut visible = self.visible();
        visible.truncate(RECENT_LIMIT);
        visible
    }

    /// Keyword chips set the search query, or clear it when already active.
    pub fn toggle_keyword(&mut self, keyword: &str) {
        if self.filter.search == keyword {
            self.filter.search.clear();
        } else {
            self.filter.search = keyword.to_string();
        }
    }

    pub fn select(&mut self, id: i64) -> Option<&Feedback> {
        let found = self.feedback.iter().find(|f| f.id == id)?;
        self.selected = Some(id);
        Some(found)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Feedback> {
        let id = self.selected?;
        self.feedback.iter().find(|f| f.id == id)
    }

    /// Metric cards in display order. Missing analytics render as zeros.
    pub fn metrics(&self) -> Vec<Metric> {
        let fallback = Analytics::default();
        let a = self.analytics.as_ref().unwrap_or(&fallback);
        vec![
            Metric {
                title: "Total Reviews",
                value: a.total_reviews.to_string(),
                caption: "All time",
                trend: a.recent_trend.direction,
                inverse: false,
            },
            Metric {
                title: "Average Rating",
                value: format!("{:.1}", a.average_rating),
                caption: "Based on all time",
                trend: rating_trend(a.average_rating),
                inverse: false,
            },
            Metric {
                title: "Positive Feedback",
                value: format!("{}%", a.positive_percentage),
                caption: "Sentiment Score",
                trend: Trend::Up,
                inverse: false,
            },
            Metric {
                title: "Needs Attention",
                value: a.negative_count.to_string(),
                caption: "Negative Reviews",
                trend: if a.negative_count > 0 { Trend::Down } else { Trend::Stable },
                inverse: true,
            },
        ]
    }
}

fn rating_trend(average: f64) -> Trend {
    if average >= 4.0 {
        Trend::Up
    } else if average <= 3.0 {
        Trend::Down
    } else {
        Trend::Stable
    }
}
