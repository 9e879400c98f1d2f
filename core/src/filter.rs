use crate::types::Feedback;

/// Rating and free-text filters applied to the feedback list.
///
/// Both filters are optional and combine with AND. A rating of `0` or an
/// empty query means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackFilter {
    pub rating: Option<u8>,
    pub search: String,
}

impl FeedbackFilter {
    pub fn new(rating: Option<u8>, search: impl Into<String>) -> Self {
        Self {
            rating,
            search: search.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active_rating().is_none() && self.search.is_empty()
    }

    fn active_rating(&self) -> Option<u8> {
        self.rating.filter(|r| *r != 0)
    }

    pub fn matches(&self, item: &Feedback) -> bool {
        self.matches_rating(item) && self.matches_search(item)
    }

    fn matches_rating(&self, item: &Feedback) -> bool {
        self.active_rating().map_or(true, |r| item.rating == r)
    }

    /// Case-insensitive substring match on the review text or AI summary.
    fn matches_search(&self, item: &Feedback) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        item.review_text.to_lowercase().contains(&needle)
            || item
                .ai_summary
                .as_deref()
                .is_some_and(|summary| summary.to_lowercase().contains(&needle))
    }

    pub fn apply<'a>(&self, items: &'a [Feedback]) -> Vec<&'a Feedback> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}
