//! Client-side checks run before a submission becomes a request.

use crate::error::ValidationError;
use crate::types::CreateFeedback;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Validate a star rating and review and produce the request payload.
///
/// The review is kept exactly as typed; only the emptiness check trims.
pub fn validate_submission(rating: u8, review_text: &str) -> Result<CreateFeedback, ValidationError> {
    if rating == 0 {
        return Err(ValidationError::MissingRating);
    }
    if rating > MAX_RATING {
        return Err(ValidationError::RatingOutOfRange(rating));
    }
    if review_text.trim().is_empty() {
        return Err(ValidationError::EmptyReview);
    }
    Ok(CreateFeedback {
        rating,
        review_text: review_text.to_string(),
    })
}
