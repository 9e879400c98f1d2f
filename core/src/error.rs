//! Error types for the feedback API client.
//!
//! # Design
//! Validation failures get their own variant because they are raised before
//! any request exists: the host never touches the network for them. Every
//! non-2xx response lands in `Http` with the status code and a message that
//! is either the server's `detail` or a per-operation fallback.

use thiserror::Error;

/// Reasons a submission is rejected before a request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No star was selected (rating 0).
    #[error("Please select a rating")]
    MissingRating,

    #[error("Rating must be between 1 and 5")]
    RatingOutOfRange(u8),

    /// The review is empty or whitespace only.
    #[error("Please write a review")]
    EmptyReview,
}

/// Errors returned by `FeedbackClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server returned a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status for `Http` errors, `None` for everything raised locally.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
