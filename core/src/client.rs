//! Stateless HTTP request builder and response parser for the feedback API.
//!
//! # Design
//! `FeedbackClient` holds only the API base and the derived health URL and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. The caller executes the actual HTTP round-trip.
//!
//! Submissions are validated inside `build_submit_feedback`, so an invalid
//! form never produces a request and the host has nothing to send.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Analytics, CreateFeedback, DeleteConfirmation, Feedback};
use crate::validation::validate_submission;

pub const SUBMIT_FALLBACK: &str = "Failed to submit feedback";
pub const LIST_FALLBACK: &str = "Failed to fetch feedback";
pub const DELETE_FALLBACK: &str = "Failed to delete feedback";
pub const ANALYTICS_FALLBACK: &str = "Failed to fetch analytics";

/// Synchronous, stateless client for the feedback API.
#[derive(Debug, Clone)]
pub struct FeedbackClient {
    base_url: String,
    health_url: String,
}

impl FeedbackClient {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let health_url = config::health_url(&base_url);
        Self { base_url, health_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }

    /// Validate and build the submission request.
    pub fn build_submit_feedback(&self, rating: u8, review_text: &str) -> Result<HttpRequest, ApiError> {
        let input = validate_submission(rating, review_text)?;
        self.build_create_feedback(&input)
    }

    fn build_create_feedback(&self, input: &CreateFeedback) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        debug!(rating = input.rating, "building feedback submission");
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/feedback/", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_list_feedback(&self) -> HttpRequest {
        get(format!("{}/feedback/", self.base_url))
    }

    pub fn build_delete_feedback(&self, id: i64) -> HttpRequest {
        debug!(id, "building feedback delete");
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/feedback/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_analytics(&self) -> HttpRequest {
        get(format!("{}/analytics/", self.base_url))
    }

    pub fn build_health(&self) -> HttpRequest {
        get(self.health_url.clone())
    }

    pub fn parse_submit_feedback(&self, response: HttpResponse) -> Result<Feedback, ApiError> {
        check_status(&response, SUBMIT_FALLBACK)?;
        decode(&response.body)
    }

    pub fn parse_list_feedback(&self, response: HttpResponse) -> Result<Vec<Feedback>, ApiError> {
        check_status(&response, LIST_FALLBACK)?;
        decode(&response.body)
    }

    /// An empty success body (204) yields a default confirmation.
    pub fn parse_delete_feedback(&self, response: HttpResponse) -> Result<DeleteConfirmation, ApiError> {
        check_status(&response, DELETE_FALLBACK)?;
        if response.body.trim().is_empty() {
            return Ok(DeleteConfirmation::default());
        }
        decode(&response.body)
    }

    pub fn parse_analytics(&self, response: HttpResponse) -> Result<Analytics, ApiError> {
        check_status(&response, ANALYTICS_FALLBACK)?;
        decode(&response.body)
    }

    /// Any 2xx means the backend is awake; the body is ignored.
    pub fn parse_health(&self, response: &HttpResponse) -> bool {
        response.is_success()
    }
}

fn get(path: String) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        path,
        headers: Vec::new(),
        body: None,
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-2xx responses to `ApiError::Http`, preferring the server's detail.
fn check_status(response: &HttpResponse, fallback: &str) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = server_detail(&response.body).unwrap_or_else(|| fallback.to_string());
    debug!(status = response.status, %message, "request failed");
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}

/// Extract a human-readable message from an error body.
///
/// Handles `{"detail": "..."}` and validation bodies of the form
/// `{"detail": [{"msg": "..."}, ...]}`. Anything else yields `None`.
pub fn server_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
