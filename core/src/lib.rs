//! Synchronous API client core for the customer feedback dashboard.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `FeedbackClient` is stateless: it holds only the API base and health URL.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - Submission validation happens while building, so invalid input never
//!   reaches the host.
//! - View-layer state (`Dashboard`, `FeedbackFilter`, `HealthMonitor`) is
//!   plain data driven by parse results.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod health;
pub mod http;
pub mod types;
pub mod validation;

pub use client::FeedbackClient;
pub use dashboard::{Dashboard, Metric};
pub use error::{ApiError, ValidationError};
pub use filter::FeedbackFilter;
pub use health::{poll_until_awake, HealthMonitor, HealthStatus, WakePolicy};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{
    Analytics, CreateFeedback, DailyCount, DeleteConfirmation, Feedback, KeywordStat, RecentTrend, Sentiment,
    SentimentDistribution, Trend,
};
