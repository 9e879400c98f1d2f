//! Endpoint configuration and fixed timing constants.

use std::time::Duration;

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "FEEDBACK_API_URL";

/// Local development backend.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/backend/api/v1";

/// Version prefix stripped from the API base to reach the health route.
pub const API_VERSION_PREFIX: &str = "/api/v1";

/// Delay between wake-up probes.
pub const WAKE_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Probes sent before a wake-up gives up.
pub const WAKE_MAX_ATTEMPTS: u32 = 20;

/// Upper bound on a single health probe.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// How often the admin dashboard re-fetches feedback and analytics.
pub const DASHBOARD_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Resolve the API base from an explicit value, falling back to the
/// environment and then to [`DEFAULT_API_BASE`]. Blank values are ignored.
pub fn resolve_api_base(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(API_URL_ENV).ok())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

/// Health route for an API base: `.../backend/api/v1` maps to
/// `.../backend/health`, anything else gets `/health` appended.
pub fn health_url(api_base: &str) -> String {
    let base = api_base.trim_end_matches('/');
    let root = base.strip_suffix(API_VERSION_PREFIX).unwrap_or(base);
    format!("{root}/health")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_base_wins() {
        assert_eq!(resolve_api_base(Some("http://example.com/api")), "http://example.com/api");
    }

    #[test]
    fn blank_explicit_base_is_ignored() {
        let resolved = resolve_api_base(Some("  "));
        assert!(!resolved.trim().is_empty());
    }

    #[test]
    fn health_url_strips_version_prefix() {
        assert_eq!(
            health_url("http://127.0.0.1:8000/backend/api/v1"),
            "http://127.0.0.1:8000/backend/health"
        );
        assert_eq!(
            health_url("http://127.0.0.1:8000/backend/api/v1/"),
            "http://127.0.0.1:8000/backend/health"
        );
    }

    #[test]
    fn health_url_without_version_prefix_appends() {
        assert_eq!(health_url("https://feedback.example.com"), "https://feedback.example.com/health");
    }

    #[test]
    fn wake_bound_is_about_a_minute() {
        assert_eq!(WAKE_POLL_INTERVAL * WAKE_MAX_ATTEMPTS, Duration::from_secs(60));
    }
}
