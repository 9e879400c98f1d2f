//! Executes core `HttpRequest`s over the network with ureq.

use anyhow::{Context, Result};
use feedback_core::config::HEALTH_TIMEOUT;
use feedback_core::{FeedbackClient, HttpMethod, HttpRequest, HttpResponse};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Transport {
    api: ureq::Agent,
    probe: ureq::Agent,
}

impl Transport {
    pub fn new() -> Self {
        // API calls run without a timeout; only the liveness probe is bounded.
        let api = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        let probe = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(HEALTH_TIMEOUT))
            .build()
            .new_agent();
        Self { api, probe }
    }

    /// Run one request. Non-2xx statuses come back as data for the core to
    /// interpret; only transport failures are errors here.
    pub fn execute(&self, req: HttpRequest) -> Result<HttpResponse> {
        send(&self.api, req)
    }

    /// One health probe. Transport failures count as "not alive".
    pub fn probe(&self, client: &FeedbackClient) -> bool {
        match send(&self.probe, client.build_health()) {
            Ok(response) => client.parse_health(&response),
            Err(err) => {
                warn!(error = %err, "health probe failed");
                false
            }
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

fn send(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse> {
    debug!(method = req.method.as_str(), path = %req.path, "sending request");
    let path = req.path.clone();
    let result = match (req.method, req.body) {
        (HttpMethod::Get, _) => with_headers(agent.get(&req.path), &req.headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(&req.path), &req.headers).call(),
        (HttpMethod::Post, Some(body)) => with_headers(agent.post(&req.path), &req.headers).send(body.as_bytes()),
        (HttpMethod::Post, None) => with_headers(agent.post(&req.path), &req.headers).send_empty(),
    };
    let mut response = result.with_context(|| format!("Could not reach {path}"))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .with_context(|| format!("Failed to read response from {path}"))?;
    debug!(status, "received response");

    Ok(HttpResponse { status, headers, body })
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[cfg(test)]
mod tests {
    use mock_server::Options;

    use super::*;
    use crate::test_support::{closed_port_url, start_server};

    fn header<'a>(response: &'a HttpResponse, name: &str) -> Option<&'a str> {
        response
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn execute_returns_success_body_and_headers() {
        let client = FeedbackClient::new(&start_server(Options::default()));
        let response = Transport::new().execute(client.build_list_feedback()).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "[]");
        assert_eq!(header(&response, "content-type"), Some("application/json"));
    }

    #[test]
    fn execute_returns_not_found_as_data() {
        let client = FeedbackClient::new(&start_server(Options::default()));
        let response = Transport::new().execute(client.build_delete_feedback(42)).unwrap();
        assert_eq!(response.status, 404);
        let err = client.parse_delete_feedback(response).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Feedback not found");
    }

    #[test]
    fn execute_returns_unprocessable_as_data() {
        let client = FeedbackClient::new(&start_server(Options::default()));
        let mut req = client.build_submit_feedback(5, "Too many stars").unwrap();
        req.body = Some(r#"{"rating":9,"review_text":"Too many stars"}"#.to_string());
        let response = Transport::new().execute(req).unwrap();
        assert_eq!(response.status, 422);
        let err = client.parse_submit_feedback(response).unwrap_err();
        assert_eq!(err.to_string(), "Rating must be between 1 and 5");
    }

    #[test]
    fn execute_forwards_request_headers() {
        let client = FeedbackClient::new(&start_server(Options::default()));
        let transport = Transport::new();

        // The server only accepts JSON bodies labelled as such.
        let mut unlabelled = client.build_submit_feedback(4, "Quick support").unwrap();
        unlabelled.headers.clear();
        assert_eq!(transport.execute(unlabelled).unwrap().status, 415);

        let response = transport
            .execute(client.build_submit_feedback(4, "Quick support").unwrap())
            .unwrap();
        assert_eq!(response.status, 200);
        let created = client.parse_submit_feedback(response).unwrap();
        assert_eq!(created.rating, 4);
    }

    #[test]
    fn execute_fails_when_unreachable() {
        let client = FeedbackClient::new(&closed_port_url());
        let err = Transport::new().execute(client.build_list_feedback()).unwrap_err();
        assert!(err.to_string().starts_with("Could not reach"));
    }

    #[test]
    fn health_check_on_closed_port_is_not_alive() {
        let client = FeedbackClient::new(&closed_port_url());
        assert!(!Transport::new().probe(&client));
    }

    #[test]
    fn health_check_on_cold_server_fails_then_succeeds() {
        let client = FeedbackClient::new(&start_server(Options { cold_start_checks: 1 }));
        let transport = Transport::new();
        assert!(!transport.probe(&client));
        assert!(transport.probe(&client));
    }
}
