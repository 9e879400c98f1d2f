//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or errors. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use feedback_core::{
    Analytics, ApiError, DeleteConfirmation, Feedback, FeedbackClient, HttpMethod, HttpRequest, HttpResponse,
};
use serde_json::Value;

const HOST: &str = "http://localhost:8000";
const API_PREFIX: &str = "/backend/api/v1";

fn client() -> FeedbackClient {
    FeedbackClient::new(&format!("{HOST}{API_PREFIX}"))
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(
        req.path,
        format!("{HOST}{API_PREFIX}{}", expected["path"].as_str().unwrap()),
        "{name}: path"
    );
}

fn assert_http_error(name: &str, err: ApiError, expected: &Value) {
    let status = expected["status"].as_u64().unwrap() as u16;
    assert_eq!(err.status(), Some(status), "{name}: status");
    assert_eq!(err.to_string(), expected["message"].as_str().unwrap(), "{name}: message");
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

#[test]
fn submit_test_vectors() {
    let raw = include_str!("../../test-vectors/submit.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let rating = input["rating"].as_u64().unwrap() as u8;
        let text = input["review_text"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_submit_feedback(rating, text).unwrap();
        assert_request(name, &req, expected_req);

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(req_body, expected_req["body"], "{name}: body");

        // Verify parse
        let result = c.parse_submit_feedback(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_http_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: Feedback = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

#[test]
fn submit_invalid_input_vectors() {
    let raw = include_str!("../../test-vectors/submit.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["invalid_inputs"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let rating = case["rating"].as_u64().unwrap() as u8;
        let text = case["review_text"].as_str().unwrap();

        let err = c.build_submit_feedback(rating, text).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)), "{name}: expected validation error");
        assert_eq!(err.to_string(), case["expected_error"].as_str().unwrap(), "{name}: message");
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/list.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        // Verify build
        let req = c.build_list_feedback();
        assert_request(name, &req, &case["expected_request"]);
        assert!(req.body.is_none(), "{name}: body should be None");

        // Verify parse
        let result = c.parse_list_feedback(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_http_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: Vec<Feedback> = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    let raw = include_str!("../../test-vectors/delete.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_i64().unwrap();

        // Verify build
        let req = c.build_delete_feedback(id);
        assert_request(name, &req, &case["expected_request"]);
        assert!(req.body.is_none(), "{name}: body should be None");

        // Verify parse
        let result = c.parse_delete_feedback(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_http_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: DeleteConfirmation = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[test]
fn analytics_test_vectors() {
    let raw = include_str!("../../test-vectors/analytics.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        // Verify build
        let req = c.build_analytics();
        assert_request(name, &req, &case["expected_request"]);

        // Verify parse
        let result = c.parse_analytics(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_http_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: Analytics = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[test]
fn health_test_vectors() {
    let raw = include_str!("../../test-vectors/health.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let c = FeedbackClient::new(&format!("{HOST}{}", case["base"].as_str().unwrap()));

        let req = c.build_health();
        assert_eq!(req.method, HttpMethod::Get, "{name}: method");
        assert_eq!(
            req.path,
            format!("{HOST}{}", case["expected_path"].as_str().unwrap()),
            "{name}: path"
        );

        let response = HttpResponse {
            status: case["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: case["body"].as_str().unwrap().to_string(),
        };
        assert_eq!(c.parse_health(&response), case["alive"].as_bool().unwrap(), "{name}: alive");
    }
}
