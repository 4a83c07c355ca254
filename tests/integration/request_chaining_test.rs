//! Request chaining integration tests
//!
//! These tests play the part of an execution harness: they parse a file,
//! order requests by their response dependencies, feed captured responses
//! into a response context and resolve later requests against it.

use super::init_test_env;
use httpfile::models::{HttpRequest, ResponseSnapshot};
use httpfile::parser::parse;
use httpfile::variables::{
    contains_response_variables, extract_referenced_requests, resolve_response_variables,
    ResponseContext, VariableContext,
};
use serde_json::json;
use std::collections::BTreeSet;
use std::time::Duration;

const CHAINED: &str = r#"@base = https://api.example.com

# @name login
POST {{base}}/auth/login
Content-Type: application/json

{"username": "test", "password": "pass"}

###

# @name profile
GET {{base}}/users/{{login.response.body.$.user.id}}
Authorization: Bearer {{login.response.body.$.token}}
X-Trace: {{login.response.header.x-request-id}}

###

# @name audit
POST {{base}}/audit
Content-Type: application/json

{"user": "{{profile.response.body.$.name}}", "status": {{profile.response.status}}, "took": {{profile.response.responseTime}}}
"#;

/// Helper to create a captured JSON response
fn create_mock_response(status_code: u16, body_json: serde_json::Value, elapsed: Duration) -> ResponseSnapshot {
    let mut response = ResponseSnapshot::new(status_code, "OK");
    response.add_header("Content-Type", "application/json");
    response.add_header("X-Request-Id", "req-42");
    response.set_body(serde_json::to_string(&body_json).unwrap());
    response.set_elapsed(elapsed);
    response
}

/// Every text field of a request that may carry placeholders.
fn request_texts(request: &HttpRequest) -> Vec<&str> {
    let mut texts = vec![request.url.as_str()];
    texts.extend(request.headers.values().map(String::as_str));
    texts.extend(request.body.as_deref());
    texts
}

fn dependencies(request: &HttpRequest) -> BTreeSet<String> {
    request_texts(request)
        .into_iter()
        .flat_map(extract_referenced_requests)
        .collect()
}

#[test]
fn test_dependency_discovery() {
    init_test_env();
    let document = parse(CHAINED).unwrap();

    let deps: Vec<Vec<String>> = document
        .requests()
        .iter()
        .map(|r| dependencies(r).into_iter().collect())
        .collect();

    assert!(deps[0].is_empty());
    assert_eq!(deps[1], vec!["login"]);
    assert_eq!(deps[2], vec!["profile"]);

    assert!(!contains_response_variables(&document.requests()[0].url));
    assert!(contains_response_variables(&document.requests()[1].url));
}

#[test]
fn test_request_chaining_workflow() {
    init_test_env();
    let document = parse(CHAINED).unwrap();
    let variables = VariableContext::from_document(&document);
    let mut responses = ResponseContext::new();

    // Run "login"
    let login = document.request("login").unwrap();
    assert_eq!(
        variables.resolve(&login.url),
        "https://api.example.com/auth/login"
    );
    responses.insert(
        "login",
        create_mock_response(
            200,
            json!({"token": "abc123", "user": {"id": 7}}),
            Duration::from_millis(80),
        ),
    );

    // Run "profile": response references first, then file variables
    let profile = document.request("profile").unwrap();
    let url = variables.resolve(&resolve_response_variables(&profile.url, &responses));
    assert_eq!(url, "https://api.example.com/users/7");

    let auth = resolve_response_variables(&profile.headers["Authorization"], &responses);
    assert_eq!(auth, "Bearer abc123");

    let trace = resolve_response_variables(&profile.headers["X-Trace"], &responses);
    assert_eq!(trace, "req-42");

    responses.insert(
        "profile",
        create_mock_response(
            200,
            json!({"name": "Ada", "roles": ["admin"]}),
            Duration::from_micros(1_250),
        ),
    );

    // Run "audit"
    let audit = document.request("audit").unwrap();
    let body = resolve_response_variables(audit.body.as_deref().unwrap(), &responses);
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed, json!({"user": "Ada", "status": 200, "took": 1.25}));
}

#[test]
fn test_chaining_before_response_is_captured() {
    init_test_env();
    let document = parse(CHAINED).unwrap();
    let responses = ResponseContext::new();

    let profile = document.request("profile").unwrap();
    let auth = &profile.headers["Authorization"];
    assert_eq!(resolve_response_variables(auth, &responses), *auth);
}

#[test]
fn test_chaining_non_json_body() {
    init_test_env();
    let mut login = ResponseSnapshot::new(502, "Bad Gateway");
    login.add_header("Content-Type", "text/html");
    login.set_body("<html>upstream error</html>");

    let mut responses = ResponseContext::new();
    responses.insert("login", login);

    let text = "{{login.response.status}} {{login.response.body.$.token}} {{login.response.contentType}}";
    assert_eq!(
        resolve_response_variables(text, &responses),
        "502 {{login.response.body.$.token}} text/html"
    );
}

#[test]
fn test_escaped_response_reference_survives_pipeline() {
    init_test_env();
    let content = "# @name ping\nGET https://x/ping\n\n###\n\n# @name echo\nPOST https://x/echo\n\nstatus={{ping.response.status}} literal=\\{{ping.response.status\\}}\n";
    let document = parse(content).unwrap();
    let variables = VariableContext::from_document(&document);

    let mut responses = ResponseContext::new();
    responses.insert("ping", ResponseSnapshot::new(204, "No Content"));

    let body = document.request("echo").unwrap().body.as_deref().unwrap();
    let sent = variables.resolve(&resolve_response_variables(body, &responses));
    assert_eq!(sent, "status=204 literal={{ping.response.status}}");
}

#[test]
fn test_variable_resolution_keeps_response_references() {
    init_test_env();
    let document = parse(CHAINED).unwrap();
    let variables = VariableContext::from_document(&document);

    let profile = document.request("profile").unwrap();
    assert_eq!(
        variables.resolve(&profile.url),
        "https://api.example.com/users/{{login.response.body.$.user.id}}"
    );
}
