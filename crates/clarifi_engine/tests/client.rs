use std::time::Duration;

use clarifi_engine::{AnalysisClient, EndpointConfig, FailureKind, QaClient, ReqwestServiceClient};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> EndpointConfig {
    EndpointConfig::new(
        format!("{}/analyze", server.uri()),
        format!("{}/ask", server.uri()),
    )
}

#[tokio::test]
async fn submit_posts_text_and_returns_raw_body() {
    let server = MockServer::start().await;
    let body = r#"{"summary":"s","risks":[],"keyTerms":[]}"#;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "text": "This agreement ..." })))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestServiceClient::new(config_for(&server)).unwrap();
    let raw = client.submit("This agreement ...").await.expect("submit ok");

    assert_eq!(raw, body);
}

#[tokio::test]
async fn submit_returns_plain_bodies_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Looks fine.</p>\n"))
        .mount(&server)
        .await;

    let client = ReqwestServiceClient::new(config_for(&server)).unwrap();

    assert_eq!(client.submit("text").await.unwrap(), "<p>Looks fine.</p>\n");
}

#[tokio::test]
async fn submit_fails_with_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ReqwestServiceClient::new(config_for(&server)).unwrap();
    let err = client.submit("text").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn ask_posts_context_to_question_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({
            "question": "Can I leave early?",
            "originalText": "This agreement ...",
            "analysisReport": "{\"summary\":\"s\"}",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Only with 30 days notice."))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = ReqwestServiceClient::new(config_for(&server)).unwrap();
    let answer = client
        .ask("Can I leave early?", "This agreement ...", "{\"summary\":\"s\"}")
        .await
        .expect("ask ok");

    assert_eq!(answer, "Only with 30 days notice.");
}

#[tokio::test]
async fn ask_fails_with_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = ReqwestServiceClient::new(config_for(&server)).unwrap();
    let err = client.ask("q", "t", "r").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(429));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let config = EndpointConfig {
        request_timeout: Duration::from_millis(50),
        ..config_for(&server)
    };
    let client = ReqwestServiceClient::new(config).unwrap();
    let err = client.submit("text").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn malformed_endpoint_url_is_reported() {
    let client = ReqwestServiceClient::new(EndpointConfig::new("not a url", "also not")).unwrap();
    let err = client.submit("text").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
