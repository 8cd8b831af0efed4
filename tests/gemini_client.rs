//! Coach gateway against a mocked Gemini endpoint

use std::time::Duration;

use anyhow::Result;
use serde_json::{Value, json};
use stitch::Coach;
use stitch::coach::prompts::{
    CHAT_EMPTY_FALLBACK, CHAT_ERROR_FALLBACK, PLAN_EMPTY_FALLBACK, PLAN_ERROR_FALLBACK,
};
use stitch::coach::{Attachment, AttachmentKind};
use stitch::config::GatewayConfig;
use stitch::exercises::Goal;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/models/gemini-3-pro-preview:generateContent";

fn create_test_config(server_url: &str) -> GatewayConfig {
    GatewayConfig {
        api_key: Some("test_key".to_string()),
        api_base: server_url.to_string(),
        timeout: Duration::from_secs(5),
        persona: "Coach persona".to_string(),
        ..GatewayConfig::default()
    }
}

fn text_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]}
        }]
    })
}

async fn last_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap_or_default();
    let request = requests.last().expect("no request received");
    serde_json::from_slice(&request.body).expect("request body is JSON")
}

#[tokio::test]
async fn test_workout_plan_success() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test_key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(text_reply("Focus on eccentric control.")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let coach = Coach::from_config(&create_test_config(&mock_server.uri()))?;
    let plan = coach.generate_workout_plan(Goal::Strength, 90).await;
    assert_eq!(plan, "Focus on eccentric control.");

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(requests[0].url.query(), None);

    let body = last_body(&mock_server).await;
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
    assert!(prompt.contains("Goal: Strength"));
    assert!(prompt.contains("Elite (90/100)"));
    assert!(body.get("systemInstruction").is_none());
    assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 1024);

    Ok(())
}

#[tokio::test]
async fn test_workout_plan_server_error_falls_back() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "Internal error"}
        })))
        .mount(&mock_server)
        .await;

    let coach = Coach::from_config(&create_test_config(&mock_server.uri()))?;
    let plan = coach.generate_workout_plan(Goal::Hypertrophy, 50).await;
    assert_eq!(plan, PLAN_ERROR_FALLBACK);

    Ok(())
}

#[tokio::test]
async fn test_workout_plan_empty_candidates() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&mock_server)
        .await;

    let coach = Coach::from_config(&create_test_config(&mock_server.uri()))?;
    let plan = coach.generate_workout_plan(Goal::Endurance, 30).await;
    assert_eq!(plan, PLAN_EMPTY_FALLBACK);

    Ok(())
}

#[tokio::test]
async fn test_chat_malformed_response_falls_back() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let coach = Coach::from_config(&create_test_config(&mock_server.uri()))?;
    let reply = coach.generate_ai_response(&[], "hi", None, None).await;
    assert_eq!(reply, CHAT_ERROR_FALLBACK);

    Ok(())
}

#[tokio::test]
async fn test_chat_empty_text_falls_back() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("")))
        .mount(&mock_server)
        .await;

    let coach = Coach::from_config(&create_test_config(&mock_server.uri()))?;
    let reply = coach.generate_ai_response(&[], "hi", None, None).await;
    assert_eq!(reply, CHAT_EMPTY_FALLBACK);

    Ok(())
}

#[tokio::test]
async fn test_chat_sends_inline_media_and_persona() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Hips rise early.")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let coach = Coach::from_config(&create_test_config(&mock_server.uri()))?;
    let image = Attachment::from_bytes(AttachmentKind::Image, "image/png", b"png")?;
    let video = Attachment::from_bytes(AttachmentKind::Video, "video/mp4", b"mp4")?;

    let reply = coach
        .generate_ai_response(&[], "Analyze this video", Some(&image), Some(&video))
        .await;
    assert_eq!(reply, "Hips rise early.");

    let body = last_body(&mock_server).await;
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Coach persona");
    let parts = &body["contents"][0]["parts"];
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
    assert_eq!(parts[0]["inlineData"]["data"], image.data());
    assert_eq!(parts[1]["inlineData"]["mimeType"], "video/mp4");
    assert_eq!(parts[2]["text"], "Analyze this video");

    Ok(())
}

#[tokio::test]
async fn test_missing_key_never_calls_api() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("unreachable")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = GatewayConfig {
        api_key: None,
        ..create_test_config(&mock_server.uri())
    };
    let coach = Coach::from_config(&config)?;
    assert_eq!(
        coach.generate_ai_response(&[], "hi", None, None).await,
        CHAT_ERROR_FALLBACK
    );

    Ok(())
}
