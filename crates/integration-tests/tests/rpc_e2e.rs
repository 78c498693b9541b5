//! JSON-RPC End-to-End Tests
//!
//! Real RPC server and real Gemini adapter, with the Gemini API stood in by a
//! local mock HTTP server.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use jsonrpsee::server::ServerHandle;
use serde_json::{json, Value};
use socialspark_api_rpc::error::code;
use socialspark_api_rpc::{RpcServer, RpcServerConfig};
use socialspark_core::application::{
    GenerationOrchestrator, GenerationSession, ProgressReporter, RetryPolicy, ThemeApplier,
};
use socialspark_core::port::id_provider::SequentialIdProvider;
use socialspark_core::port::time_provider::SystemTimeProvider;
use socialspark_core::port::InMemoryPresentation;
use socialspark_infra_gemini::{GeminiBackend, GeminiClient, GeminiConfig};
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00";

fn gemini_reply(output: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "parts": [{ "text": output.to_string() }] },
            "finishReason": "STOP"
        }]
    }))
}

/// Mock Gemini that answers each prompt by its wording
async fn mock_gemini() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("engaging caption"))
        .respond_with(gemini_reply(json!({"caption": "Pixel-perfect moment."})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("Generate relevant hashtags"))
        .respond_with(gemini_reply(json!({"hashtags": ["pixelart", "retro"]})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("determine the best theme"))
        .respond_with(gemini_reply(json!({"theme": "Serenity"})))
        .mount(&server)
        .await;
    server
}

async fn start_daemon(gemini: &MockServer) -> (HttpClient, ServerHandle) {
    let config = GeminiConfig::new("test-key")
        .with_api_base(format!("{}/v1beta", gemini.uri()))
        .with_request_timeout(Duration::from_secs(5));
    let backend = Arc::new(GeminiBackend::new(GeminiClient::new(config).unwrap()));

    let orchestrator = GenerationOrchestrator::from_backends(
        backend.clone(),
        backend.clone(),
        backend,
        RetryPolicy::new(3, Duration::from_millis(10)),
        ProgressReporter::default(),
    );
    let session = Arc::new(GenerationSession::new(
        Arc::new(orchestrator),
        ThemeApplier::new(Box::new(InMemoryPresentation::new()), true),
        Arc::new(SequentialIdProvider::default()),
        Arc::new(SystemTimeProvider),
    ));

    let rpc_config = RpcServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let (addr, handle) = RpcServer::new(rpc_config, session).start().await.unwrap();
    let client = HttpClientBuilder::default()
        .build(format!("http://{}", addr))
        .unwrap();
    (client, handle)
}

fn object(pairs: &[(&str, Value)]) -> ObjectParams {
    let mut params = ObjectParams::new();
    for (name, value) in pairs {
        params.insert(name, value.clone()).unwrap();
    }
    params
}

async fn poll_until_done(client: &HttpClient, job_id: &str) -> Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let status: Value = client
            .request(
                "content.status.v1",
                object(&[("job_id", json!(job_id))]),
            )
            .await
            .unwrap();
        if status["state"] != "RUNNING" {
            return status;
        }
        assert!(tokio::time::Instant::now() < deadline, "job never finished");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn test_submit_poll_and_theme_over_rpc() {
    let gemini = mock_gemini().await;
    let (client, handle) = start_daemon(&gemini).await;

    let submitted: Value = client
        .request(
            "content.submit.v1",
            object(&[
                ("image_base64", json!(STANDARD.encode(GIF))),
                ("description", json!("retro game screenshot")),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(submitted["state"], "RUNNING");
    let job_id = submitted["job_id"].as_str().unwrap().to_string();

    let status = poll_until_done(&client, &job_id).await;
    assert_eq!(status["state"], "COMPLETED");
    assert_eq!(status["progress"], 100);
    assert_eq!(status["caption"], "Pixel-perfect moment.");
    assert_eq!(status["hashtags"], json!(["pixelart", "retro"]));
    assert_eq!(status["theme"], "Serenity");
    assert!(status.get("error").is_none());

    let theme: Value = client
        .request("theme.current.v1", rpc_params![])
        .await
        .unwrap();
    assert_eq!(theme["auto_theme"], true);
    assert_eq!(theme["current_theme"], "Serenity");
    assert_eq!(theme["variables"].as_object().unwrap().len(), 8);

    let theme: Value = client
        .request("theme.auto.v1", object(&[("enabled", json!(false))]))
        .await
        .unwrap();
    assert_eq!(theme["current_theme"], Value::Null);
    assert!(theme["variables"].as_object().unwrap().is_empty());

    handle.stop().unwrap();
}

#[tokio::test]
async fn test_gemini_rejection_surfaces_as_failed_job() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
        .mount(&gemini)
        .await;
    let (client, handle) = start_daemon(&gemini).await;

    let submitted: Value = client
        .request(
            "content.submit.v1",
            object(&[
                ("image_base64", json!(STANDARD.encode(GIF))),
                ("wants_theme", json!(false)),
            ]),
        )
        .await
        .unwrap();

    let status = poll_until_done(&client, submitted["job_id"].as_str().unwrap()).await;
    assert_eq!(status["state"], "FAILED");
    assert_eq!(
        status["notice"],
        "Failed to process the image. Please try again."
    );
    assert!(status["error"].as_str().unwrap().contains("REJECTED"));
    assert!(status.get("caption").is_none());

    handle.stop().unwrap();
}

#[tokio::test]
async fn test_rpc_validation_and_not_found_codes() {
    let gemini = mock_gemini().await;
    let (client, handle) = start_daemon(&gemini).await;

    // BMP is not an accepted upload format
    let err = client
        .request::<Value, _>(
            "content.submit.v1",
            object(&[("image_base64", json!(STANDARD.encode(b"BM\x00\x00\x00\x00")))]),
        )
        .await
        .unwrap_err();
    match err {
        ClientError::Call(obj) => assert_eq!(obj.code(), code::VALIDATION_ERROR),
        other => panic!("unexpected error: {:?}", other),
    }

    let err = client
        .request::<Value, _>("content.status.v1", object(&[("job_id", json!("nope"))]))
        .await
        .unwrap_err();
    match err {
        ClientError::Call(obj) => assert_eq!(obj.code(), code::NOT_FOUND),
        other => panic!("unexpected error: {:?}", other),
    }

    handle.stop().unwrap();
}
