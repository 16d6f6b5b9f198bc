use finsage::config::GenerationConfig;
use finsage::generation::openai::OpenAiClient;
use finsage::generation::{GenerationError, GenerationRequest, NarrativeGenerator};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(endpoint: &str) -> GenerationConfig {
    GenerationConfig {
        endpoint: format!("{endpoint}/v1/"),
        model: "test-model".into(),
        timeout_secs: 1,
        ..GenerationConfig::default()
    }
}

fn request() -> GenerationRequest {
    GenerationRequest {
        system_prompt: "You are a finance assistant.".into(),
        user_prompt: "What is an ETF?".into(),
        max_tokens: 50,
        temperature: 0.2,
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

#[tokio::test]
async fn sends_chat_completion_and_returns_trimmed_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "max_tokens": 50,
            "messages": [
                {"role": "system", "content": "You are a finance assistant."},
                {"role": "user", "content": "What is an ETF?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("  A basket of securities.\n")))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(&server.uri()), "sk-test".into()).unwrap();
    let text = client.generate(&request()).await.unwrap();
    assert_eq!(text, "A basket of securities.");
}

#[tokio::test]
async fn provider_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(&server.uri()), "sk-test".into()).unwrap();
    match client.generate(&request()).await {
        Err(GenerationError::Server { status, body }) => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_completion_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(&server.uri()), "sk-test".into()).unwrap();
    let err = client.generate(&request()).await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse));
}

#[tokio::test]
async fn no_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(&server.uri()), "sk-test".into()).unwrap();
    let err = client.generate(&request()).await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse));
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(&server.uri()), "sk-test".into()).unwrap();
    let err = client.generate(&request()).await.unwrap_err();
    assert!(matches!(err, GenerationError::Timeout(_)), "got {err:?}");
}
