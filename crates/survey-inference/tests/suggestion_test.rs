//! Suggestion service against a mocked chat completions endpoint.

#![cfg(feature = "openai")]

use survey_db::{
    CategoryRepository, Error, MemoryStore, SuggestionRepository, SuggestionStatus,
};
use survey_inference::{accept, reject, suggest_and_enqueue, OpenAIBackend, OpenAIConfig};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
}

fn backend(server: &MockServer) -> OpenAIBackend {
    OpenAIBackend::new(OpenAIConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        gen_model: "test-gen".to_string(),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_fenced_reply_is_queued() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-gen",
            "messages": [
                { "role": "system" },
                { "role": "user", "content": "Here are some comments:\n- AC mati\n- Wifi lambat" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
            "```json\n{\"suggestions\":[{\"parent\":\"Infrastructure\",\"child\":\"Cooling\"},{\"parent\":\"Infrastructure\",\"child\":\"Internet\"}]}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let queued = suggest_and_enqueue(&backend(&server), &store, &["AC mati", "Wifi lambat"])
        .await
        .unwrap();

    assert_eq!(queued.len(), 2);
    assert!(queued.iter().all(|s| s.status == SuggestionStatus::Pending));
    let pending = store
        .list_suggestions(Some(SuggestionStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);
}

#[tokio::test]
async fn test_prose_reply_is_bad_format_and_nothing_queued() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_reply("Here are a few ideas: Facilities, Internet.")),
        )
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let err = suggest_and_enqueue(&backend(&server), &store, &["AC mati"])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::BadFormat(_)));
    assert!(err.to_string().starts_with("bad_format"));
    assert!(store.list_suggestions(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_api_error_maps_to_config_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let err = suggest_and_enqueue(&backend(&server), &store, &["AC mati"])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config(msg) if msg.contains("Incorrect API key")));
}

#[tokio::test]
async fn test_accept_creates_missing_levels_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
            "{\"suggestions\":[{\"parent\":\"Infrastructure\",\"child\":\"Internet\"},{\"parent\":\"Infrastructure\",\"child\":\"Parking\"},{\"parent\":\"Academic\",\"child\":\"Exams\"}]}",
        )))
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let infra = store.create_parent("Infrastructure", None).await.unwrap();
    store.create_subcategory("Internet", infra.id).await.unwrap();

    let queued = suggest_and_enqueue(&backend(&server), &store, &["Parkir penuh"])
        .await
        .unwrap();

    let existing = accept(&store, &store, queued[0].id).await.unwrap();
    assert!(!existing.created_parent);
    assert!(!existing.created_subcategory);

    let new_sub = accept(&store, &store, queued[1].id).await.unwrap();
    assert!(!new_sub.created_parent);
    assert!(new_sub.created_subcategory);
    assert_eq!(new_sub.subcategory.parent_category_id, infra.id);

    reject(&store, queued[2].id).await.unwrap();

    assert_eq!(store.list_parents().await.unwrap().len(), 1);
    assert_eq!(store.list_subcategories().await.unwrap().len(), 2);
    assert_eq!(
        store.get_suggestion(queued[2].id).await.unwrap().status,
        SuggestionStatus::Rejected
    );

    let again = accept(&store, &store, queued[0].id).await.unwrap_err();
    assert!(matches!(again, Error::InvalidInput(msg) if msg.contains("already accepted")));
    let again = reject(&store, queued[2].id).await.unwrap_err();
    assert!(matches!(again, Error::InvalidInput(_)));
}
