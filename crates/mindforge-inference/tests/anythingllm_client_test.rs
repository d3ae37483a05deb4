//! AnythingLLM client tests against a mock server.

use mindforge_core::{ChatHistoryQuery, Error, WorkspaceBackend, WorkspaceChatRequest};
use mindforge_inference::{AnythingLlmClient, AnythingLlmConfig};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> AnythingLlmClient {
    AnythingLlmClient::new(AnythingLlmConfig {
        base_url: server.uri(),
        api_key: "test-key".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_create_workspace_sends_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workspace/new"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_json(json!({"name": "Biology"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workspace": {"id": 7, "name": "Biology", "slug": "biology"},
            "message": "Workspace created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let workspace = client(&server).create_workspace("Biology").await.unwrap();
    assert_eq!(workspace.slug, "biology");
    assert_eq!(workspace.id, Some(7));
}

#[tokio::test]
async fn test_create_workspace_without_workspace_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workspace/new"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"workspace": null, "message": "name taken"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).create_workspace("x").await.unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));
    assert!(err.to_string().contains("name taken"));
}

#[tokio::test]
async fn test_rename_and_delete_workspace() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workspace/biology/update"))
        .and(body_json(json!({"name": "Biology II"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"workspace": {}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/workspace/biology"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.rename_workspace("biology", "Biology II").await.unwrap();
    client.delete_workspace("biology").await.unwrap();
}

#[tokio::test]
async fn test_delete_workspace_failure_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/workspace/gone"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Invalid API Key"))
        .mount(&server)
        .await;

    let err = client(&server).delete_workspace("gone").await.unwrap_err();
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_upload_document_returns_location() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/document/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "error": null,
            "documents": [{"location": "custom-documents/paper.pdf-abc.json", "name": "paper.pdf"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let doc = client(&server)
        .upload_document("paper.pdf", b"%PDF-1.4".to_vec())
        .await
        .unwrap();
    assert_eq!(doc.location, "custom-documents/paper.pdf-abc.json");
}

#[tokio::test]
async fn test_raw_text_upload_and_embed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/document/raw-text"))
        .and(body_json(json!({"textContent": "hello", "metadata": {"title": "note.txt"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "documents": [{"location": "custom-documents/note.txt-1.json"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workspace/biology/update-embeddings"))
        .and(body_json(json!({"adds": ["custom-documents/note.txt-1.json"], "deletes": []})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"workspace": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let doc = client.upload_raw_text("note.txt", "hello").await.unwrap();
    client
        .embed_documents("biology", &[doc.location])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_upload_without_documents_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/document/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "unsupported file type",
            "documents": []
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .upload_document("x.exe", vec![0])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unsupported file type"));
}

#[tokio::test]
async fn test_chat_passes_session_and_returns_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workspace/biology/chat"))
        .and(body_json(json!({
            "message": "what is a cell?",
            "mode": "chat",
            "sessionId": "conv-1",
            "attachments": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chat-uuid",
            "type": "textResponse",
            "textResponse": "The basic unit of life.",
            "sources": [{"title": "cells.pdf"}],
            "close": true,
            "error": null,
            "metrics": {"completion_tokens": 6}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let req = WorkspaceChatRequest {
        message: "what is a cell?".to_string(),
        mode: "chat".to_string(),
        session_id: Some("conv-1".to_string()),
        attachments: vec![],
    };
    let reply = client(&server).chat("biology", &req).await.unwrap();
    assert_eq!(reply.text_response.as_deref(), Some("The basic unit of life."));
    assert_eq!(reply.sources.len(), 1);
    assert!(reply.metrics.is_some());
}

#[tokio::test]
async fn test_chat_abort_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workspace/biology/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "x",
            "type": "abort",
            "textResponse": null,
            "sources": [],
            "close": true,
            "error": "Workspace biology is not a valid workspace."
        })))
        .mount(&server)
        .await;

    let req = WorkspaceChatRequest {
        message: "hi".to_string(),
        mode: "chat".to_string(),
        session_id: None,
        attachments: vec![],
    };
    let err = client(&server).chat("biology", &req).await.unwrap_err();
    assert!(err.to_string().contains("not a valid workspace"));
}

#[tokio::test]
async fn test_chat_history_forwards_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workspace/biology/chats"))
        .and(query_param("limit", "20"))
        .and(query_param("orderBy", "desc"))
        .and(query_param("apiSessionId", "conv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "history": [{"role": "user", "content": "hi", "sentAt": 1}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = ChatHistoryQuery {
        limit: Some(20),
        order_by: Some("desc".to_string()),
        api_session_id: Some("conv-1".to_string()),
    };
    let body = client(&server).chat_history("biology", &query).await.unwrap();
    assert_eq!(body["history"][0]["content"], "hi");
}

#[tokio::test]
async fn test_path_like_slug_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    let client = client(&server);
    let req = WorkspaceChatRequest {
        message: "hi".to_string(),
        mode: "chat".to_string(),
        session_id: None,
        attachments: vec![],
    };

    for slug in ["../x?", "../admin/users?", "a/b", "a%2Fb", "", "bio logy"] {
        let err = client.chat(slug, &req).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "{slug:?}");
        let err = client
            .chat_history(slug, &ChatHistoryQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "{slug:?}");
        assert!(client.rename_workspace(slug, "x").await.is_err());
        assert!(client.delete_workspace(slug).await.is_err());
        assert!(client.embed_documents(slug, &["doc.json".to_string()]).await.is_err());
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_workspace_rejects_unusable_slug() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workspace/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workspace": {"id": 1, "name": "x", "slug": "../x"}
        })))
        .mount(&server)
        .await;

    let err = client(&server).create_workspace("x").await.unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));
}
