//! HTTP API tests against the router, without a listening socket

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::util::ServiceExt;

use rdf_graph::api::websocket::ServerEvent;
use rdf_graph::chat::{ChatMessage, CompletionBackend, CompletionRequest, FunctionCall, ToolCallRequest};
use rdf_graph::{create_router, AppState, Config, KnowledgeGraphManager, RdfError, RdfResult, Triple};

/// Completion backend replaying canned replies
struct ScriptedBackend {
    replies: Mutex<VecDeque<RdfResult<ChatMessage>>>,
}

impl ScriptedBackend {
    fn new(replies: Vec<RdfResult<ChatMessage>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, _request: &CompletionRequest) -> RdfResult<ChatMessage> {
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(RdfError::Completion("script exhausted".to_string())))
    }
}

fn tool_call(name: &str, arguments: &str) -> ChatMessage {
    ChatMessage {
        role: "assistant".to_string(),
        content: None,
        tool_calls: Some(vec![ToolCallRequest {
            id: "call_1".to_string(),
            kind: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }]),
        tool_call_id: None,
    }
}

fn setup(dir: &Path, replies: Vec<RdfResult<ChatMessage>>) -> (Router, Arc<AppState>) {
    let config = Config::with_base_dir(dir);
    let manager = Arc::new(KnowledgeGraphManager::with_file(&config.memory_file_path));
    let state = Arc::new(AppState::new(
        manager,
        Arc::new(ScriptedBackend::new(replies)),
        config,
    ));
    (create_router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn knows(from: &str, to: &str) -> Triple {
    Triple::new(
        format!("http://example.org/{}", from),
        "http://xmlns.com/foaf/0.1/knows",
        format!("http://example.org/{}", to),
    )
}

#[tokio::test]
async fn test_malformed_upload_leaves_graph_unchanged() {
    let dir = tempdir().unwrap();
    let (app, state) = setup(dir.path(), vec![]);
    state.manager.add_triples(vec![knows("a", "b")]).unwrap();
    let on_disk = fs::read_to_string(&state.config.memory_file_path).unwrap();

    let (status, body) = send(&app, post_json("/upload", r#"{"triples": [{"subject": "#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    assert_eq!(state.manager.triple_count().unwrap(), 1);
    assert_eq!(fs::read_to_string(&state.config.memory_file_path).unwrap(), on_disk);
}

#[tokio::test]
async fn test_json_upload_replaces_and_broadcasts() {
    let dir = tempdir().unwrap();
    let (app, state) = setup(dir.path(), vec![]);
    state.manager.add_triples(vec![knows("old", "graph")]).unwrap();
    let mut rx = state.subscribe();

    let upload = json!({
        "triples": [
            {"subject": "http://example.org/a", "predicate": "http://xmlns.com/foaf/0.1/knows", "object": "http://example.org/b"},
            {"subject": "http://example.org/b", "predicate": "http://xmlns.com/foaf/0.1/knows", "object": "http://example.org/c"}
        ]
    });
    let (status, body) = send(&app, post_json("/upload", &upload.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "triples": 2}));
    assert!(!state.manager.read_graph().unwrap().contains(&knows("old", "graph")));

    let msg = rx.recv().await.unwrap();
    match msg.event {
        ServerEvent::GraphData(data) => {
            assert_eq!(data.node_count(), 3);
            assert_eq!(data.edge_count(), 2);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_multipart_upload_with_format() {
    let dir = tempdir().unwrap();
    let (app, state) = setup(dir.path(), vec![]);

    let body = "--XBOUNDARY\r\n\
         Content-Disposition: form-data; name=\"format\"\r\n\r\n\
         ntriples\r\n\
         --XBOUNDARY\r\n\
         Content-Disposition: form-data; name=\"content\"\r\n\r\n\
         <http://example.org/a> <http://xmlns.com/foaf/0.1/knows> <http://example.org/b> .\n\r\n\
         --XBOUNDARY--\r\n";
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["triples"], json!(1));
    assert_eq!(state.manager.read_graph().unwrap().triples, vec![knows("a", "b")]);
}

#[tokio::test]
async fn test_add_triple_endpoint() {
    let dir = tempdir().unwrap();
    let (app, state) = setup(dir.path(), vec![]);
    let triple = serde_json::to_string(&knows("a", "b")).unwrap();

    let (status, body) = send(&app, post_json("/addTriple", &triple)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "added": true}));

    let (_, body) = send(&app, post_json("/addTriple", &triple)).await;
    assert_eq!(body["added"], json!(false));
    assert_eq!(state.manager.triple_count().unwrap(), 1);

    let (status, body) = send(
        &app,
        post_json("/addTriple", r#"{"subject":"not an iri","predicate":"http://ex.org/p","object":"http://ex.org/o"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_download_sets_attachment_headers() {
    let dir = tempdir().unwrap();
    let (app, state) = setup(dir.path(), vec![]);
    state.manager.add_triples(vec![knows("a", "b")]).unwrap();

    let response = app
        .clone()
        .oneshot(get("/download?format=ntriples&filename=family"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/n-triples");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"family.nt\""));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("<http://example.org/a> <http://xmlns.com/foaf/0.1/knows> <http://example.org/b> ."));

    let response = app.clone().oneshot(get("/download")).await.unwrap();
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/turtle");
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("graph.ttl"));

    let (status, body) = send(&app, get("/download?format=rdfxml")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_query_and_prefix_endpoints() {
    let dir = tempdir().unwrap();
    let (app, state) = setup(dir.path(), vec![]);
    state
        .manager
        .add_triples(vec![
            knows("a", "b"),
            Triple::literal("http://example.org/a", "http://xmlns.com/foaf/0.1/name", "A"),
        ])
        .unwrap();

    let (status, body) = send(&app, get("/api/triples?predicate=foaf:knows")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["triples"][0]["object"], json!("http://example.org/b"));

    let (status, body) = send(&app, post_json("/api/prefixes", r#"{"prefix":"ex","uri":"http://example.org/"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["change"], json!("added"));

    let (_, body) = send(&app, get("/api/prefixes")).await;
    assert_eq!(body["prefixes"]["http://example.org/"], json!("ex:"));

    let (_, body) = send(&app, get("/api/graph?shortened=true")).await;
    assert_eq!(body["triples"][0]["subject"], json!("ex:a"));

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/prefixes/ex")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&app, request).await;
    assert_eq!(body["deleted"], json!(true));
}

#[tokio::test]
async fn test_chat_runs_tool_and_answers() {
    let dir = tempdir().unwrap();
    let (app, state) = setup(
        dir.path(),
        vec![
            Ok(tool_call(
                "addTriple",
                r#"{"subject":"http://example.org/a","predicate":"http://xmlns.com/foaf/0.1/knows","object":"http://example.org/b"}"#,
            )),
            Ok(ChatMessage::assistant("Added it.")),
        ],
    );

    let (status, body) = send(&app, post_json("/chat", r#"{"message":"connect a and b","currentGraphData":null}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"content": "Added it."}));
    assert_eq!(state.manager.read_graph().unwrap().triples, vec![knows("a", "b")]);
}

#[tokio::test]
async fn test_chat_error_statuses() {
    let dir = tempdir().unwrap();
    let (app, _) = setup(
        dir.path(),
        vec![
            Ok(tool_call("addTriple", r#"{"subject": 1}"#)),
            Err(RdfError::Completion("upstream unavailable".to_string())),
        ],
    );

    let (status, body) = send(&app, post_json("/chat", r#"{"message":"add something"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    let (status, body) = send(&app, post_json("/chat", r#"{"message":"hello"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("upstream unavailable"));
}

#[tokio::test]
async fn test_chat_adds_plain_text_object_as_literal() {
    let dir = tempdir().unwrap();
    let (app, state) = setup(
        dir.path(),
        vec![
            Ok(tool_call(
                "addTriple",
                r#"{"subject":"http://example.org/a","predicate":"http://xmlns.com/foaf/0.1/name","object":"Alice"}"#,
            )),
            Ok(ChatMessage::assistant("Named a Alice.")),
        ],
    );

    let (status, body) = send(&app, post_json("/chat", r#"{"message":"a is called Alice"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"content": "Named a Alice."}));
    assert_eq!(
        state.manager.read_graph().unwrap().triples,
        vec![Triple::literal("http://example.org/a", "http://xmlns.com/foaf/0.1/name", "Alice")]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_add_triple_requests() {
    let dir = tempdir().unwrap();
    let (app, state) = setup(dir.path(), vec![]);
    let mut rx = state.subscribe();

    let requests: Vec<_> = (0..16)
        .map(|i| {
            let app = app.clone();
            let triple = serde_json::to_string(&knows("hub", &format!("n{}", i))).unwrap();
            tokio::spawn(async move { send(&app, post_json("/addTriple", &triple)).await })
        })
        .collect();
    for request in requests {
        let (status, _) = request.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(state.manager.triple_count().unwrap(), 16);

    let mut last = None;
    while let Ok(msg) = rx.try_recv() {
        last = Some(msg.event);
    }
    match last {
        Some(ServerEvent::GraphData(data)) => assert_eq!(data.edge_count(), 16),
        other => panic!("unexpected event {:?}", other),
    }

    let reopened = KnowledgeGraphManager::with_file(&state.config.memory_file_path);
    assert_eq!(reopened.triple_count().unwrap(), 16);
}
