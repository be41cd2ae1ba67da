//! The real HTTP clients against local stub servers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use prospector::executor::TaskExecutor;
use prospector::planner::telex::TelexPlanner;
use prospector::planner::{PlannerError, QueryPlanner};
use prospector::protocol::{JsonRpcResponse, Task, TaskState};
use prospector::queue;
use prospector::search::google::GoogleSearch;
use prospector::search::{SearchError, SearchProvider};
use prospector::server::{self, AppState};
use prospector::webhook::Notifier;
use prospector::webhook::http::HttpNotifier;

/// Serve `router` on an ephemeral port and return its base URL.
async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Accepts connections and never answers. Returns its base URL.
async fn spawn_silent() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

type Seen = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

/// Model gateway stub answering every call with `content`.
async fn gateway(content: &'static str) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route(
            "/ai",
            post(|State((seen, content)): State<(Seen, &'static str)>, headers: HeaderMap, Json(body): Json<Value>| async move {
                seen.lock().unwrap().push((headers, body));
                Json(json!({"status": "success", "data": {"Messages": {"role": "assistant", "content": content}}}))
            }),
        )
        .with_state((seen.clone(), content));
    (format!("{}/ai", spawn_stub(router).await), seen)
}

/// Search stub: answers by `q`, with no `items` for unknown queries.
async fn search_engine(results: HashMap<&'static str, Value>) -> String {
    let results = Arc::new(results);
    let router = Router::new()
        .route(
            "/search",
            get(|State(results): State<Arc<HashMap<&'static str, Value>>>, Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("key").map(String::as_str), Some("g-key"));
                assert_eq!(params.get("cx").map(String::as_str), Some("engine"));
                assert_eq!(params.get("num").map(String::as_str), Some("10"));
                let q = params.get("q").cloned().unwrap_or_default();
                Json(
                    results
                        .get(q.as_str())
                        .cloned()
                        .unwrap_or_else(|| json!({"kind": "customsearch#search"})),
                )
            }),
        )
        .with_state(results);
    format!("{}/search", spawn_stub(router).await)
}

/// Webhook stub forwarding each delivery to a channel.
async fn webhook(status: StatusCode) -> (String, mpsc::UnboundedReceiver<(HeaderMap, Value)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let router = Router::new()
        .route(
            "/hook",
            post(move |State(tx): State<mpsc::UnboundedSender<(HeaderMap, Value)>>, headers: HeaderMap, Json(body): Json<Value>| async move {
                let _ = tx.send((headers, body));
                status
            }),
        )
        .with_state(tx);
    (format!("{}/hook", spawn_stub(router).await), rx)
}

#[tokio::test]
async fn telex_planner_sends_prompt_and_repairs_reply() {
    let (url, seen) = gateway("```json\n[\"clinics Lagos\", 'hospitals Ikeja',]\n```").await;
    let planner = TelexPlanner::new(reqwest::Client::new(), url, "test/model");

    let queries = planner
        .generate_queries("clinics in Lagos", Some("agent-key"))
        .await
        .unwrap();
    assert_eq!(queries, vec!["clinics Lagos", "hospitals Ikeja"]);

    let seen = seen.lock().unwrap();
    let (headers, body) = &seen[0];
    assert_eq!(headers["x-model"], "test/model");
    assert_eq!(headers["x-agent-api-key"], "agent-key");
    assert_eq!(body["model"], "test/model");
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(
        body["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("clinics in Lagos")
    );
}

#[tokio::test]
async fn telex_planner_omits_missing_key() {
    let (url, seen) = gateway("[\"q\"]").await;
    let planner = TelexPlanner::new(reqwest::Client::new(), url, "test/model");

    planner.generate_queries("x", None).await.unwrap();
    assert!(!seen.lock().unwrap()[0].0.contains_key("x-agent-api-key"));
}

#[tokio::test]
async fn telex_planner_rejects_prose() {
    let (url, _) = gateway("I cannot help with that.").await;
    let planner = TelexPlanner::new(reqwest::Client::new(), url, "test/model");

    let err = planner.generate_queries("x", None).await.unwrap_err();
    assert!(matches!(err, PlannerError::Unparsable { .. }));
}

#[tokio::test]
async fn telex_planner_reports_gateway_status() {
    let router = Router::new().route(
        "/ai",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let url = format!("{}/ai", spawn_stub(router).await);
    let planner = TelexPlanner::new(reqwest::Client::new(), url, "m");

    match planner.generate_queries("x", None).await.unwrap_err() {
        PlannerError::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "upstream down");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn telex_planner_times_out() {
    let router = Router::new().route(
        "/ai",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({}))
        }),
    );
    let url = format!("{}/ai", spawn_stub(router).await);
    let planner = TelexPlanner::new(reqwest::Client::new(), url, "m")
        .with_timeout(Duration::from_millis(100));

    let err = planner.generate_queries("x", None).await.unwrap_err();
    assert!(matches!(err, PlannerError::Timeout));
}

#[tokio::test]
async fn telex_planner_needs_reply_content() {
    let router = Router::new().route("/ai", post(|| async { Json(json!({"data": {}})) }));
    let url = format!("{}/ai", spawn_stub(router).await);
    let planner = TelexPlanner::new(reqwest::Client::new(), url, "m");

    let err = planner.generate_queries("x", None).await.unwrap_err();
    assert!(matches!(err, PlannerError::MissingContent));
}

#[tokio::test]
async fn google_search_reads_items() {
    let url = search_engine(HashMap::from([(
        "clinics",
        json!({"items": [
            {"title": "Lagos Clinic", "link": "https://clinic.example"},
            {"title": "Partial"}
        ]}),
    )]))
    .await;
    let search = GoogleSearch::new(reqwest::Client::new(), url, "g-key", "engine");

    let hits = search.search("clinics").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Lagos Clinic");
    assert_eq!(hits[0].link, "https://clinic.example");

    let err = search.search("nothing").await.unwrap_err();
    assert!(matches!(err, SearchError::NoItems { reason: None }));
}

#[tokio::test]
async fn http_notifier_posts_envelope_with_key() {
    let (url, mut rx) = webhook(StatusCode::OK).await;
    let notifier = HttpNotifier::new(reqwest::Client::new());
    let envelope = JsonRpcResponse::success(Some("r1".into()), Task::completed("t1", "1. [A](u1)"));

    notifier.deliver(&url, Some("hook-key"), &envelope).await.unwrap();

    let (headers, body) = rx.recv().await.unwrap();
    assert_eq!(headers["x-telex-api-key"], "hook-key");
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    let delivered: JsonRpcResponse = serde_json::from_value(body).unwrap();
    assert_eq!(delivered, envelope);
}

#[tokio::test]
async fn http_notifier_fails_on_error_status() {
    let (url, _rx) = webhook(StatusCode::INTERNAL_SERVER_ERROR).await;
    let notifier = HttpNotifier::new(reqwest::Client::new());
    let envelope = JsonRpcResponse::success(None, Task::failed("t1", "nope"));

    assert!(notifier.deliver(&url, None, &envelope).await.is_err());
}

#[tokio::test]
async fn google_search_gives_up_on_silent_host() {
    let url = format!("{}/search", spawn_silent().await);
    let search = GoogleSearch::new(reqwest::Client::new(), url, "g-key", "engine")
        .with_timeout(Duration::from_millis(200));

    let err = tokio::time::timeout(Duration::from_secs(5), search.search("clinics"))
        .await
        .expect("search should time out on its own")
        .unwrap_err();
    assert!(matches!(err, SearchError::Timeout));
}

#[tokio::test]
async fn http_notifier_gives_up_on_silent_host() {
    let url = format!("{}/hook", spawn_silent().await);
    let notifier = HttpNotifier::new(reqwest::Client::new()).with_timeout(Duration::from_millis(200));
    let envelope = JsonRpcResponse::success(None, Task::completed("t1", ""));

    let err = tokio::time::timeout(Duration::from_secs(5), notifier.deliver(&url, None, &envelope))
        .await
        .expect("delivery should time out on its own")
        .unwrap_err();
    assert!(err.to_string().contains("did not answer"));
}

#[tokio::test]
async fn lead_request_end_to_end() {
    let (ai_url, _) = gateway("[\"q1\", \"q2\"]").await;
    let search_url = search_engine(HashMap::from([
        ("q1", json!({"items": [{"title": "A", "link": "u1"}, {"title": "B", "link": "u2"}]})),
        ("q2", json!({"items": [{"title": "A", "link": "u3"}]})),
    ]))
    .await;
    let (hook_url, mut hooks) = webhook(StatusCode::OK).await;

    let client = reqwest::Client::new();
    let executor = Arc::new(
        TaskExecutor::new(
            Arc::new(TelexPlanner::new(client.clone(), ai_url, "m")),
            Arc::new(GoogleSearch::new(client.clone(), search_url, "g-key", "engine")),
            Arc::new(HttpNotifier::new(client)),
        )
        .with_search_pause(Duration::from_millis(5)),
    );
    let (task_queue, _pool) = queue::start(4, 1, executor);
    let app = server::build(Arc::new(AppState {
        queue: task_queue,
        default_api_key: Some("server-key".to_string()),
    }));

    let submission = json!({
        "jsonrpc": "2.0",
        "id": 7,
        "params": {
            "message": {"role": "user", "parts": [{"type": "text", "text": "companies like A"}]},
            "configuration": {"pushNotificationConfig": {"url": hook_url}}
        }
    });
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(submission.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let ack: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(ack["id"], 7);
    assert_eq!(ack["result"]["status"]["state"], "submitted");

    let (headers, body) = tokio::time::timeout(Duration::from_secs(5), hooks.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(headers["x-telex-api-key"], "server-key");

    let envelope: JsonRpcResponse = serde_json::from_value(body).unwrap();
    assert_eq!(envelope.id, Some(prospector::protocol::RequestId::Number(7)));
    let task = envelope.result.unwrap();
    assert_eq!(task.id, ack["result"]["id"].as_str().unwrap());
    assert_eq!(task.status.state, TaskState::Completed);
    assert_eq!(
        task.artifacts.unwrap()[0].parts[0].as_text(),
        Some("1. [A](u3)\n2. [B](u2)")
    );
}
