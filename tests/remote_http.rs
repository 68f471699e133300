// tests/remote_http.rs
//
// HttpStateClient against a throwaway in-process axum backend.
//
// Covered:
// - GET /latest decodes the agent state (time optional)
// - non-2xx → BackendUnavailable
// - undecodable body → MalformedResponse
// - nothing listening → BackendUnavailable
// - POST /config sends {"interval_minutes": n} and reads the ack

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use radiantic_client::{FetchError, HttpStateClient, StateSource};
use serde_json::{json, Value};

/// Serve `app` on an ephemeral port; returns the `/api` base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test backend");
    });
    format!("http://{addr}/api")
}

#[tokio::test]
async fn latest_decodes_agent_state() {
    let app = Router::new().route(
        "/api/latest",
        get(|| async {
            Json(json!({
                "news": "Full Title: Sparse Memories",
                "link": "https://arxiv.org/pdf/2410.01234",
                "analogy": "Think of it like a librarian...",
                "notification": "AI just got a memory upgrade.",
                "status": "✅ Cycle Complete",
                "date": "Oct 18, 2026",
                "time": "06:30 PM"
            }))
        }),
    );
    let client = HttpStateClient::new(serve(app).await);

    let st = client.fetch_state().await.expect("fetch ok");
    assert_eq!(st.notification, "AI just got a memory upgrade.");
    assert_eq!(st.time.as_deref(), Some("06:30 PM"));
    assert!(st.agent_status().is_settled());
}

#[tokio::test]
async fn initial_state_without_time_is_accepted() {
    let app = Router::new().route(
        "/api/latest",
        get(|| async {
            Json(json!({
                "news": "Ready to search...",
                "link": "#",
                "analogy": "Waiting for news...",
                "notification": "Standby...",
                "status": "Idle",
                "date": "Today"
            }))
        }),
    );
    let client = HttpStateClient::new(serve(app).await);
    let st = client.fetch_state().await.expect("fetch ok");
    assert_eq!(st.time, None);
    assert_eq!(st.status, "Idle");
}

#[tokio::test]
async fn server_error_is_backend_unavailable() {
    let app = Router::new().route(
        "/api/latest",
        get(|| async { (StatusCode::BAD_GATEWAY, "restarting") }),
    );
    let client = HttpStateClient::new(serve(app).await);
    let err = client.fetch_state().await.unwrap_err();
    assert!(matches!(err, FetchError::BackendUnavailable(_)), "got {err:?}");
}

#[tokio::test]
async fn garbage_body_is_malformed() {
    let app = Router::new()
        .route("/api/latest", get(|| async { "<html>not json</html>" }));
    let client = HttpStateClient::new(serve(app).await);
    let err = client.fetch_state().await.unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn wrong_shape_is_malformed() {
    let app = Router::new().route("/api/latest", get(|| async { Json(json!([1, 2, 3])) }));
    let client = HttpStateClient::new(serve(app).await);
    let err = client.fetch_state().await.unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn nothing_listening_is_backend_unavailable() {
    // Bind then drop to get a port that is very likely closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpStateClient::new(format!("http://{addr}/api"));
    let err = client.fetch_state().await.unwrap_err();
    assert!(matches!(err, FetchError::BackendUnavailable(_)), "got {err:?}");
}

#[tokio::test]
async fn config_push_sends_interval_minutes() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(vec![]));
    let app = Router::new()
        .route(
            "/api/config",
            post(
                |State(seen): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                    let minutes = body["interval_minutes"].as_u64().unwrap_or(0);
                    seen.lock().unwrap().push(body);
                    Json(json!({
                        "message": "Interval updated",
                        "interval_seconds": minutes * 60
                    }))
                },
            ),
        )
        .with_state(seen.clone());
    let client = HttpStateClient::new(serve(app).await);

    let ack = client.push_interval(15).await.expect("push ok");
    let ack = ack.expect("ack decoded");
    assert_eq!(ack.message, "Interval updated");
    assert_eq!(ack.interval_seconds, 900);
    assert_eq!(seen.lock().unwrap().as_slice(), &[json!({ "interval_minutes": 15 })]);
}

#[tokio::test]
async fn config_push_error_status_is_reported() {
    let app = Router::new().route(
        "/api/config",
        post(|| async { StatusCode::UNPROCESSABLE_ENTITY }),
    );
    let client = HttpStateClient::new(serve(app).await);
    let err = client.push_interval(5).await.unwrap_err();
    assert!(matches!(err, FetchError::BackendUnavailable(_)), "got {err:?}");
}
