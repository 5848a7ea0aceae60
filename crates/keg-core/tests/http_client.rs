//! HTTP client against a loopback server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Json, Router};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use keg_core::reconcile::{Command, execute};
use keg_core::{ClientConfig, HttpKegApi, KegApi, KegError, KegStatus, KegUpdate};

#[derive(Default)]
struct Seen {
    content_type: Option<String>,
    body: Option<Value>,
    paths: Vec<String>,
}

type Shared = Arc<Mutex<Seen>>;

fn keg_json(id: u64) -> Value {
    json!({
        "id": id,
        "label": format!("Keg #{id}"),
        "status": "full",
        "location": "Troy",
        "batch_id": "b1",
        "date_purchased": "",
        "notes": "",
        "batch": {
            "id": "b1",
            "batch_no": 12,
            "name": "Batch 12",
            "style": "IPA",
            "abv": 6.4,
            "recipe_name": "Hop Bomb",
            "bottling_date": "2024-05-01",
            "batch_notes": ""
        }
    })
}

async fn list_kegs(State(seen): State<Shared>) -> Json<Value> {
    seen.lock().paths.push("/api/kegs".into());
    Json(json!([keg_json(1), keg_json(2)]))
}

async fn update_keg(
    State(seen): State<Shared>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut seen = seen.lock();
    seen.paths.push(format!("/api/kegs/{id}"));
    seen.content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    seen.body = Some(body);
    Json(keg_json(id))
}

async fn delete_keg(Path(id): Path<u64>) -> impl IntoResponse {
    if id == 1 {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Cannot delete a keg with a batch assigned. Reset it first." })),
        )
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "detail": "Keg not found" })))
    }
}

async fn reset_keg() -> impl IntoResponse {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": [{ "loc": ["path", "keg_id"], "msg": "bad id" }] })),
    )
}

async fn sync_batches() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn list_batches() -> &'static str {
    "<html>not json</html>"
}

async fn stats() -> Json<Value> {
    Json(json!({ "event_count": 0 }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn serve() -> (HttpKegApi, Shared) {
    let seen = Shared::default();
    let router = Router::new()
        .route("/api/kegs", get(list_kegs))
        .route("/api/kegs/{id}", put(update_keg).delete(delete_keg))
        .route("/api/kegs/{id}/reset", post(reset_keg))
        .route("/api/batches", get(list_batches))
        .route("/api/batches/sync", post(sync_batches))
        .route("/api/stats", get(stats))
        .route("/health", get(health))
        .with_state(Arc::clone(&seen));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (client(addr), seen)
}

fn client(addr: SocketAddr) -> HttpKegApi {
    let config = ClientConfig::new(&format!("http://{addr}")).unwrap();
    HttpKegApi::new(&config).unwrap()
}

#[tokio::test]
async fn decodes_keg_list() {
    let (api, _) = serve().await;
    let kegs = api.list_kegs().await.unwrap();

    assert_eq!(kegs.len(), 2);
    assert_eq!(kegs[0].status, KegStatus::Full);
    assert_eq!(kegs[1].batch.as_ref().unwrap().display_name(), "Hop Bomb");
}

#[tokio::test]
async fn update_sends_json_body() {
    let (api, seen) = serve().await;
    let update = KegUpdate {
        label: Some("Keg #3".into()),
        ..KegUpdate::default()
    }
    .with_cleared_batch();

    api.update_keg(3, &update).await.unwrap();

    let seen = seen.lock();
    assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    assert_eq!(
        seen.body,
        Some(json!({ "label": "Keg #3", "clear_batch": true }))
    );
}

#[tokio::test]
async fn error_detail_becomes_message() {
    let (api, _) = serve().await;

    let err = api.delete_keg(7).await.unwrap_err();
    assert_eq!(err, KegError::api(404, "Keg not found"));

    let err = api.delete_keg(1).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.to_string(),
        "Cannot delete a keg with a batch assigned. Reset it first."
    );
}

#[tokio::test]
async fn structured_detail_is_serialized() {
    let (api, _) = serve().await;
    let err = api.reset_keg(1).await.unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert!(err.to_string().contains("bad id"));
}

#[tokio::test]
async fn missing_body_falls_back_to_status_line() {
    let (api, _) = serve().await;
    let err = api.sync_batches().await.unwrap_err();
    assert_eq!(err.to_string(), "500 Internal Server Error");
}

#[tokio::test]
async fn malformed_success_is_decode_error() {
    let (api, _) = serve().await;
    let err = api.list_batches().await.unwrap_err();
    assert!(matches!(err, KegError::Decode(_)));
}

#[tokio::test]
async fn sparse_stats_decode_with_defaults() {
    let (api, _) = serve().await;
    let stats = api.stats().await.unwrap();
    assert_eq!(stats.event_count, Some(0));
    assert!(stats.people.is_empty());
    assert_eq!(api.health().await.unwrap().status, "ok");
}

#[tokio::test]
async fn relocate_reloads_kegs_over_http() {
    let (api, seen) = serve().await;
    let command = Command::Relocate(keg_core::views::Relocate {
        keg_id: 2,
        location: String::new(),
    });

    let reloaded = execute(&api, &command).await.unwrap();

    assert_eq!(reloaded.kegs.map(|k| k.len()), Some(2));
    let seen = seen.lock();
    assert_eq!(seen.paths, vec!["/api/kegs/2", "/api/kegs"]);
    assert_eq!(seen.body, Some(json!({ "location": "" })));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr).list_kegs().await.unwrap_err();
    assert!(matches!(err, KegError::Transport(_)));
}
