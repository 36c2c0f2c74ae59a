use axum::Json;
use axum::http::StatusCode;

pub async fn ping() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ping": "pong" }))
}

pub async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Unmatched paths answer 204 rather than 404.
pub async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}
