use axum::Json;
use axum::extract::{Query, State};
use serde_json::{Value, json};
use sift_query::expand_arguments;
use tracing::info;

use crate::encode;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn insert_one(
    State(state): State<AppState>,
    Query(arguments): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let mut document = expand_arguments(&arguments)?;

    // Creation and modification times are server-assigned, always.
    let now = bson::DateTime::now();
    document.insert("ctime", now);
    document.insert("mtime", now);
    info!(collection = %state.collection.name(), ?document, "insert_one");

    let outcome = state.collection.insert_one(document)?;
    let mut response = json!({
        "count": 1,
        "result": [{
            "acknowledged": true,
            "inserted_id": encode::bson(&outcome.inserted_id),
        }],
    });
    if state.debug {
        response["collection"] = json!(state.collection.name());
    }

    Ok(Json(response))
}
