use axum::Json;
use axum::extract::{Query, State};
use serde_json::{Value, json};
use sift_query::{QuerySpec, build_query};
use tracing::info;

use crate::encode;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn find(
    State(state): State<AppState>,
    Query(arguments): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    run_find(&state, &arguments, false)
}

/// Same translation as `find`, but the route forces `limit = 1`.
pub async fn find_one(
    State(state): State<AppState>,
    Query(arguments): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    run_find(&state, &arguments, true)
}

fn run_find(
    state: &AppState,
    arguments: &[(String, String)],
    single_result: bool,
) -> Result<Json<Value>, ApiError> {
    let query = build_query(&state.defaults, arguments, single_result)?;
    info!(
        collection = %state.collection.name(),
        filter = ?query.filter,
        limit = query.limit,
        "find"
    );

    let documents = state.collection.find(&query)?;
    let mut response = json!({
        "count": documents.len(),
        "result": documents.iter().map(encode::document).collect::<Vec<_>>(),
    });
    if state.debug {
        response["collection"] = json!(state.collection.name());
        response["query"] = query_debug(&query);
    }

    Ok(Json(response))
}

pub(crate) fn query_debug(query: &QuerySpec) -> Value {
    json!({
        "filter": encode::document(&query.filter),
        "limit": query.limit,
        "skip": query.skip,
        "sort": query.sort,
        "projection": query.projection,
    })
}
