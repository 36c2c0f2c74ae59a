use axum::Json;
use axum::extract::{Query, State};
use serde_json::{Value, json};
use sift_query::build_query;
use tracing::info;

use crate::encode;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn count_documents(
    State(state): State<AppState>,
    Query(arguments): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    // Skip and limit are valid options here, but only the filter counts.
    let query = build_query(&state.defaults, &arguments, false)?;
    info!(
        collection = %state.collection.name(),
        filter = ?query.filter,
        "count_documents"
    );

    let count = state.collection.count_matching(&query.filter)?;
    let mut response = json!({ "count": count, "result": [] });
    if state.debug {
        response["collection"] = json!(state.collection.name());
        response["query"] = json!({ "filter": encode::document(&query.filter) });
    }

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{args, seeded_state};

    #[tokio::test]
    async fn counts_matching_documents() {
        let state = seeded_state();
        let response = count_documents(State(state), Query(args(&[("status", "active")])))
            .await
            .unwrap();
        assert_eq!(response.0["count"], 2);
        assert_eq!(response.0["result"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn count_ignores_limit() {
        let state = seeded_state();
        let response = count_documents(State(state), Query(args(&[("limit", "1")])))
            .await
            .unwrap();
        assert_eq!(response.0["count"], 4);
    }
}
