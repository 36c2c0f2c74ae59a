use axum::Json;
use axum::extract::{Query, State};
use bson::doc;
use serde_json::{Value, json};
use tracing::info;

use crate::error::ApiError;
use crate::routes::required_id;
use crate::state::AppState;

pub async fn delete_one(
    State(state): State<AppState>,
    Query(arguments): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let id = required_id(&arguments)?;
    let filter = doc! { "_id": id };
    info!(collection = %state.collection.name(), %id, "delete_one");

    let outcome = state.collection.delete_one(&filter)?;
    let mut response = json!({
        "count": 1,
        "result": [{
            "acknowledged": true,
            "deleted_count": outcome.deleted_count,
        }],
    });
    if state.debug {
        response["collection"] = json!(state.collection.name());
    }

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{SEEDED_ID, args, seeded_state};

    #[tokio::test]
    async fn deletes_matching_document() {
        let state = seeded_state();
        let collection = state.collection.clone();
        let response = delete_one(State(state), Query(args(&[("_id", SEEDED_ID)])))
            .await
            .unwrap();
        assert_eq!(response.0["result"][0]["deleted_count"], 1);
        assert_eq!(collection.count_matching(&doc! {}).unwrap(), 3);
    }

    #[tokio::test]
    async fn delete_requires_valid_id() {
        let state = seeded_state();
        let err = delete_one(State(state), Query(args(&[("_id", "nonsense")])))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::Query(_)));
    }

    #[tokio::test]
    async fn delete_missing_document_deletes_nothing() {
        let state = seeded_state();
        let response = delete_one(
            State(state),
            Query(args(&[("_id", "ffffffffffffffffffffffff")])),
        )
        .await
        .unwrap();
        assert_eq!(response.0["result"][0]["deleted_count"], 0);
    }
}
