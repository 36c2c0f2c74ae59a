use axum::Json;
use axum::extract::{Query, State};
use bson::doc;
use serde_json::{Value, json};
use sift_query::expand_arguments;
use tracing::info;

use crate::error::ApiError;
use crate::routes::required_id;
use crate::state::AppState;

pub async fn update_one(
    State(state): State<AppState>,
    Query(arguments): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let id = required_id(&arguments)?;
    let filter = doc! { "_id": id };

    // Everything except the id (and the unsupported upsert flag) becomes a
    // field assignment.
    let editable: Vec<(String, String)> = arguments
        .iter()
        .filter(|(key, _)| key != "_id" && key != "upsert")
        .cloned()
        .collect();
    let mut set = expand_arguments(&editable)?;
    set.insert("mtime", bson::DateTime::now());
    info!(collection = %state.collection.name(), %id, ?set, "update_one");

    let outcome = state.collection.update_one(&filter, &set)?;
    let mut response = json!({
        "count": 1,
        "result": [{
            "acknowledged": true,
            "matched_count": outcome.matched_count,
            "modified_count": outcome.modified_count,
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
    async fn updates_matching_document() {
        let state = seeded_state();
        let collection = state.collection.clone();
        let response = update_one(
            State(state),
            Query(args(&[("_id", SEEDED_ID), ("status", "closed")])),
        )
        .await
        .unwrap();
        assert_eq!(response.0["result"][0]["matched_count"], 1);
        assert_eq!(response.0["result"][0]["modified_count"], 1);

        let id = bson::oid::ObjectId::parse_str(SEEDED_ID).unwrap();
        let stored = collection
            .find(&sift_query::QuerySpec {
                filter: doc! { "_id": id },
                limit: 1,
                skip: None,
                sort: None,
                projection: None,
            })
            .unwrap();
        assert_eq!(stored[0].get_str("status").unwrap(), "closed");
        assert!(stored[0].get_datetime("mtime").is_ok());
    }

    #[tokio::test]
    async fn update_requires_id() {
        let state = seeded_state();
        let err = update_one(State(state), Query(args(&[("status", "closed")])))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::Query(_)));
    }

    #[tokio::test]
    async fn update_missing_document_matches_nothing() {
        let state = seeded_state();
        let response = update_one(
            State(state),
            Query(args(&[
                ("_id", "ffffffffffffffffffffffff"),
                ("status", "closed"),
            ])),
        )
        .await
        .unwrap();
        assert_eq!(response.0["result"][0]["matched_count"], 0);
    }
}
