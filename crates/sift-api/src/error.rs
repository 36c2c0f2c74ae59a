use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sift_query::QueryError;
use sift_store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    Query(QueryError),
    Store(StoreError),
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        ApiError::Query(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Every query-translation failure is a client mistake.
            ApiError::Query(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Store(e) => match e {
                StoreError::InvalidFilter(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                StoreError::DuplicateId(_) => (StatusCode::CONFLICT, e.to_string()),
                StoreError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            },
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
