mod count;
mod delete;
mod find;
mod health;
mod insert;
mod update;

use axum::Router;
use axum::routing::get;
use bson::oid::ObjectId;
use sift_query::QueryError;

use crate::error::ApiError;
use crate::state::AppState;

/// The read surface is always mounted; write routes only in admin mode.
/// Every route is driven by its query string, so everything is a GET.
pub fn router(admin: bool) -> Router<AppState> {
    let mut router = Router::new()
        .route("/find", get(find::find))
        .route("/find_one", get(find::find_one))
        .route("/count_documents", get(count::count_documents))
        .route("/ping", get(health::ping))
        .route("/healthz", get(health::healthz));

    if admin {
        router = router
            .route("/insert_one", get(insert::insert_one))
            .route("/update_one", get(update::update_one))
            .route("/delete_one", get(delete::delete_one));
    }

    router.fallback(health::no_content)
}

/// Single-document write routes require a valid ObjectId `_id` argument.
pub(crate) fn required_id(arguments: &[(String, String)]) -> Result<ObjectId, ApiError> {
    let raw = arguments
        .iter()
        .rev()
        .find(|(key, _)| key == "_id")
        .map(|(_, value)| value.as_str())
        .unwrap_or("-");

    ObjectId::parse_str(raw)
        .map_err(|_| ApiError::Query(QueryError::InvalidIdentifier(raw.to_string())))
}
