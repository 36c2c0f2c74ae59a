use std::sync::Arc;

use sift_api::routes;
use sift_api::state::{AppState, parse_defaults};
use sift_store::MemoryCollection;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let addr = std::env::var("SIFT_ADDR").unwrap_or_else(|_| "0.0.0.0:8888".into());
    let collection = std::env::var("SIFT_COLLECTION").unwrap_or_else(|_| "test".into());
    let filter = std::env::var("SIFT_QUERY_FILTER").unwrap_or_else(|_| "{}".into());
    let options = std::env::var("SIFT_QUERY_OPTIONS").unwrap_or_else(|_| "{}".into());
    let admin = env_flag("SIFT_ADMIN");
    let debug = env_flag("SIFT_DEBUG");

    let defaults = parse_defaults(&filter, &options).unwrap_or_else(|e| {
        eprintln!("invalid default query configuration: {e}");
        std::process::exit(1);
    });

    let state = AppState {
        collection: Arc::new(MemoryCollection::new(collection)),
        defaults: Arc::new(defaults),
        debug,
    };

    let app = routes::router(admin).with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("failed to bind {addr}: {e}");
            std::process::exit(1);
        });

    tracing::info!("sift-api listening on {addr} (admin: {admin})");
    axum::serve(listener, app).await.unwrap();
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|value| matches!(value.as_str(), "1" | "true" | "yes"))
}
