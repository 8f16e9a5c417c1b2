use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::broker::Broker;

use super::handlers;

pub fn create_routes() -> Router<Arc<Broker>> {
    Router::new()
        // Clients hold their long poll open on this route.
        .route("/client-long-poll/:client_id", get(handlers::check_in))
        // Once woken, a client reports its time here.
        .route("/client-time/:client_id/:timestamp", get(handlers::submit_time))
        // Operators ask for a given client's time here.
        .route("/clients/:client_id/system-time", get(handlers::get_time))
        .layer(TraceLayer::new_for_http())
        // Cross-origin callers are fine for this service.
        .layer(CorsLayer::new().allow_origin(Any))
}
