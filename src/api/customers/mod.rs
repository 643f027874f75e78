//! Customer API module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, put},
};

use crate::auth::middleware::authorize;
use crate::auth::roles::allow;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/customers", customer_routes())
}

fn customer_routes() -> Router<ServerState> {
    // Reads include support staff; creation is sales only, updates are
    // manager level and deletion is admin only.
    let read = Router::new()
        .route("/", get(handler::list))
        .route("/statistics", get(handler::statistics))
        .route("/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn(authorize(allow::CUSTOMER_TEAM)));

    let create = Router::new()
        .route("/", axum::routing::post(handler::create))
        .route_layer(middleware::from_fn(authorize(allow::SALES_TEAM)));

    let update = Router::new()
        .route("/{id}", put(handler::update))
        .route_layer(middleware::from_fn(authorize(allow::SALES_MANAGERS)));

    let remove = Router::new()
        .route("/{id}", delete(handler::delete))
        .route_layer(middleware::from_fn(authorize(allow::ADMIN_ONLY)));

    read.merge(create).merge(update).merge(remove)
}
