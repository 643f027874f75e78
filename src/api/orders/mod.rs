//! Sales order API module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::middleware::authorize;
use crate::auth::roles::allow;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sales/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    let read = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn(authorize(allow::SALES_TEAM)));

    let write = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .route_layer(middleware::from_fn(authorize(allow::SALES_MANAGERS)));

    let remove = Router::new()
        .route("/{id}", delete(handler::delete))
        .route_layer(middleware::from_fn(authorize(allow::ADMIN_ONLY)));

    read.merge(write).merge(remove)
}
