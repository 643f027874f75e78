//! Lead API module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, put},
};

use crate::auth::middleware::authorize;
use crate::auth::roles::allow;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/leads", lead_routes())
}

fn lead_routes() -> Router<ServerState> {
    let team = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/stats", get(handler::stats))
        .route("/status/{status}", get(handler::list_by_status))
        .route("/source/{source}", get(handler::list_by_source))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/convert", put(handler::convert))
        .route_layer(middleware::from_fn(authorize(allow::SALES_TEAM)));

    let remove = Router::new()
        .route("/{id}", delete(handler::delete))
        .route_layer(middleware::from_fn(authorize(allow::ADMIN_ONLY)));

    team.merge(remove)
}
