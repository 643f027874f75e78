//! Invoice API module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::middleware::authorize;
use crate::auth::roles::allow;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sales/invoices", invoice_routes())
}

fn invoice_routes() -> Router<ServerState> {
    let read = Router::new()
        .route("/", get(handler::list))
        .route("/statistics", get(handler::statistics))
        .route("/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn(authorize(allow::INVOICE_READ)));

    let write = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .route("/{id}/payments", post(handler::record_payment))
        .route_layer(middleware::from_fn(authorize(allow::INVOICE_WRITE)));

    let remove = Router::new()
        .route("/{id}", delete(handler::delete))
        .route_layer(middleware::from_fn(authorize(allow::ADMIN_ONLY)));

    read.merge(write).merge(remove)
}
