//! Sales dashboard API module

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::middleware::authorize;
use crate::auth::roles::allow;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/sales/dashboard", get(handler::dashboard))
        .route_layer(middleware::from_fn(authorize(allow::SALES_TEAM)))
}
