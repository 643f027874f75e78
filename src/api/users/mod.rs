//! User administration API module (admin only)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::middleware::authorize;
use crate::auth::roles::allow;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", user_routes())
}

fn user_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/role", put(handler::set_role))
        .route_layer(middleware::from_fn(authorize(allow::ADMIN_ONLY)))
}
