//! Account settings API module
//!
//! Self-service profile, notification preferences and password change.
//! Open to every authenticated user, customer accounts included.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/settings",
        Router::new()
            .route("/profile", get(handler::profile).put(handler::update_profile))
            .route("/notifications", put(handler::update_notifications))
            .route("/password", put(handler::change_password)),
    )
}
