//! Auth API module
//!
//! signup/signin/refresh are public; me/signout require a valid token.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", auth_routes())
}

fn auth_routes() -> Router<ServerState> {
    Router::new()
        .route("/signup", post(handler::signup))
        .route("/signin", post(handler::signin))
        .route("/refresh", post(handler::refresh))
        .route("/signout", post(handler::signout))
        .route("/me", get(handler::me))
}
