//! API route modules
//!
//! One directory per endpoint group: `mod.rs` builds the router (including
//! role allow-lists), `handler.rs` holds the handlers.

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::middleware::authenticate;
use crate::core::ServerState;

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod finance;
pub mod health;
pub mod hr;
pub mod invoices;
pub mod leads;
pub mod opportunities;
pub mod orders;
pub mod products;
pub mod quotations;
pub mod settings;
pub mod users;

/// Request ID generator, one UUID per request
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes, no middleware, no state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(customers::router())
        .merge(leads::router())
        .merge(opportunities::router())
        .merge(orders::router())
        .merge(invoices::router())
        .merge(quotations::router())
        .merge(products::router())
        .merge(finance::router())
        .merge(hr::router())
        .merge(dashboard::router())
        .merge(settings::router())
}

/// The fully configured application: routes, middleware stack and state
///
/// Shared by the HTTP server and the integration tests.
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // JWT authentication runs before every route, injects CurrentUser
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            authenticate,
        ))
        .with_state(state)
}
