//! Finance API module: chart of accounts, ledger transactions and the
//! income/expense summary.

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::middleware::authorize;
use crate::auth::roles::allow;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/finance", finance_routes())
}

fn finance_routes() -> Router<ServerState> {
    let read = Router::new()
        .route("/accounts", get(handler::list_accounts))
        .route("/accounts/{id}", get(handler::get_account))
        .route("/transactions", get(handler::list_transactions))
        .route("/summary", get(handler::summary))
        .route_layer(middleware::from_fn(authorize(allow::FINANCE_READ)));

    let write = Router::new()
        .route("/accounts", post(handler::create_account))
        .route("/accounts/{id}", put(handler::update_account))
        .route("/accounts/{id}", delete(handler::delete_account))
        .route("/transactions", post(handler::create_transaction))
        .route_layer(middleware::from_fn(authorize(allow::FINANCE_TEAM)));

    read.merge(write)
}
