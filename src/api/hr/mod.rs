//! HR API module: employees, departments, attendance, leave requests and
//! payroll, all nested under `/api/hr` and restricted to the HR team.

mod attendance;
mod departments;
mod employees;
mod leaves;
mod payroll;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::middleware::authorize;
use crate::auth::roles::allow;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/hr", hr_routes())
}

fn hr_routes() -> Router<ServerState> {
    Router::new()
        .route("/employees", get(employees::list).post(employees::create))
        .route("/employees/stats", get(employees::stats))
        .route(
            "/employees/{id}",
            get(employees::get_by_id)
                .put(employees::update)
                .delete(employees::delete),
        )
        .route(
            "/departments",
            get(departments::list).post(departments::create),
        )
        .route(
            "/departments/{id}",
            get(departments::get_by_id)
                .put(departments::update)
                .delete(departments::delete),
        )
        .route("/attendance", get(attendance::list).post(attendance::create))
        .route("/attendance/check", post(attendance::check))
        .route(
            "/attendance/{id}",
            put(attendance::update).delete(attendance::delete),
        )
        .route("/leaves", get(leaves::list).post(leaves::create))
        .route("/leaves/{id}", get(leaves::get_by_id).delete(leaves::delete))
        .route("/leaves/{id}/status", put(leaves::decide))
        .route("/payroll", get(payroll::list).post(payroll::create))
        .route(
            "/payroll/{id}",
            get(payroll::get_by_id)
                .put(payroll::update)
                .delete(payroll::delete),
        )
        .route_layer(middleware::from_fn(authorize(allow::HR_TEAM)))
}
