//! ERP Server - CRM/ERP backend with embedded storage
//!
//! # Module structure
//!
//! ```text
//! src/
//! ├── core/      # Config, state, server lifecycle
//! ├── auth/      # JWT authentication, role authorization
//! ├── common/    # Errors, pagination, logging
//! ├── money/     # Decimal money math (totals, payment reconciliation)
//! ├── db/        # Embedded SurrealDB: models, repositories, schema
//! └── api/       # HTTP routes and handlers
//! ```

pub mod api;
pub mod auth;
pub mod common;
pub mod core;
pub mod db;
pub mod money;

// Re-export public types
pub use auth::{CurrentUser, JwtService, Role};
pub use common::{AppError, AppResult};
pub use core::{Config, Server, ServerState};

// Re-export logger functions
pub use common::logger::init_logger;

// Security logging macro - tracing with a fixed target for auth events
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::warn!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
