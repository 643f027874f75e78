//! Authentication and authorization
//!
//! JWT token service plus Axum middleware for the role model.

pub mod jwt;
pub mod middleware;
pub mod roles;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{authenticate, authorize};
pub use roles::{Role, allow};
