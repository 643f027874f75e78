//! Authentication middleware
//!
//! Axum middleware for JWT authentication and role authorization.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtError, JwtService, Role};
use crate::common::AppError;
use crate::core::ServerState;
use crate::security_log;

/// Authentication middleware
///
/// Extracts and verifies the JWT from `Authorization: Bearer <token>` and
/// injects [`CurrentUser`] into request extensions.
///
/// # Paths that skip authentication
///
/// - `OPTIONS *` (CORS preflight)
/// - anything outside `/api/`
/// - `/api/health`
/// - `/api/auth/signup`, `/api/auth/signin`
/// - `/api/auth/refresh` (performs its own grace-window validation)
pub async fn authenticate(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API routes fall through to 404 handling
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let is_public_api_route = matches!(
        path,
        "/api/health" | "/api/auth/signup" | "/api/auth/signin" | "/api/auth/refresh"
    );
    if is_public_api_route {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => match JwtService::extract_from_header(header) {
            Some(token) => token,
            None => {
                security_log!("WARN", "auth_malformed_header", uri = format!("{:?}", req.uri()));
                return Err(AppError::InvalidTokenFormat);
            }
        },
        None => {
            security_log!("WARN", "auth_missing_header", uri = format!("{:?}", req.uri()));
            return Err(AppError::NoAuthHeader);
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::TokenExpired),
                JwtError::InvalidPayload(_) => Err(AppError::InvalidTokenPayload),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}

/// Role authorization middleware
///
/// # Usage
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/api/leads", get(handler::list))
///     .route_layer(middleware::from_fn(authorize(allow::SALES_TEAM)));
/// ```
///
/// Requests without a [`CurrentUser`] extension yield 401; a role outside
/// the allow-list yields 403.
pub fn authorize(
    allowed: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::NotAuthenticated)?;

            if !allowed.contains(&user.role) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id.clone(),
                    user_role = user.role.to_string(),
                    uri = req.uri().path().to_string()
                );
                return Err(AppError::forbidden(format!(
                    "Role '{}' may not access this resource",
                    user.role
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
