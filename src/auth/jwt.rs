//! JWT token service
//!
//! Token generation, validation and the refresh grace window.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::Role;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    /// Token issuer
    pub issuer: String,
    /// Token audience
    pub audience: String,
    /// Days after expiry during which refresh still accepts a token
    pub refresh_grace_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = match load_jwt_secret() {
            Ok(secret) => secret,
            Err(e) => {
                #[cfg(debug_assertions)]
                {
                    tracing::warn!("JWT configuration error: {}, generating temporary key", e);
                    generate_printable_jwt_secret()
                }
                #[cfg(not(debug_assertions))]
                {
                    panic!("FATAL: JWT_SECRET configuration failed: {}", e);
                }
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440), // 24h
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "erp-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "erp-clients".to_string()),
            refresh_grace_days: std::env::var("JWT_REFRESH_GRACE_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),
        }
    }
}

/// Claims carried in every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID ("user:xyz")
    pub sub: String,
    /// Display name
    pub name: String,
    /// Account email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role, snake_case
    pub role: Role,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued-at timestamp
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Malformed payload: {0}")]
    InvalidPayload(String),

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Generate a printable random secret (development fallback)
pub fn generate_printable_jwt_secret() -> String {
    let allowed_chars =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?";

    let rng = SystemRandom::new();
    let mut key = String::new();

    for _ in 0..64 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            return "ErpServerDevelopmentSecureKey2026!ReplaceInProduction".to_string();
        }
        let idx = (byte[0] as usize) % allowed_chars.len();
        key.push(allowed_chars.as_bytes()[idx] as char);
    }

    key
}

/// Load the signing secret from JWT_SECRET
fn load_jwt_secret() -> Result<String, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            if secret.len() < 32 {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET must be at least 32 characters long".to_string(),
                ));
            }
            Ok(secret)
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("JWT_SECRET not set, generating temporary key for development");
                Ok(generate_printable_jwt_secret())
            }
            #[cfg(not(debug_assertions))]
            {
                Err(JwtError::ConfigError(
                    "JWT_SECRET environment variable must be set in production".to_string(),
                ))
            }
        }
    }
}

/// JWT token service
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a token for a user
    pub fn generate_token(
        &self,
        user_id: &str,
        name: &str,
        email: Option<&str>,
        role: Role,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            email: email.map(str::to_string),
            role,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    fn base_validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);
        validation
    }

    fn decode_with(&self, token: &str, validation: &Validation) -> Result<Claims, JwtError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::Json(err) => JwtError::InvalidPayload(err.to_string()),
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            })?;

        Ok(token_data.claims)
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.decode_with(token, &self.base_validation())
    }

    /// Validate a token for refresh
    ///
    /// Signature, issuer and audience checks are identical to
    /// [`validate_token`](Self::validate_token), but `exp` is allowed to lie
    /// up to `refresh_grace_days` in the past.
    pub fn validate_for_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = self.base_validation();
        validation.leeway = (self.config.refresh_grace_days * 24 * 60 * 60).max(0) as u64;
        self.decode_with(token, &validation)
    }

    /// Extract a bearer token from an Authorization header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// Current user context, parsed from JWT claims
///
/// Injected into request extensions by the authentication middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User ID ("user:xyz")
    pub id: String,
    /// Display name
    pub name: String,
    /// Account email, when the token carried one
    pub email: Option<String>,
    /// Role
    pub role: Role,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        }
    }
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "unit-test-secret-key-of-sufficient-length".to_string(),
            expiration_minutes: 60,
            issuer: "erp-server".to_string(),
            audience: "erp-clients".to_string(),
            refresh_grace_days: 7,
        })
    }

    #[test]
    fn test_generation_and_validation() {
        let service = test_service();

        let token = service
            .generate_token(
                "user:123",
                "Jane Doe",
                Some("jane@example.com"),
                Role::SalesManager,
            )
            .expect("Failed to generate test token");

        let claims = service
            .validate_token(&token)
            .expect("Failed to validate test token");

        assert_eq!(claims.sub, "user:123");
        assert_eq!(claims.name, "Jane Doe");
        assert_eq!(claims.email.as_deref(), Some("jane@example.com"));
        assert_eq!(claims.role, Role::SalesManager);
    }

    #[test]
    fn test_rejects_wrong_audience() {
        let service = test_service();
        let token = service
            .generate_token("user:123", "Jane", None, Role::Admin)
            .unwrap();

        let other = JwtService::with_config(JwtConfig {
            audience: "someone-else".to_string(),
            ..service.config.clone()
        });

        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_passes_refresh_validation() {
        let mut config = test_service().config;
        config.expiration_minutes = -10; // already expired at issue time
        let service = JwtService::with_config(config);

        let token = service
            .generate_token("user:123", "Jane", None, Role::Finance)
            .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
        let claims = service
            .validate_for_refresh(&token)
            .expect("refresh validation should tolerate recent expiry");
        assert_eq!(claims.role, Role::Finance);
    }

    #[test]
    fn test_refresh_rejects_tokens_beyond_grace() {
        let mut config = test_service().config;
        // Expired 20 days ago, grace is 7 days
        config.expiration_minutes = -(20 * 24 * 60);
        let service = JwtService::with_config(config);

        let token = service
            .generate_token("user:123", "Jane", None, Role::Finance)
            .unwrap();

        assert!(matches!(
            service.validate_for_refresh(&token),
            Err(JwtError::ExpiredToken)
        ));
    }
}
