use crate::auth::JwtConfig;

/// Server configuration
///
/// Every field can be overridden through environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | DATA_DIR | ./data | database and log storage |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | LOG_LEVEL | info | tracing filter when RUST_LOG is unset |
/// | LOG_DIR | (none) | enables daily rolling file output |
/// | ADMIN_EMAIL / ADMIN_PASSWORD | (none) | seed admin account on first boot |
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the embedded database and log files
    pub data_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT settings
    pub jwt: JwtConfig,
    /// development | staging | production
    pub environment: String,
    /// Default tracing filter
    pub log_level: String,
    /// Rolling file log directory, stdout only when unset
    pub log_dir: Option<String>,
    /// Seed admin credentials, applied only when no admin exists yet
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            admin_email: std::env::var("ADMIN_EMAIL").ok(),
            admin_password: std::env::var("ADMIN_PASSWORD").ok(),
        }
    }

    /// Override the storage location and port, mostly for tests
    pub fn with_overrides(data_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.data_dir = data_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
