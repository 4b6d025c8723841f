use cookie::SameSite;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub integrations: IntegrationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string. When absent outside production the
    /// in-memory store is used.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cookie_secure: bool,
    #[serde(skip, default = "default_same_site")]
    pub cookie_same_site: SameSite,
    pub cors_origins: Vec<String>,
    /// Accept `POST /jwt` with a bare email instead of a bridged ID token.
    pub allow_direct_identity: bool,
}

fn default_same_site() -> SameSite {
    SameSite::Strict
}

/// Accepts `Strict`, `Lax` or `None` in any case.
fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationConfig {
    #[serde(skip_serializing)]
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    #[serde(skip_serializing)]
    pub identity_api_key: Option<String>,
    pub identity_api_base: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set")]
    MissingJwtSecret,

    #[error("DATABASE_URL must be set in production")]
    MissingDatabaseUrl,

    #[error("invalid URL for {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("SECURITY_COOKIE_SAME_SITE") {
            self.security.cookie_same_site = parse_same_site(&v).unwrap_or(self.security.cookie_same_site);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_ALLOW_DIRECT_IDENTITY") {
            self.security.allow_direct_identity = v.parse().unwrap_or(self.security.allow_direct_identity);
        }

        // Integration overrides
        if let Ok(v) = env::var("STRIPE_SECRET_KEY") {
            self.integrations.stripe_secret_key = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("STRIPE_API_BASE") {
            self.integrations.stripe_api_base = v;
        }
        if let Ok(v) = env::var("IDENTITY_API_KEY") {
            self.integrations.identity_api_key = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("IDENTITY_API_BASE") {
            self.integrations.identity_api_base = v;
        }

        self
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.is_production() && self.database.url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        for (name, value) in [
            ("STRIPE_API_BASE", &self.integrations.stripe_api_base),
            ("IDENTITY_API_BASE", &self.integrations.identity_api_base),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidUrl {
                    name,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cookie_secure: false,
                cookie_same_site: SameSite::Strict,
                cors_origins: vec!["http://localhost:5173".to_string(), "http://localhost:5174".to_string()],
                allow_direct_identity: true,
            },
            integrations: IntegrationConfig::defaults(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cookie_secure: true,
                cookie_same_site: SameSite::None,
                cors_origins: vec!["https://staging.towertrack.app".to_string()],
                allow_direct_identity: true,
            },
            integrations: IntegrationConfig::defaults(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cookie_secure: true,
                cookie_same_site: SameSite::None,
                cors_origins: vec!["https://towertrack.app".to_string()],
                allow_direct_identity: false,
            },
            integrations: IntegrationConfig::defaults(),
        }
    }

    /// Development preset with a fixed secret, for tests and local tooling.
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.security.jwt_secret = "test-secret-do-not-use".to_string();
        config.security.jwt_expiry_hours = 1;
        config
    }
}

impl IntegrationConfig {
    fn defaults() -> Self {
        Self {
            stripe_secret_key: None,
            stripe_api_base: "https://api.stripe.com".to_string(),
            identity_api_key: None,
            identity_api_base: "https://identitytoolkit.googleapis.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.security.allow_direct_identity);
        assert!(!config.security.cookie_secure);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.security.allow_direct_identity);
        assert!(config.security.cookie_secure);
        assert_eq!(config.security.cookie_same_site, SameSite::None);
    }

    #[test]
    fn same_site_parses_case_insensitively() {
        assert_eq!(parse_same_site("lax"), Some(SameSite::Lax));
        assert_eq!(parse_same_site(" NONE "), Some(SameSite::None));
        assert_eq!(parse_same_site("Strict"), Some(SameSite::Strict));
        assert_eq!(parse_same_site("sometimes"), None);
    }

    #[test]
    fn validate_requires_secret() {
        let config = AppConfig::development();
        assert!(matches!(config.validate(), Err(ConfigError::MissingJwtSecret)));
        assert!(AppConfig::for_tests().validate().is_ok());
    }

    #[test]
    fn validate_requires_database_in_production() {
        let mut config = AppConfig::production();
        config.security.jwt_secret = "s3cret".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingDatabaseUrl)));

        config.database.url = Some("postgres://localhost/towertrack".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_integration_url() {
        let mut config = AppConfig::for_tests();
        config.integrations.stripe_api_base = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl { name: "STRIPE_API_BASE", .. })));
    }
}
