use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Runtime settings, chosen per `APP_ENV` and then adjusted by individual variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub paging: PagingConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn detect() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Page size applied when a search omits `size`
    pub default_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    /// Log successful logins and logouts at info level
    pub enable_audit_logging: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::defaults_for(Environment::detect()).with_env_overrides()
    }

    pub fn defaults_for(environment: Environment) -> Self {
        let production = environment == Environment::Production;
        let development = environment == Environment::Development;

        let (max_connections, connection_timeout, max_request_size_bytes) = match environment {
            Environment::Development => (10, 30, 1024 * 1024),
            Environment::Staging => (20, 10, 512 * 1024),
            Environment::Production => (50, 5, 256 * 1024),
        };
        let cors_origins = match environment {
            Environment::Development => vec!["http://localhost:3000", "http://localhost:5173"],
            Environment::Staging => vec!["https://staging.example.com"],
            Environment::Production => vec!["https://app.example.com"],
        };

        Self {
            environment,
            paging: PagingConfig { default_size: 10 },
            database: DatabaseConfig {
                max_connections,
                connection_timeout,
                enable_query_logging: !production,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: !production,
                max_request_size_bytes,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: cors_origins.into_iter().map(String::from).collect(),
                enable_audit_logging: !development,
            },
        }
    }

    fn with_env_overrides(mut self) -> Self {
        override_from("PAGING_DEFAULT_SIZE", &mut self.paging.default_size);
        if self.paging.default_size < 1 {
            self.paging.default_size = 10;
        }

        override_from("DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections);
        override_from("DATABASE_CONNECTION_TIMEOUT", &mut self.database.connection_timeout);
        override_from("DATABASE_ENABLE_QUERY_LOGGING", &mut self.database.enable_query_logging);

        // CONTACT_API_PORT wins over the generic PORT
        override_from("PORT", &mut self.api.port);
        override_from("CONTACT_API_PORT", &mut self.api.port);
        override_from("API_ENABLE_REQUEST_LOGGING", &mut self.api.enable_request_logging);
        override_from("API_MAX_REQUEST_SIZE_BYTES", &mut self.api.max_request_size_bytes);

        override_from("SECURITY_ENABLE_CORS", &mut self.security.enable_cors);
        override_from("SECURITY_ENABLE_AUDIT_LOGGING", &mut self.security.enable_audit_logging);
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        self
    }
}

/// Replace `target` with the parsed variable; unparseable values keep the default
fn override_from<T: FromStr>(name: &str, target: &mut T) {
    if let Some(value) = env::var(name).ok().and_then(|v| v.trim().parse().ok()) {
        *target = value;
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
