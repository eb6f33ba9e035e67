use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub search: SearchConfig,
    pub security: SecurityConfig,
    pub web: WebConfig,
    pub google: GoogleConfig,
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
    /// Full connection URL. When absent the URL is assembled from DB_* parts.
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub name: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub max_age_days: i64,
    pub secure_cookie: bool,
    pub prune_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub window_secs: u64,
    pub max_keys: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub timeout_secs: u64,
    pub max_hits: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub enabled: bool,
    pub static_dir: String,
}

/// Google sign-in. Off unless client id, secret and `api_base_url` are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Public URL of this API; Google redirects back to `{api_base_url}/auth/google`
    pub api_base_url: Option<String>,
    /// Where the browser lands after signing in. Empty means this server.
    pub web_base_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base_url: None,
            web_base_url: String::new(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
        }
    }
}

impl GoogleConfig {
    pub fn is_configured(&self) -> bool {
        [&self.client_id, &self.client_secret, &self.api_base_url]
            .iter()
            .all(|v| v.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("development") | Ok("dev") | Ok("local") => Environment::Development,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Production,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        self.server.port = env_parse("PORT", self.server.port);

        // Database
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        self.database.user = env::var("DB_USER").ok().or(self.database.user);
        self.database.password = env::var("DB_PASSWORD").ok().or(self.database.password);
        self.database.host = env::var("DB_HOST").ok().or(self.database.host);
        self.database.port = env::var("DB_PORT").ok().and_then(|v| v.parse().ok()).or(self.database.port);
        self.database.name = env::var("DB_NAME").ok().or(self.database.name);
        self.database.max_connections = env_parse("DATABASE_MAX_CONNECTIONS", self.database.max_connections);
        self.database.connection_timeout = env_parse("DATABASE_CONNECTION_TIMEOUT", self.database.connection_timeout);

        // Session
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.session.cookie_name = v;
        }
        self.session.max_age_days = env_parse("SESSION_MAX_AGE_DAYS", self.session.max_age_days);
        self.session.secure_cookie = env_parse("SESSION_SECURE_COOKIE", self.session.secure_cookie);
        self.session.prune_interval_secs = env_parse("SESSION_PRUNE_INTERVAL_SECS", self.session.prune_interval_secs);

        // Rate limiting
        self.rate_limit.enabled = env_parse("RATE_LIMIT_ENABLED", self.rate_limit.enabled);
        self.rate_limit.window_secs = env_parse("RATE_LIMIT_WINDOW_SECS", self.rate_limit.window_secs);
        self.rate_limit.max_keys = env_parse("RATE_LIMIT_MAX_KEYS", self.rate_limit.max_keys);

        // Search proxy
        self.search.timeout_secs = env_parse("SEARCH_TIMEOUT_SECS", self.search.timeout_secs);
        self.search.max_hits = env_parse("SEARCH_MAX_HITS", self.search.max_hits);

        // Security
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        self.security.max_request_size_bytes =
            env_parse("API_MAX_REQUEST_SIZE_BYTES", self.security.max_request_size_bytes);

        // Web client
        self.web.enabled = env_parse("WEB_ENABLED", self.web.enabled);
        if let Ok(v) = env::var("WEB_STATIC_DIR") {
            self.web.static_dir = v;
        }

        // Google sign-in
        self.google.client_id = env::var("GOOGLE_CLIENT_ID").ok().or(self.google.client_id);
        self.google.client_secret = env::var("GOOGLE_CLIENT_SECRET").ok().or(self.google.client_secret);
        self.google.api_base_url = env::var("API_BASE_URL").ok().or(self.google.api_base_url);
        if let Ok(v) = env::var("WEB_BASE_URL") {
            self.google.web_base_url = v;
        }
        if let Ok(v) = env::var("GOOGLE_AUTH_URL") {
            self.google.auth_url = v;
        }
        if let Ok(v) = env::var("GOOGLE_TOKEN_URL") {
            self.google.token_url = v;
        }
        if let Ok(v) = env::var("GOOGLE_USERINFO_URL") {
            self.google.userinfo_url = v;
        }

        self
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::default_parts(10, 30),
            session: SessionConfig {
                cookie_name: "sessionId".to_string(),
                max_age_days: 180,
                secure_cookie: false,
                prune_interval_secs: 15 * 60,
            },
            rate_limit: RateLimitConfig {
                enabled: false,
                window_secs: 60,
                max_keys: 10_000,
            },
            search: SearchConfig {
                timeout_secs: 30,
                max_hits: 400,
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string()],
                max_request_size_bytes: 120 * 1024 * 1024, // 120MB
            },
            web: WebConfig {
                enabled: true,
                static_dir: "web".to_string(),
            },
            google: GoogleConfig::default(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::default_parts(20, 10),
            session: SessionConfig {
                cookie_name: "sessionId".to_string(),
                max_age_days: 180,
                secure_cookie: false,
                prune_interval_secs: 15 * 60,
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                window_secs: 60,
                max_keys: 50_000,
            },
            search: SearchConfig {
                timeout_secs: 30,
                max_hits: 400,
            },
            security: SecurityConfig {
                cors_origins: Vec::new(),
                max_request_size_bytes: 120 * 1024 * 1024,
            },
            web: WebConfig {
                enabled: true,
                static_dir: "web".to_string(),
            },
            google: GoogleConfig::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::default_parts(50, 5),
            session: SessionConfig {
                cookie_name: "sessionId".to_string(),
                max_age_days: 180,
                secure_cookie: true,
                prune_interval_secs: 15 * 60,
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                window_secs: 60,
                max_keys: 100_000,
            },
            search: SearchConfig {
                timeout_secs: 30,
                max_hits: 400,
            },
            security: SecurityConfig {
                cors_origins: Vec::new(),
                max_request_size_bytes: 120 * 1024 * 1024,
            },
            web: WebConfig {
                enabled: true,
                static_dir: "web".to_string(),
            },
            google: GoogleConfig::default(),
        }
    }
}

impl DatabaseConfig {
    fn default_parts(max_connections: u32, connection_timeout: u64) -> Self {
        Self {
            url: None,
            user: None,
            password: None,
            host: None,
            port: None,
            name: None,
            max_connections,
            connection_timeout,
        }
    }
}

/// Parse an env var into `T`, keeping `current` when unset or malformed.
fn env_parse<T: FromStr>(key: &str, current: T) -> T {
    match env::var(key) {
        Ok(v) => v.trim().parse().unwrap_or(current),
        Err(_) => current,
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
