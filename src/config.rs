use crate::error::app_error::AppError;
use rocket::figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds.
    pub acquire_timeout: u64,
    /// Apply pending migrations from `migrations/` when the server ignites.
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_path: String,
    /// Extra prefixes the same routes are mounted under.
    pub additional_base_paths: Vec<String>,
    pub enable_swagger: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/timetable".to_string(),
            max_connections: 16,
            min_connections: 2,
            acquire_timeout: 5,
            run_migrations: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            additional_base_paths: Vec::new(),
            enable_swagger: true,
        }
    }
}

impl ApiConfig {
    /// Every prefix the API is mounted under, normalised and deduplicated.
    /// The primary `base_path` comes first.
    pub fn mount_points(&self) -> Vec<String> {
        let mut points: Vec<String> = Vec::with_capacity(1 + self.additional_base_paths.len());
        for raw in std::iter::once(&self.base_path).chain(&self.additional_base_paths) {
            let point = normalize_mount_point(raw);
            if !points.contains(&point) {
                points.push(point);
            }
        }
        points
    }
}

/// `""` falls back to the default prefix; otherwise a leading slash is
/// ensured and trailing slashes are dropped.
pub fn normalize_mount_point(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    match trimmed {
        "" if raw.trim().is_empty() => DEFAULT_API_BASE_PATH.to_string(),
        "" => "/".to_string(),
        path if path.starts_with('/') => path.to_string(),
        path => format!("/{path}"),
    }
}

/// Joins a mount point and a relative route path with exactly one slash.
pub fn under(mount_point: &str, path: &str) -> String {
    format!("{}/{}", mount_point.trim_end_matches('/'), path.trim_start_matches('/'))
}

impl CorsConfig {
    pub fn is_wildcard(&self) -> bool {
        matches!(self.allowed_origins.as_slice(), [only] if only.as_str() == "*")
    }

    /// Browsers refuse credentialed responses to `*`, so the pair is a misconfiguration.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.is_wildcard() && self.allow_credentials {
            return Err(AppError::InvalidConfiguration(
                "wildcard CORS origins cannot be combined with allow_credentials".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Timetable.toml (optional)
    /// 3. Environment variables prefixed with TIMETABLE_, sections split on a
    ///    double underscore (e.g. TIMETABLE_DATABASE__MAX_CONNECTIONS)
    /// 4. DATABASE_URL
    pub fn load() -> Result<Self, AppError> {
        Ok(Self::figment().extract()?)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("Timetable.toml"))
            .merge(Env::prefixed("TIMETABLE_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
    }
}
