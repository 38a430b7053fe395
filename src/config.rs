use crate::errors::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres { database_url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub cors_origins: CorsOrigins,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;

        let backend = lookup("STORAGE_BACKEND").unwrap_or_else(|| "postgres".to_string());
        let storage = match backend.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => {
                let database_url = lookup("DATABASE_URL")
                    .filter(|url| !url.trim().is_empty())
                    .ok_or_else(|| AppError::MissingConfig { key: "DATABASE_URL".to_string() })?;
                let max_connections = parse_or(
                    "DB_MAX_CONNECTIONS",
                    lookup("DB_MAX_CONNECTIONS"),
                    DEFAULT_MAX_CONNECTIONS,
                )?;
                StorageBackend::Postgres { database_url, max_connections }
            }
            "memory" => StorageBackend::Memory,
            _ => {
                return Err(AppError::InvalidConfig {
                    key: "STORAGE_BACKEND".to_string(),
                    value: backend,
                })
            }
        };

        let cors_origins = match lookup("CORS_ORIGINS") {
            None => CorsOrigins::Any,
            Some(raw) if raw.trim().is_empty() || raw.split(',').any(|o| o.trim() == "*") => {
                CorsOrigins::Any
            }
            Some(raw) => CorsOrigins::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect(),
            ),
        };

        Ok(Self { host, port, storage, cors_origins })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| AppError::InvalidConfig {
            key: key.to_string(),
            value,
        }),
    }
}
