use std::env;
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Postgres { database_url: String },
    /// Non-persistent; everything is lost on restart.
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub jwt_secret: String,
    pub storage: StorageBackend,
    pub run_migrations: bool,
}

impl Config {
    /// Reads the process environment. Call `dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Empty("JWT_SECRET"));
        }

        let bind_address = get("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let storage = match get("STORAGE").as_deref().unwrap_or("postgres") {
            "postgres" => StorageBackend::Postgres {
                database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::Invalid { name: "STORAGE", value: other.to_string() });
            }
        };

        let run_migrations = match get("RUN_MIGRATIONS").as_deref() {
            None | Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => {
                return Err(ConfigError::Invalid { name: "RUN_MIGRATIONS", value: other.to_string() });
            }
        };

        Ok(Config { bind_address, jwt_secret, storage, run_migrations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_postgres_on_localhost() {
        let config = load(&[("JWT_SECRET", "s"), ("DATABASE_URL", "postgres://localhost/gym")]).unwrap();
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(
            config.storage,
            StorageBackend::Postgres { database_url: "postgres://localhost/gym".into() }
        );
        assert!(config.run_migrations);
    }

    #[test]
    fn secret_is_required_and_non_empty() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("JWT_SECRET"));
        assert_eq!(load(&[("JWT_SECRET", "")]).unwrap_err(), ConfigError::Empty("JWT_SECRET"));
    }

    #[test]
    fn postgres_needs_database_url() {
        assert_eq!(load(&[("JWT_SECRET", "s")]).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn memory_storage_needs_no_database() {
        let config = load(&[("JWT_SECRET", "s"), ("STORAGE", "memory"), ("RUN_MIGRATIONS", "false")]).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(!config.run_migrations);
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(matches!(
            load(&[("JWT_SECRET", "s"), ("STORAGE", "sqlite")]),
            Err(ConfigError::Invalid { name: "STORAGE", .. })
        ));
        assert!(matches!(
            load(&[("JWT_SECRET", "s"), ("STORAGE", "memory"), ("RUN_MIGRATIONS", "yes")]),
            Err(ConfigError::Invalid { name: "RUN_MIGRATIONS", .. })
        ));
    }
}
