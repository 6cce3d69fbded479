use std::{collections::HashMap, env, path::PathBuf, time::Duration};

use derive_more::{Display, Error};
use dotenv::dotenv;

pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[display(fmt = "missing environment variable '{}'", key)]
    Missing { key: &'static str },

    #[display(fmt = "invalid value '{}' for '{}'", value, key)]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    File(PathBuf),
    Postgres(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageKind,
    pub namespace: String,
    pub latency: Duration,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub seed_demo_data: bool,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Config::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let storage = match get("STORAGE").unwrap_or("memory") {
            "memory" => StorageKind::Memory,
            "file" => StorageKind::File(get("STORAGE_DIR").unwrap_or("data").into()),
            "postgres" => StorageKind::Postgres(
                get("DATABASE_URL")
                    .ok_or(ConfigError::Missing { key: "DATABASE_URL" })?
                    .to_string(),
            ),
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE",
                    value: other.to_string(),
                })
            }
        };

        let namespace = get("STORAGE_NAMESPACE").unwrap_or("condo");
        if !namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ConfigError::Invalid {
                key: "STORAGE_NAMESPACE",
                value: namespace.to_string(),
            });
        }

        Ok(Config {
            host: get("BIND_HOST").unwrap_or("127.0.0.1").to_string(),
            port: parse_or(get("BIND_PORT"), "BIND_PORT", 8080)?,
            storage,
            namespace: namespace.to_string(),
            latency: Duration::from_millis(parse_or(get("API_LATENCY_MS"), "API_LATENCY_MS", 0)?),
            jwt_secret: get("JWT_ACCESS_TOKEN")
                .ok_or(ConfigError::Missing {
                    key: "JWT_ACCESS_TOKEN",
                })?
                .to_string(),
            access_token_ttl: Duration::from_secs(parse_or(
                get("ACCESS_TOKEN_TTL_SECS"),
                "ACCESS_TOKEN_TTL_SECS",
                DEFAULT_ACCESS_TOKEN_TTL_SECS,
            )?),
            seed_demo_data: parse_or(get("SEED_DEMO_DATA"), "SEED_DEMO_DATA", false)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<&str>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_only_need_a_secret() {
        let config = Config::from_vars(&vars(&[("JWT_ACCESS_TOKEN", "s3cret")])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.namespace, "condo");
        assert_eq!(config.latency, Duration::ZERO);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn missing_secret_is_reported() {
        assert_eq!(
            Config::from_vars(&vars(&[])).unwrap_err(),
            ConfigError::Missing {
                key: "JWT_ACCESS_TOKEN"
            }
        );
    }

    #[test]
    fn postgres_needs_a_database_url() {
        let err = Config::from_vars(&vars(&[
            ("JWT_ACCESS_TOKEN", "s"),
            ("STORAGE", "postgres"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing { key: "DATABASE_URL" });
    }

    #[test]
    fn bad_numbers_are_invalid() {
        let err = Config::from_vars(&vars(&[
            ("JWT_ACCESS_TOKEN", "s"),
            ("API_LATENCY_MS", "soon"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "API_LATENCY_MS",
                value: "soon".into()
            }
        );
    }

    #[test]
    fn file_storage_reads_its_directory() {
        let config = Config::from_vars(&vars(&[
            ("JWT_ACCESS_TOKEN", "s"),
            ("STORAGE", "file"),
            ("STORAGE_DIR", "/tmp/condo"),
            ("API_LATENCY_MS", "300"),
        ]))
        .unwrap();
        assert_eq!(config.storage, StorageKind::File("/tmp/condo".into()));
        assert_eq!(config.latency, Duration::from_millis(300));
    }

    #[test]
    fn namespaces_stay_file_name_safe() {
        for bad in ["a_b", "a:b", "../x"] {
            let err = Config::from_vars(&vars(&[
                ("JWT_ACCESS_TOKEN", "s"),
                ("STORAGE_NAMESPACE", bad),
            ]))
            .unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    key: "STORAGE_NAMESPACE",
                    value: bad.into()
                }
            );
        }
        let ok = Config::from_vars(&vars(&[
            ("JWT_ACCESS_TOKEN", "s"),
            ("STORAGE_NAMESPACE", "bloco-a2"),
        ]))
        .unwrap();
        assert_eq!(ok.namespace, "bloco-a2");
    }
}
