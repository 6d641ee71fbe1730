use std::path::PathBuf;

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    File,
    Redis,
}

impl StorageKind {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "file" => Ok(StorageKind::File),
            "redis" => Ok(StorageKind::Redis),
            other => bail!("STORAGE_BACKEND must be one of memory, file, redis (got '{other}')"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage_backend: StorageKind,
    pub storage_dir: PathBuf,
    /// Required when `storage_backend` is `Redis`.
    pub redis_url: Option<String>,
    /// AI flows are disabled when unset.
    pub anthropic_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let storage_backend = StorageKind::parse(&env_or("STORAGE_BACKEND", "memory"))?;
        let redis_url = match storage_backend {
            StorageKind::Redis => Some(require_env("REDIS_URL")?),
            _ => optional_env("REDIS_URL"),
        };

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            storage_backend,
            storage_dir: PathBuf::from(env_or("STORAGE_DIR", "./data")),
            redis_url,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_parse() {
        assert_eq!(StorageKind::parse("memory").unwrap(), StorageKind::Memory);
        assert_eq!(StorageKind::parse(" File ").unwrap(), StorageKind::File);
        assert_eq!(StorageKind::parse("REDIS").unwrap(), StorageKind::Redis);
        assert!(StorageKind::parse("postgres").is_err());
    }
}
