use std::env;

use thiserror::Error;

use crate::connection::{ClientOverrides, DEFAULT_MAX_ATTEMPTS, MongoParams};

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub db_name: String,
    pub max_connect_attempts: u32,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
}

impl MongoConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            uri: require_env("MONGODB_URI")?,
            db_name: require_env("MONGODB_DB_NAME")?,
            max_connect_attempts: parse_u32_env(
                "MONGODB_MAX_CONNECT_ATTEMPTS",
                DEFAULT_MAX_ATTEMPTS,
            )?,
            max_pool_size: parse_opt_u32_env("MONGODB_MAX_POOL_SIZE")?,
            min_pool_size: parse_opt_u32_env("MONGODB_MIN_POOL_SIZE")?,
        })
    }

    pub fn params(&self) -> MongoParams {
        MongoParams {
            uri: self.uri.clone(),
            db_name: self.db_name.clone(),
            max_attempts: self.max_connect_attempts,
            overrides: ClientOverrides {
                max_pool_size: self.max_pool_size,
                min_pool_size: self.min_pool_size,
                ..ClientOverrides::default()
            },
        }
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))
}

fn parse_u32_env(key: &str, default: u32) -> Result<u32, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<u32>()
            .map_err(|_| ConfigError::ParseInt(key.to_string())),
        Err(_) => Ok(default),
    }
}

fn parse_opt_u32_env(key: &str) -> Result<Option<u32>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ConfigError::ParseInt(key.to_string())),
        Err(_) => Ok(None),
    }
}
