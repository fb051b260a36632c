use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

const DEFAULT_MAX_POOL_SIZE: u32 = 10;
const DEFAULT_MIN_POOL_SIZE: u32 = 1;

#[derive(Debug, Clone)]
pub struct MongoParams {
    pub uri: String,
    pub db_name: String,
    pub max_attempts: u32,
    pub overrides: ClientOverrides,
}

impl MongoParams {
    pub fn new(uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: db_name.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            overrides: ClientOverrides::default(),
        }
    }
}

/// Caller-supplied driver settings layered over the library defaults.
/// Per field the precedence is caller value, then value parsed from the
/// URI, then default (pool bounds only). Shallow merge.
#[derive(Debug, Clone, Default)]
pub struct ClientOverrides {
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
    pub app_name: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub server_selection_timeout: Option<Duration>,
}

impl ClientOverrides {
    fn apply(&self, options: &mut ClientOptions) {
        options.max_pool_size = self
            .max_pool_size
            .or(options.max_pool_size)
            .or(Some(DEFAULT_MAX_POOL_SIZE));
        options.min_pool_size = self
            .min_pool_size
            .or(options.min_pool_size)
            .or(Some(DEFAULT_MIN_POOL_SIZE));
        if let Some(app_name) = &self.app_name {
            options.app_name = Some(app_name.clone());
        }
        if let Some(timeout) = self.connect_timeout {
            options.connect_timeout = Some(timeout);
        }
        if let Some(timeout) = self.server_selection_timeout {
            options.server_selection_timeout = Some(timeout);
        }
    }
}

#[derive(Debug, Error)]
#[error("mongodb connection failed after {attempts} attempts with message: {message}")]
pub struct ConnectionError {
    pub attempts: u32,
    pub message: String,
}

/// Runs `attempt_connect` until it succeeds or the ceiling is hit.
/// `attempts_made` starts at 0 and the terminal check is `>=`, so up to
/// `max_attempts + 1` attempts are made in total. Failed attempts retry
/// immediately, without backoff.
async fn connect_with_retry<T, E, F, Fut>(
    max_attempts: u32,
    mut attempt_connect: F,
) -> Result<T, ConnectionError>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempts_made = 0_u32;

    loop {
        match attempt_connect().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempts_made >= max_attempts {
                    return Err(ConnectionError {
                        attempts: attempts_made,
                        message: err.to_string(),
                    });
                }
                warn!(attempts_made, "mongodb connection attempt failed: {err}");
                attempts_made = attempts_made.saturating_add(1);
            }
        }
    }
}

// The driver builds clients lazily, so a ping against the named database
// is what forces a live connection and surfaces failures eagerly.
async fn open_once(
    uri: &str,
    db_name: &str,
    overrides: &ClientOverrides,
) -> Result<Client, mongodb::error::Error> {
    let mut options = ClientOptions::parse(uri).await?;
    overrides.apply(&mut options);

    let client = Client::with_options(options)?;
    client
        .database(db_name)
        .run_command(doc! { "ping": 1 })
        .await?;

    Ok(client)
}

pub async fn connect_client(params: &MongoParams) -> Result<Client, ConnectionError> {
    connect_with_retry(params.max_attempts, || {
        open_once(&params.uri, &params.db_name, &params.overrides)
    })
    .await
}

pub async fn connect_database(params: &MongoParams) -> Result<Database, ConnectionError> {
    let client = connect_client(params).await?;
    Ok(client.database(&params.db_name))
}
