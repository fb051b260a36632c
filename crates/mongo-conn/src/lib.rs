pub mod config;
pub mod connection;

pub use config::{ConfigError, MongoConfig};
pub use connection::{
    ClientOverrides, ConnectionError, MongoParams, connect_client, connect_database,
};
