//! Redis-backed product store
//!
//! Uses a [`ConnectionManager`], which multiplexes one connection across
//! clones and reconnects on its own. Writes go out as a single pipeline of
//! `SET` commands and reads as a single `MGET`.

use super::ProductStore;
use crate::app::models::ProductMapping;
use crate::{Error, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::{debug, info};

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connect to the Redis server at `url`
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::redis(format!("invalid Redis URL '{}'", url), e))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| Error::redis(format!("failed to connect to '{}'", url), e))?;

        info!("Connected to Redis at {}", url);
        Ok(Self { connection })
    }
}

#[async_trait]
impl ProductStore for RedisStore {
    async fn set_many(&self, mappings: &[ProductMapping]) -> Result<()> {
        if mappings.is_empty() {
            return Ok(());
        }

        let mut pipeline = redis::pipe();
        for mapping in mappings {
            pipeline.set(&mapping.id, &mapping.name).ignore();
        }

        let mut connection = self.connection.clone();
        let _: () = pipeline
            .query_async(&mut connection)
            .await
            .map_err(|e| Error::redis(format!("pipelined SET of {} keys failed", mappings.len()), e))?;

        debug!("Stored {} product mappings", mappings.len());
        Ok(())
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut connection = self.connection.clone();
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut connection)
            .await
            .map_err(|e| Error::redis(format!("MGET of {} keys failed", keys.len()), e))?;

        if values.len() != keys.len() {
            return Err(Error::store(format!(
                "MGET returned {} values for {} keys",
                values.len(),
                keys.len()
            )));
        }

        debug!("Resolved {} product keys", keys.len());
        Ok(keys.iter().cloned().zip(values).collect())
    }

    fn backend_type(&self) -> &'static str {
        "redis"
    }
}
