//! Redis integration service implementation
//!
//! This service owns the Redis client used for dashboard caching. Keys are
//! namespaced with the configured prefix and stored as JSON with a TTL.

use redis::{AsyncCommands, Client, RedisResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::config::settings::RedisConfig;
use crate::utils::errors::{AceError, Result};

/// Redis service for cached JSON payloads
#[derive(Clone)]
#[derive(Debug)]
pub struct RedisService {
    client: Client,
    prefix: String,
    ttl_seconds: u64,
}

impl RedisService {
    /// Create a new RedisService instance; no connection is opened yet
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;

        Ok(Self {
            client,
            prefix: config.prefix.clone(),
            ttl_seconds: config.ttl_seconds,
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(AceError::Redis)
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Set a value in Redis with TTL
    pub async fn set<T>(&self, key: &str, value: &T, ttl_seconds: Option<u64>) -> Result<()>
    where
        T: Serialize,
    {
        let mut conn = self.get_connection().await?;
        let serialized = serde_json::to_string(value)?;

        let full_key = self.full_key(key);
        let ttl = ttl_seconds.unwrap_or(self.ttl_seconds);

        let _: () = conn.set_ex(&full_key, serialized, ttl).await?;

        debug!(key = %full_key, ttl = ttl, "Value set in Redis");
        Ok(())
    }

    /// Get a value from Redis
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut conn = self.get_connection().await?;
        let full_key = self.full_key(key);

        let result: Option<String> = conn.get(&full_key).await?;

        match result {
            Some(data) => {
                let deserialized = serde_json::from_str::<T>(&data)?;
                debug!(key = %full_key, "Value retrieved from Redis");
                Ok(Some(deserialized))
            }
            None => {
                debug!(key = %full_key, "Key not found in Redis");
                Ok(None)
            }
        }
    }

    /// Delete a key from Redis
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let full_key = self.full_key(key);

        let deleted: i32 = conn.del(&full_key).await?;

        debug!(key = %full_key, deleted = deleted > 0, "Key deletion attempted");
        Ok(deleted > 0)
    }

    /// Health check for Redis connection
    pub async fn health_check(&self) -> Result<bool> {
        match self.get_connection().await {
            Ok(mut conn) => {
                let result: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
                match result {
                    Ok(response) => {
                        debug!(response = %response, "Redis health check successful");
                        Ok(response == "PONG")
                    }
                    Err(e) => {
                        warn!(error = %e, "Redis health check failed");
                        Ok(false)
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Redis connection failed");
                Ok(false)
            }
        }
    }
}

/// Dashboard payload cache keyed by provider id
///
/// Cache failures are logged and treated as misses; the dashboard is always
/// recomputable from the database.
#[derive(Clone, Debug)]
pub struct DashboardCache {
    redis: RedisService,
    enabled: bool,
}

impl DashboardCache {
    pub fn new(redis: RedisService, enabled: bool) -> Self {
        Self { redis, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Entries live for `redis.ttl_seconds`
    pub fn ttl_seconds(&self) -> u64 {
        self.redis.ttl_seconds
    }

    fn key(provider_id: i64) -> String {
        format!("dashboard:{}", provider_id)
    }

    pub async fn get<T>(&self, provider_id: i64) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        if !self.enabled {
            return None;
        }
        match self.redis.get(&Self::key(provider_id)).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(provider_id, error = %e, "Dashboard cache read failed");
                None
            }
        }
    }

    pub async fn store<T: Serialize>(&self, provider_id: i64, payload: &T) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.redis.set(&Self::key(provider_id), payload, Some(self.ttl_seconds())).await {
            warn!(provider_id, error = %e, "Dashboard cache write failed");
        }
    }

    /// Drop the cached dashboard after a write touching this provider
    pub async fn invalidate(&self, provider_id: i64) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.redis.delete(&Self::key(provider_id)).await {
            warn!(provider_id, error = %e, "Dashboard cache invalidation failed");
        }
    }
}
