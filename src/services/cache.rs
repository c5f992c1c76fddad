use moka::future::Cache;
use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Namespace prepended to every Redis key
const REDIS_KEY_PREFIX: &str = "tripmate:";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Shared Redis tier
///
/// `ConnectionManager` reconnects on its own and is cheap to clone, so each
/// operation works on its own handle.
struct RedisTier {
    conn: ConnectionManager,
    ttl_secs: u64,
}

impl RedisTier {
    fn key(key: &str) -> String {
        format!("{}{}", REDIS_KEY_PREFIX, key)
    }

    fn generation_key(key: &str) -> String {
        format!("{}gen:{}", REDIS_KEY_PREFIX, key)
    }

    async fn generation(&self, key: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<u64> = redis::cmd("GET")
            .arg(Self::generation_key(key))
            .query_async(&mut conn)
            .await?;
        Ok(value.unwrap_or(0))
    }

    async fn bump_generation(&self, key: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let value: u64 = redis::cmd("INCR")
            .arg(Self::generation_key(key))
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn fetch(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(Self::key(key))
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn store(&self, key: &str, json: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SETEX")
            .arg(Self::key(key))
            .arg(self.ttl_secs)
            .arg(json)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}

/// Two-tier read cache for plan listings and plan details
///
/// L1 is a per-process moka cache holding serialized JSON. L2 is an optional
/// Redis tier shared between instances; an L2 hit repopulates L1. Both tiers
/// expire entries after the same TTL.
///
/// Keys that get invalidated use the versioned calls. Values are stored
/// under `{key}@{generation}` and [`CacheManager::invalidate`] bumps the
/// generation, so a listing loaded before an invalidation can never be
/// read back after it. With Redis the generation lives in Redis, which
/// keeps every instance's L1 in step.
pub struct CacheManager {
    local: Cache<String, Arc<str>>,
    redis: Option<RedisTier>,
    generations: Mutex<HashMap<String, u64>>,
}

impl CacheManager {
    /// Cache manager with a Redis L2 tier
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            local: Self::local_tier(l1_size, ttl_secs),
            redis: Some(RedisTier { conn, ttl_secs }),
            generations: Mutex::new(HashMap::new()),
        })
    }

    /// Process-local cache manager
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        Self {
            local: Self::local_tier(l1_size, ttl_secs),
            redis: None,
            generations: Mutex::new(HashMap::new()),
        }
    }

    fn local_tier(l1_size: u64, ttl_secs: u64) -> Cache<String, Arc<str>> {
        Cache::builder()
            .max_capacity(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build()
    }

    pub fn has_l2(&self) -> bool {
        self.redis.is_some()
    }

    /// Look up a cached value, `Ok(None)` on a miss
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        if let Some(json) = self.local.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(serde_json::from_str(&json)?));
        }

        let Some(redis) = &self.redis else {
            return Ok(None);
        };

        match redis.fetch(key).await? {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", key);
                let value = serde_json::from_str(&json)?;
                self.local.insert(key.to_string(), Arc::from(json)).await;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;

        if let Some(redis) = &self.redis {
            redis.store(key, &json).await?;
        }
        self.local.insert(key.to_string(), Arc::from(json)).await;

        Ok(())
    }

    fn versioned(key: &str, generation: u64) -> String {
        format!("{}@{}", key, generation)
    }

    /// Current generation of a versioned key
    ///
    /// Read it before loading the value from the store and pass it to
    /// [`CacheManager::set_versioned`].
    pub async fn generation(&self, key: &str) -> Result<u64, CacheError> {
        match &self.redis {
            Some(redis) => redis.generation(key).await,
            None => Ok(self.generations.lock().await.get(key).copied().unwrap_or(0)),
        }
    }

    pub async fn get_versioned<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let generation = self.generation(key).await?;
        self.get(&Self::versioned(key, generation)).await
    }

    /// Cache a value loaded at `generation`
    ///
    /// Skipped when the key was invalidated since; returns whether the value
    /// was stored.
    pub async fn set_versioned<T: Serialize>(
        &self,
        key: &str,
        generation: u64,
        value: &T,
    ) -> Result<bool, CacheError> {
        if self.generation(key).await? != generation {
            tracing::debug!("Skipping stale write-back for {} (generation {})", key, generation);
            return Ok(false);
        }
        self.set(&Self::versioned(key, generation), value).await?;
        Ok(true)
    }

    /// Make every cached value of a versioned key unreachable
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let previous = match &self.redis {
            Some(redis) => redis.bump_generation(key).await? - 1,
            None => {
                let mut generations = self.generations.lock().await;
                let generation = generations.entry(key.to_string()).or_insert(0);
                *generation += 1;
                *generation - 1
            }
        };
        self.local.invalidate(&Self::versioned(key, previous)).await;
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    pub fn plans() -> String {
        "plans:all".to_string()
    }

    pub fn plan(plan_id: &uuid::Uuid) -> String {
        format!("plan:{}", plan_id)
    }
}
