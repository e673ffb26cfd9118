use crate::models::Match;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Two-tier cache for match listings
///
/// L1 is an in-process moka cache, L2 is Redis and shared across instances.
/// Both tiers expire entries after the same TTL.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            ttl_secs,
        })
    }

    /// Get a value, L1 first and then Redis. `None` on a miss.
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }

        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        match value {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", key);
                let parsed = serde_json::from_str(&json)?;
                self.l1_cache
                    .insert(key.to_string(), json.into_bytes())
                    .await;
                Ok(Some(parsed))
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    /// Set a value in both tiers
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache
            .insert(key.to_string(), json.as_bytes().to_vec())
            .await;

        let mut conn = self.redis.lock().await;
        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(json)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }
}

/// Cached match listings, read by the listing route and invalidated by the scoring job
///
/// Listings are keyed by scope plus a per-scope generation. Invalidation bumps the
/// generation instead of deleting, so a listing computed before the bump can only
/// be written under a key no later reader asks for.
#[async_trait]
pub trait MatchCache: Send + Sync {
    /// Current generation of a scope, `0` before its first invalidation
    async fn generation(&self, scope: &str) -> Result<u64, CacheError>;

    async fn get_matches(&self, key: &str) -> Result<Option<Vec<Match>>, CacheError>;

    async fn put_matches(&self, key: &str, matches: &[Match]) -> Result<(), CacheError>;

    /// Move every scope to a new generation
    async fn invalidate_scopes(&self, scopes: &[String]) -> Result<(), CacheError>;
}

#[async_trait]
impl MatchCache for CacheManager {
    async fn generation(&self, scope: &str) -> Result<u64, CacheError> {
        let mut conn = self.redis.lock().await;
        let generation: Option<u64> = redis::cmd("GET")
            .arg(CacheKey::generation(scope))
            .query_async(&mut *conn)
            .await?;
        Ok(generation.unwrap_or(0))
    }

    async fn get_matches(&self, key: &str) -> Result<Option<Vec<Match>>, CacheError> {
        self.get(key).await
    }

    async fn put_matches(&self, key: &str, matches: &[Match]) -> Result<(), CacheError> {
        self.set(key, &matches).await
    }

    async fn invalidate_scopes(&self, scopes: &[String]) -> Result<(), CacheError> {
        if scopes.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        for scope in scopes {
            pipe.cmd("INCR").arg(CacheKey::generation(scope)).ignore();
        }

        let mut conn = self.redis.lock().await;
        let _: () = pipe.query_async(&mut *conn).await?;
        drop(conn);

        tracing::debug!("Bumped {} cache generations", scopes.len());
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Stored matches for a sponsor
    pub fn sponsor_matches(sponsor_id: &str) -> String {
        format!("matches:sponsor:{}", sponsor_id)
    }

    /// Stored matches for an event
    pub fn event_matches(event_id: &str) -> String {
        format!("matches:event:{}", event_id)
    }

    /// A listing scope at one generation
    pub fn versioned(scope: &str, generation: u64) -> String {
        format!("{}:v{}", scope, generation)
    }

    /// Counter holding the generation of a listing scope
    pub fn generation(scope: &str) -> String {
        format!("gen:{}", scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_cache_generations() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60)
            .await
            .expect("Failed to create cache");

        let scope = CacheKey::sponsor_matches("test_sponsor");
        let before = cache.generation(&scope).await.unwrap();
        let key = CacheKey::versioned(&scope, before);

        cache.put_matches(&key, &[]).await.unwrap();
        assert_eq!(cache.get_matches(&key).await.unwrap(), Some(vec![]));

        cache.invalidate_scopes(&[scope.clone()]).await.unwrap();
        let after = cache.generation(&scope).await.unwrap();
        assert_eq!(after, before + 1);

        let fresh = CacheKey::versioned(&scope, after);
        assert!(cache.get_matches(&fresh).await.unwrap().is_none());
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::sponsor_matches("s1"), "matches:sponsor:s1");
        assert_eq!(CacheKey::event_matches("e1"), "matches:event:e1");
        assert_ne!(CacheKey::sponsor_matches("x"), CacheKey::event_matches("x"));
        assert_eq!(CacheKey::versioned("matches:event:e1", 3), "matches:event:e1:v3");
        assert_eq!(CacheKey::generation("matches:event:e1"), "gen:matches:event:e1");
    }
}
