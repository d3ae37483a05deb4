//! Redis cache of the most recently issued token per user.
//!
//! Entries live under `token:{user_id}` with a TTL. Login replaces the entry,
//! account deletion removes it. A missing or unreachable Redis degrades to a
//! no-op cache; authentication never depends on it.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use mindforge_core::defaults;

#[derive(Clone)]
pub struct TokenCache {
    inner: Arc<TokenCacheInner>,
}

struct TokenCacheInner {
    /// None when disabled or Redis was unreachable at startup.
    connection: RwLock<Option<ConnectionManager>>,
    ttl_seconds: u64,
    enabled: bool,
}

impl TokenCache {
    /// Connect to Redis. Connection failures disable the cache with a warning.
    pub async fn connect(enabled: bool, redis_url: &str, ttl_seconds: u64) -> Self {
        let connection = if enabled {
            match redis::Client::open(redis_url) {
                Ok(client) => match ConnectionManager::new(client).await {
                    Ok(conn) => {
                        info!(
                            subsystem = "auth",
                            component = "token_cache",
                            ttl_seconds,
                            "Redis token cache enabled"
                        );
                        Some(conn)
                    }
                    Err(e) => {
                        warn!("Failed to connect to Redis, token cache disabled: {}", e);
                        None
                    }
                },
                Err(e) => {
                    warn!("Invalid Redis URL, token cache disabled: {}", e);
                    None
                }
            }
        } else {
            info!("Redis token cache disabled via REDIS_ENABLED=false");
            None
        };

        Self {
            inner: Arc::new(TokenCacheInner {
                connection: RwLock::new(connection),
                ttl_seconds,
                enabled,
            }),
        }
    }

    /// Create a disabled cache (for testing or when Redis is unavailable).
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(TokenCacheInner {
                connection: RwLock::new(None),
                ttl_seconds: defaults::TOKEN_CACHE_TTL_SECS,
                enabled: false,
            }),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.enabled && self.inner.connection.read().await.is_some()
    }

    pub fn key(user_id: i64) -> String {
        format!("{}{}", defaults::TOKEN_CACHE_PREFIX, user_id)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.inner.ttl_seconds)
    }

    /// Clone of the shared connection. The lock is released before any
    /// Redis round trip.
    async fn connection(&self) -> Option<ConnectionManager> {
        self.inner.connection.read().await.clone()
    }

    /// Store `token` for `user_id`, replacing any previous entry.
    pub async fn store(&self, user_id: i64, token: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };

        let key = Self::key(user_id);
        match conn
            .set_ex::<_, _, ()>(&key, token, self.inner.ttl_seconds)
            .await
        {
            Ok(_) => {
                debug!("Token cache SET: {} (TTL: {}s)", key, self.inner.ttl_seconds);
                true
            }
            Err(e) => {
                error!("Redis SET error: {}", e);
                false
            }
        }
    }

    pub async fn invalidate(&self, user_id: i64) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };

        let key = Self::key(user_id);
        match conn.del::<_, ()>(&key).await {
            Ok(_) => {
                debug!("Token cache DEL: {}", key);
                true
            }
            Err(e) => {
                error!("Redis DEL error: {}", e);
                false
            }
        }
    }
}
