use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::feature::ProjectFlag;

pub type CacheResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const DEFAULT_TTL_SECONDS: i64 = 60;

#[async_trait]
pub trait Cache {
    async fn get(&self, name: &str) -> CacheResult<Option<ProjectFlag>>;
    async fn get_all(&self) -> CacheResult<Vec<ProjectFlag>>;
    async fn refresh(&mut self, flags: &[ProjectFlag], ttl_seconds: i64) -> CacheResult<()>;
    async fn should_refresh_cache(&self) -> bool;
    async fn init(&mut self) -> CacheResult<()>;
}

/// Project flags keyed by lowercased name.
pub struct MemoryCache {
    flags: RwLock<HashMap<String, ProjectFlag>>,
    cache_ttl: i64,
    next_refresh: RwLock<DateTime<Utc>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            flags: RwLock::new(HashMap::new()),
            cache_ttl: DEFAULT_TTL_SECONDS,
            next_refresh: RwLock::new(stale_deadline()),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

// A deadline in the past, so the first lookup always fetches.
fn stale_deadline() -> DateTime<Utc> {
    Utc::now() - chrono::Duration::seconds(90)
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, name: &str) -> CacheResult<Option<ProjectFlag>> {
        let flags = self.flags.read().await;
        Ok(flags.get(&name.to_lowercase()).cloned())
    }

    async fn get_all(&self) -> CacheResult<Vec<ProjectFlag>> {
        let flags = self.flags.read().await;
        let mut all_flags: Vec<ProjectFlag> = flags.values().cloned().collect();
        all_flags.sort_by_key(|flag| flag.id);
        Ok(all_flags)
    }

    async fn refresh(&mut self, flags: &[ProjectFlag], ttl_seconds: i64) -> CacheResult<()> {
        let mut flag_map = self.flags.write().await;
        flag_map.clear();

        for flag in flags {
            flag_map.insert(flag.name.to_lowercase(), flag.clone());
        }

        self.cache_ttl = ttl_seconds;
        let mut next_refresh = self.next_refresh.write().await;
        *next_refresh = Utc::now() + chrono::Duration::seconds(self.cache_ttl);

        Ok(())
    }

    async fn should_refresh_cache(&self) -> bool {
        let next_refresh = self.next_refresh.read().await;
        Utc::now() > *next_refresh
    }

    async fn init(&mut self) -> CacheResult<()> {
        self.cache_ttl = DEFAULT_TTL_SECONDS;
        self.flags.write().await.clear();
        let mut next_refresh = self.next_refresh.write().await;
        *next_refresh = stale_deadline();
        Ok(())
    }
}
