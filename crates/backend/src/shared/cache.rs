use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use serde_json::Value;

/// Read-through cache for rendered dashboard responses. The cache is an
/// optimization only: a miss or a poisoned lock degrades to recomputing,
/// never to an error.
pub trait ReportCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, value: Value);
    fn invalidate_prefix(&self, prefix: &str);
}

const DEFAULT_TTL: Duration = Duration::from_secs(300);

pub struct MemoryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Value)>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ReportCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let Ok(mut entries) = self.entries.lock() else {
            return None;
        };
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: &str, value: Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), (Instant::now(), value));
        }
    }

    fn invalidate_prefix(&self, prefix: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|key, _| !key.starts_with(prefix));
        }
    }
}

/// Cache that never hits, used by tests and as an off switch.
pub struct NoopCache;

impl ReportCache for NoopCache {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }
    fn put(&self, _key: &str, _value: Value) {}
    fn invalidate_prefix(&self, _prefix: &str) {}
}

static DASHBOARD_CACHE: Lazy<MemoryCache> = Lazy::new(MemoryCache::with_default_ttl);

/// Process-wide cache shared by the dashboard handlers. Write paths
/// invalidate the "dashboard" prefix after every successful upsert.
pub fn dashboard_cache() -> &'static dyn ReportCache {
    &*DASHBOARD_CACHE
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stores_and_returns_values_within_ttl() {
        let cache = MemoryCache::with_default_ttl();
        cache.put("dashboard:d401:retail", json!({"rows": 3}));
        assert_eq!(cache.get("dashboard:d401:retail"), Some(json!({"rows": 3})));
        assert_eq!(cache.get("dashboard:d401:other"), None);
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = MemoryCache::new(Duration::ZERO);
        cache.put("dashboard:d401:retail", json!(1));
        assert_eq!(cache.get("dashboard:d401:retail"), None);
    }

    #[test]
    fn prefix_invalidation_spares_other_keys() {
        let cache = MemoryCache::with_default_ttl();
        cache.put("dashboard:d401:retail", json!(1));
        cache.put("dashboard:d403:retail", json!(2));
        cache.put("months", json!(3));
        cache.invalidate_prefix("dashboard");
        assert_eq!(cache.get("dashboard:d401:retail"), None);
        assert_eq!(cache.get("dashboard:d403:retail"), None);
        assert_eq!(cache.get("months"), Some(json!(3)));
    }

    #[test]
    fn noop_cache_never_hits() {
        let cache = NoopCache;
        cache.put("key", json!(1));
        assert_eq!(cache.get("key"), None);
    }
}
