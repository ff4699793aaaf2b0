//! 内存缓存
//!
//! 带过期时间的 key-value 缓存，读取时惰性删除过期条目。
//! 进程内单实例，多个 worker 线程共享，所有操作在互斥锁内完成。

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{StockOverview, StockQuote, StockSearchResponse};

/// 默认过期时间（秒）
pub const DEFAULT_TTL_SECS: u64 = 300;

/// 时间源（秒级 Unix 时间戳）
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// 系统墙钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// 缓存条目
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    /// 过期时刻（Unix 秒）
    expiry: i64,
}

/// 带过期时间的内存缓存
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl_secs: u64,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    /// 使用系统时钟创建缓存
    pub fn new(ttl_secs: u64) -> Self {
        Self::with_clock(ttl_secs, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl_secs,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // 条目写入是单次 insert，锁中毒时数据仍然完整
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 读取未过期的值；命中过期条目时将其删除
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let expired = match entries.get(key) {
            Some(entry) if entry.expiry > now => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
            log::debug!("缓存过期已移除: {}", key);
        }
        None
    }

    /// 写入并覆盖已有条目，使用默认过期时间
    pub fn set(&self, key: &str, value: V) {
        self.set_with_ttl(key, value, self.ttl_secs);
    }

    /// 写入并覆盖已有条目
    pub fn set_with_ttl(&self, key: &str, value: V, ttl_secs: u64) {
        let expiry = self.clock.now().saturating_add(ttl_secs as i64);
        self.lock()
            .insert(key.to_string(), CacheEntry { value, expiry });
    }

    /// 清空全部条目
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// 是否存在该 key（不判断过期，也不触发删除）
    #[allow(dead_code)]
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// 当前条目数（含尚未被读取删除的过期条目）
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 删除所有已过期条目，返回删除数量
    ///
    /// 只供后台定期清理使用，不影响 get/set 语义
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expiry > now);
        before - entries.len()
    }
}

/// 缓存中保存的已标准化数据
#[derive(Debug, Clone, PartialEq)]
pub enum CachedRecord {
    Overview(StockOverview),
    Quote(StockQuote),
    Search(StockSearchResponse),
}

/// 全局共享的股票数据缓存
pub type StockCache = TtlCache<CachedRecord>;


#[cfg(test)]
mod tests {
    use super::test_support::ManualClock;
    use super::*;

    fn cache_at(start: i64) -> (TtlCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start));
        (TtlCache::with_clock(DEFAULT_TTL_SECS, clock.clone()), clock)
    }

    #[test]
    fn test_get_within_ttl() {
        let (cache, clock) = cache_at(1_000);
        cache.set("quote_IBM", "v1".to_string());

        assert_eq!(cache.get("quote_IBM"), Some("v1".to_string()));
        clock.advance(299);
        assert_eq!(cache.get("quote_IBM"), Some("v1".to_string()));
    }

    #[test]
    fn test_expired_entry_removed_on_read() {
        let (cache, clock) = cache_at(1_000);
        cache.set("quote_IBM", "v1".to_string());

        // expiry == now 视为过期
        clock.advance(300);
        assert!(cache.contains_key("quote_IBM"));
        assert_eq!(cache.get("quote_IBM"), None);
        assert!(!cache.contains_key("quote_IBM"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_key() {
        let (cache, _) = cache_at(0);
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn test_set_overwrites_and_refreshes_expiry() {
        let (cache, clock) = cache_at(1_000);
        cache.set("k", "old".to_string());
        clock.advance(200);
        cache.set("k", "new".to_string());
        clock.advance(200);

        assert_eq!(cache.get("k"), Some("new".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_set_with_ttl() {
        let (cache, clock) = cache_at(1_000);
        cache.set_with_ttl("short", "a".to_string(), 60);
        cache.set("long", "b".to_string());
        clock.advance(61);

        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("long"), Some("b".to_string()));
    }

    #[test]
    fn test_clear() {
        let (cache, _) = cache_at(1_000);
        for key in ["overview_AAPL", "quote_AAPL", "search_apple"] {
            cache.set(key, key.to_string());
        }
        cache.clear();

        for key in ["overview_AAPL", "quote_AAPL", "search_apple"] {
            assert_eq!(cache.get(key), None);
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_expired_keeps_live_entries() {
        let (cache, clock) = cache_at(1_000);
        cache.set_with_ttl("a", "a".to_string(), 10);
        cache.set_with_ttl("b", "b".to_string(), 100);
        clock.advance(50);

        assert_eq!(cache.purge_expired(), 1);
        assert!(!cache.contains_key("a"));
        assert_eq!(cache.get("b"), Some("b".to_string()));
    }

    #[test]
    fn test_concurrent_writers() {
        let cache = Arc::new(TtlCache::<usize>::new(DEFAULT_TTL_SECS));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        cache.set(&format!("{}_{}", t, i), i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 800);
    }
}
