use std::collections::HashMap;
use std::time::Duration;

use voyage_shared::Timestamp;

use super::Payload;

/// 缓存条目
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub stored_at: Timestamp,
    pub payload: Payload,
}

impl CacheEntry {
    fn is_fresh(&self, now: Timestamp, ttl: Duration) -> bool {
        now.since(self.stored_at) < ttl
    }
}

/// GET 响应缓存，以完整 URL 为键
///
/// 过期条目只在读取时或显式 `sweep` 时清除，没有后台定时器，也没有容量上限。
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// 读取未过期的载荷；过期条目在此处顺带删除
    pub fn get(&mut self, key: &str, now: Timestamp) -> Option<Payload> {
        let fresh = self.entries.get(key)?.is_fresh(now, self.ttl);
        if fresh {
            self.entries.get(key).map(|entry| entry.payload.clone())
        } else {
            self.entries.remove(key);
            None
        }
    }

    /// 写入或覆盖
    pub fn insert(&mut self, key: String, payload: Payload, now: Timestamp) {
        self.entries.insert(
            key,
            CacheEntry {
                stored_at: now,
                payload,
            },
        );
    }

    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 删除所有过期条目，返回删除数量
    pub fn sweep(&mut self, now: Timestamp) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.is_fresh(now, ttl));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
