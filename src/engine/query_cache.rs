// ==========================================
// 铸造模具监控系统 - 查询结果缓存
// ==========================================
// 键: (今天, 客户集合)，集合语义（顺序/重复无关）
// 失效: 日期变化时整体清空（按自然日分区）；任何写入整体清空
// ==========================================

use crate::domain::CustomerId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// 复合缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub day: NaiveDate,
    pub customers: BTreeSet<CustomerId>,
}

/// 命中统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug)]
pub struct QueryCache<V> {
    day: Option<NaiveDate>,
    entries: HashMap<CacheKey, Arc<V>>,
    hits: u64,
    misses: u64,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            day: None,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<V> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 命中直接返回；否则计算并写入
    pub fn get_or_compute<F>(&mut self, key: CacheKey, compute: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        if self.day != Some(key.day) {
            if self.day.is_some() {
                tracing::debug!(evicted = self.entries.len(), "日期变化，缓存分区重置");
            }
            self.entries.clear();
            self.day = Some(key.day);
        }

        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(value);
        }

        self.misses += 1;
        let value = Arc::new(compute());
        self.entries.insert(key, Arc::clone(&value));
        value
    }

    /// 写入后整体清空
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(day: u32, customers: &[u32]) -> CacheKey {
        CacheKey {
            day: NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
            customers: customers.iter().map(|c| CustomerId(*c)).collect(),
        }
    }

    #[test]
    fn test_hit_does_not_recompute() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        let first = cache.get_or_compute(key(1, &[1]), || 7);
        let second = cache.get_or_compute(key(1, &[1]), || panic!("should hit cache"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_key_has_set_semantics() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        cache.get_or_compute(key(1, &[1, 2]), || 1);
        let v = cache.get_or_compute(key(1, &[2, 1, 2]), || 2);
        assert_eq!(*v, 1);

        // {12} 与 {1,2} 不冲突
        let v = cache.get_or_compute(key(1, &[12]), || 3);
        assert_eq!(*v, 3);
        let v = cache.get_or_compute(key(1, &[1]), || 4);
        assert_eq!(*v, 4);
    }

    #[test]
    fn test_new_day_resets_partition() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        cache.get_or_compute(key(1, &[1]), || 1);
        cache.get_or_compute(key(1, &[2]), || 2);

        let v = cache.get_or_compute(key(2, &[1]), || 10);
        assert_eq!(*v, 10);
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn test_invalidate_clears_entries() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        cache.get_or_compute(key(1, &[1]), || 1);
        cache.invalidate();

        let v = cache.get_or_compute(key(1, &[1]), || 2);
        assert_eq!(*v, 2);
    }
}
