//! 伪地理位置
//!
//! 默认没有真实的 IP 库：对地址字符串做 32 位哈希，再按固定权重表分配国家。
//! 这只是占位分布，部署时可通过 `analytics.maxminddb_path` 换成 MaxMind 查询。

use std::collections::HashMap;
use std::sync::Mutex;

/// 国家权重表（ISO 3166-1 alpha-2, 权重）
pub const COUNTRY_WEIGHTS: [(&str, u32); 10] = [
    ("US", 30),
    ("GB", 10),
    ("DE", 10),
    ("IN", 10),
    ("FR", 8),
    ("CA", 8),
    ("JP", 7),
    ("BR", 7),
    ("AU", 5),
    ("NL", 5),
];

/// IP → 国家代码
pub trait CountryLookup: Send + Sync {
    /// 返回 ISO 国家代码
    fn country(&self, ip: &str) -> String;

    /// provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// `h = h * 31 + unit`，按 UTF-16 码元计算，32 位有符号回绕
pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

/// 确定性的占位国家分配
pub fn assign_country(ip: &str) -> &'static str {
    let total: u32 = COUNTRY_WEIGHTS.iter().map(|(_, w)| w).sum();
    // i32::MIN 的绝对值超出 i32，先提升到 i64
    let index = (i64::from(string_hash(ip)).abs() % i64::from(total)) as u32;

    let mut cumulative = 0;
    for (country, weight) in COUNTRY_WEIGHTS {
        cumulative += weight;
        if index < cumulative {
            return country;
        }
    }
    COUNTRY_WEIGHTS[0].0
}

/// 哈希占位实现
#[derive(Debug, Default, Clone, Copy)]
pub struct HashCountryLookup;

impl CountryLookup for HashCountryLookup {
    fn country(&self, ip: &str) -> String {
        assign_country(ip).to_string()
    }

    fn name(&self) -> &'static str {
        "hash-placeholder"
    }
}

/// 单次聚合内按地址缓存查询结果
pub struct CachedCountryLookup<'a> {
    inner: &'a dyn CountryLookup,
    cache: Mutex<HashMap<String, String>>,
}

impl<'a> CachedCountryLookup<'a> {
    pub fn new(inner: &'a dyn CountryLookup) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl CountryLookup for CachedCountryLookup<'_> {
    fn country(&self, ip: &str) -> String {
        if let Ok(cache) = self.cache.lock()
            && let Some(country) = cache.get(ip)
        {
            return country.clone();
        }

        let country = self.inner.country(ip);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(ip.to_string(), country.clone());
        }
        country
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_string_hash_matches_reference_values() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("ab"), 97 * 31 + 98);
        // wraps like a 32-bit signed accumulator
        assert_eq!(string_hash("192.168.1.100"), -2_051_273_259);
    }

    #[test]
    fn test_weights_sum_to_hundred() {
        let total: u32 = COUNTRY_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_assignment_is_deterministic() {
        for ip in ["203.0.113.7", "2001:db8::1", "unknown", ""] {
            let first = assign_country(ip);
            assert_eq!(assign_country(ip), first);
            assert!(COUNTRY_WEIGHTS.iter().any(|(c, _)| *c == first));
        }
        // h("") = 0 -> index 0 -> first bucket
        assert_eq!(assign_country(""), "US");
    }

    #[test]
    fn test_cumulative_selection_boundaries() {
        // "a" = 97 -> index 97 -> last bucket (95..100)
        assert_eq!(assign_country("a"), "NL");
        // "0" = 48 -> US 0..30, GB 30..40, DE 40..50
        assert_eq!(assign_country("0"), "DE");
    }

    struct Counting(AtomicUsize);

    impl CountryLookup for Counting {
        fn country(&self, _ip: &str) -> String {
            self.0.fetch_add(1, Ordering::SeqCst);
            "SE".to_string()
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn test_cache_queries_inner_once_per_address() {
        let inner = Counting(AtomicUsize::new(0));
        let cached = CachedCountryLookup::new(&inner);

        for _ in 0..3 {
            assert_eq!(cached.country("198.51.100.1"), "SE");
        }
        cached.country("198.51.100.2");

        assert_eq!(inner.0.load(Ordering::SeqCst), 2);
        assert_eq!(cached.cached_len(), 2);
    }
}
