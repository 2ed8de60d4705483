//! GeoIP 服务模块
//!
//! 根据配置选择国家查询实现：
//! 1. `analytics.maxminddb_path` 已配置且可读 → MaxMind（查不到时回退占位分配）
//! 2. 否则 → 哈希占位分配

mod maxmind;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::analytics::{CountryLookup, HashCountryLookup};
use crate::config::AnalyticsConfig;

pub use maxmind::MaxMindLookup;

pub struct GeoIpProvider;

impl GeoIpProvider {
    pub fn from_config(config: &AnalyticsConfig) -> Arc<dyn CountryLookup> {
        let lookup: Arc<dyn CountryLookup> = match config.maxminddb_path.as_deref() {
            Some(path) if !path.is_empty() => match MaxMindLookup::open(path) {
                Ok(provider) => {
                    info!("GeoIP: Using MaxMind database at {}", path);
                    Arc::new(provider)
                }
                Err(e) => {
                    warn!(
                        "GeoIP: Failed to load MaxMind database at {}: {}, falling back to placeholder assignment",
                        path, e
                    );
                    Arc::new(HashCountryLookup)
                }
            },
            _ => {
                debug!("GeoIP: No MaxMind database configured");
                Arc::new(HashCountryLookup)
            }
        };

        info!("GeoIP: Initialized with {} provider", lookup.name());
        lookup
    }
}
