//! 上报端点的可选限流（单实例，默认关闭）

use actix_governor::{
    GovernorConfig, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError,
};
use actix_web::dev::ServiceRequest;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::TrackingConfig;
use crate::utils::ip::rate_limit_key;

/// 以客户端地址为键；转发头只在连接来自可信代理时使用
#[derive(Clone, Debug, Default)]
pub struct TrackingKeyExtractor {
    trusted_proxies: Arc<[String]>,
}

impl TrackingKeyExtractor {
    pub fn new(trusted_proxies: &[String]) -> Self {
        Self {
            trusted_proxies: trusted_proxies.into(),
        }
    }
}

impl KeyExtractor for TrackingKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        rate_limit_key(req.request(), &self.trusted_proxies)
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to determine client address"))
    }
}

pub type TrackingLimiterConfig = GovernorConfig<TrackingKeyExtractor, NoOpMiddleware>;

/// 构建限流配置，未启用时返回 None
pub fn tracking_rate_limiter(tracking: &TrackingConfig) -> Option<TrackingLimiterConfig> {
    let config = &tracking.rate_limit;
    if !config.enabled {
        return None;
    }

    let seconds = config.seconds_per_request.max(1);
    let burst = config.burst_size.max(1);
    let limiter = GovernorConfigBuilder::default()
        .seconds_per_request(seconds)
        .burst_size(burst)
        .key_extractor(TrackingKeyExtractor::new(&tracking.trusted_proxies))
        .finish();

    match limiter {
        Some(limiter) => {
            debug!(
                "Tracking rate limiter created: 1 req/{}s, burst {}",
                seconds, burst
            );
            Some(limiter)
        }
        None => {
            warn!("Invalid tracking rate limit settings, rate limiting disabled");
            None
        }
    }
}
