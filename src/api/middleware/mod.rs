mod bearer;
pub mod health;
pub mod owner_auth;
pub mod rate_limit;
pub mod request_id;
pub mod timing;
pub mod tracking_cors;

pub use bearer::{bearer_matches, bearer_token};
pub use health::HealthAuth;
pub use owner_auth::{OwnerAuth, OwnerId};
pub use rate_limit::{TrackingKeyExtractor, TrackingLimiterConfig, tracking_rate_limiter};
pub use request_id::{RequestId, RequestIdMiddleware};
pub use timing::TimingMiddleware;
pub use tracking_cors::{OriginPolicy, TrackingCors};
