//! 追踪端点的 CORS
//!
//! 脚本嵌在任意第三方页面上，因此 `/track` 与 `/tracker-script` 的每个响应都带 CORS 头。
//! 预检请求在这里直接返回 200，不会进入 handler。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{
        Method,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, HeaderMap, HeaderValue, ORIGIN,
            VARY,
        },
    },
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::trace;

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";
const PREFLIGHT_MAX_AGE: u32 = 86400;

/// 允许的来源；空列表或包含 `*` 表示任意来源
#[derive(Clone, Debug, Default)]
pub struct OriginPolicy {
    origins: Vec<String>,
}

impl OriginPolicy {
    pub fn new(origins: &[String]) -> Self {
        let origins = origins
            .iter()
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();
        Self { origins }
    }

    pub fn allows_any(&self) -> bool {
        self.origins.is_empty() || self.origins.iter().any(|o| o == "*")
    }

    /// 响应的 Allow-Origin 值，来源不在白名单时返回 None
    pub fn allow_origin(&self, request_origin: Option<&str>) -> Option<String> {
        if self.allows_any() {
            return Some("*".to_string());
        }
        let origin = request_origin?.trim_end_matches('/');
        self.origins
            .iter()
            .any(|o| o.eq_ignore_ascii_case(origin))
            .then(|| origin.to_string())
    }

    fn apply(&self, request_origin: Option<&str>, headers: &mut HeaderMap) {
        if let Some(value) = self
            .allow_origin(request_origin)
            .and_then(|o| HeaderValue::from_str(&o).ok())
        {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        if !self.allows_any() {
            headers.insert(VARY, HeaderValue::from_static("Origin"));
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(PREFLIGHT_MAX_AGE));
    }
}

#[derive(Clone)]
pub struct TrackingCors {
    policy: Arc<OriginPolicy>,
}

impl TrackingCors {
    pub fn new(policy: OriginPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    pub fn from_config() -> Self {
        let config = crate::config::get_config();
        Self::new(OriginPolicy::new(&config.tracking.allowed_origins))
    }
}

impl<S, B> Transform<S, ServiceRequest> for TrackingCors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = TrackingCorsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TrackingCorsMiddleware {
            service: Rc::new(service),
            policy: self.policy.clone(),
        }))
    }
}

pub struct TrackingCorsMiddleware<S> {
    service: Rc<S>,
    policy: Arc<OriginPolicy>,
}

impl<S, B> Service<ServiceRequest> for TrackingCorsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let policy = self.policy.clone();
        let origin = req
            .headers()
            .get(ORIGIN)
            .and_then(|h| h.to_str().ok())
            .map(String::from);

        Box::pin(async move {
            if req.method() == Method::OPTIONS {
                trace!("Answering tracking preflight for {}", req.path());
                let mut response = req.into_response(HttpResponse::Ok().finish());
                policy.apply(origin.as_deref(), response.headers_mut());
                return Ok(response.map_into_right_body());
            }

            let mut response = srv.call(req).await?;
            policy.apply(origin.as_deref(), response.headers_mut());
            Ok(response.map_into_left_body())
        })
    }
}
