use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{trace, warn};

use super::bearer::bearer_matches;
use crate::api::constants::JSON_CONTENT_TYPE;
use crate::api::services::dashboard::{ApiResponse, ErrorCode};

/// 完整健康检查需要 `Bearer <auth.service_key>`
///
/// `/ready` 与 `/live` 供探针使用，不需要认证
#[derive(Clone)]
pub struct HealthAuth;

impl<S, B> Transform<S, ServiceRequest> for HealthAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = HealthAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let config = crate::config::get_config();
        ready(Ok(HealthAuthMiddleware {
            service: Rc::new(service),
            service_key: config.auth.service_key.clone(),
        }))
    }
}

pub struct HealthAuthMiddleware<S> {
    service: Rc<S>,
    service_key: String,
}

fn is_open_health_path(path: &str) -> bool {
    path.ends_with("/ready") || path.ends_with("/live")
}

impl<S, B> Service<ServiceRequest> for HealthAuthMiddleware<S>
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
        let service_key = self.service_key.clone();

        Box::pin(async move {
            if is_open_health_path(req.path()) {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            if service_key.is_empty() {
                warn!("auth.service_key not configured - full health check disabled");
                return Ok(req.into_response(
                    HttpResponse::NotFound()
                        .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                        .body("Not Found")
                        .map_into_right_body(),
                ));
            }

            if !bearer_matches(req.headers(), &service_key) {
                warn!("Health authentication failed - invalid or missing service key");
                return Ok(req.into_response(
                    HttpResponse::Unauthorized()
                        .insert_header((CONTENT_TYPE, JSON_CONTENT_TYPE))
                        .json(ApiResponse::<()> {
                            code: ErrorCode::Unauthorized as i32,
                            message: "Unauthorized: Invalid or missing service key".to_string(),
                            data: None,
                        })
                        .map_into_right_body(),
                ));
            }

            trace!("Health authentication successful");
            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}
