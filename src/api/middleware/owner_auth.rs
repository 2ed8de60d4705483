//! 仪表盘 API 认证
//!
//! 请求须携带 `Authorization: Bearer <auth.public_key>` 与 `X-Owner-Id`。
//! 所有者 id 写入 request extensions，handler 通过 [`OwnerId`] 提取。

use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::{Method, header::CONTENT_TYPE},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{debug, info, trace};

use super::bearer::bearer_matches;
use crate::api::constants::{JSON_CONTENT_TYPE, OWNER_ID_HEADER};
use crate::api::services::dashboard::{ApiResponse, ErrorCode};

const MAX_OWNER_ID_LEN: usize = 128;

/// 已认证请求的所有者
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for OwnerId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<OwnerId>()
                .cloned()
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("missing owner")),
        )
    }
}

#[derive(Clone)]
pub struct OwnerAuth;

impl<S, B> Transform<S, ServiceRequest> for OwnerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = OwnerAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let config = crate::config::get_config();
        ready(Ok(OwnerAuthMiddleware {
            service: Rc::new(service),
            public_key: config.auth.public_key.clone(),
        }))
    }
}

pub struct OwnerAuthMiddleware<S> {
    service: Rc<S>,
    public_key: String,
}

impl<S, B> OwnerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn reject(
        req: ServiceRequest,
        mut builder: actix_web::HttpResponseBuilder,
        code: ErrorCode,
        message: &str,
    ) -> ServiceResponse<EitherBody<B>> {
        req.into_response(
            builder
                .insert_header((CONTENT_TYPE, JSON_CONTENT_TYPE))
                .json(ApiResponse::<()> {
                    code: code as i32,
                    message: message.to_string(),
                    data: None,
                })
                .map_into_right_body(),
        )
    }

    fn extract_owner(req: &ServiceRequest) -> Option<String> {
        req.headers()
            .get(OWNER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty() && s.len() <= MAX_OWNER_ID_LEN)
            .map(String::from)
    }
}

impl<S, B> Service<ServiceRequest> for OwnerAuthMiddleware<S>
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
        let public_key = self.public_key.clone();

        Box::pin(async move {
            if public_key.is_empty() {
                debug!("auth.public_key not configured - dashboard API disabled");
                return Ok(req.into_response(
                    HttpResponse::NotFound()
                        .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                        .body("Not Found")
                        .map_into_right_body(),
                ));
            }

            if req.method() == Method::OPTIONS {
                return Ok(req.into_response(
                    HttpResponse::NoContent().finish().map_into_right_body(),
                ));
            }

            if !bearer_matches(req.headers(), &public_key) {
                info!("Dashboard authentication failed - invalid or missing key");
                return Ok(Self::reject(
                    req,
                    HttpResponse::Unauthorized(),
                    ErrorCode::Unauthorized,
                    "Unauthorized: Invalid or missing key",
                ));
            }

            let Some(owner) = Self::extract_owner(&req) else {
                return Ok(Self::reject(
                    req,
                    HttpResponse::BadRequest(),
                    ErrorCode::MissingOwner,
                    "Missing or invalid X-Owner-Id header",
                ));
            };

            trace!("Dashboard request authenticated for owner {}", owner);
            req.extensions_mut().insert(OwnerId(owner));
            let response = srv.call(req).await?.map_into_left_body();
            Ok(response)
        })
    }
}
