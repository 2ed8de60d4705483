//! `GET /tracker-script` 脚本端点

use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use tracing::error;

use crate::api::constants::SCRIPT_CONTENT_TYPE;
use crate::services::script;

#[derive(Debug, Deserialize)]
pub struct ScriptQuery {
    pub id: Option<String>,
}

pub async fn tracker_script(req: HttpRequest, query: web::Query<ScriptQuery>) -> HttpResponse {
    let config = crate::config::get_config();
    let endpoint = script::resolve_endpoint(&req, config.tracking.public_url.as_deref());

    match script::render(query.id.as_deref(), &endpoint) {
        Ok(body) => HttpResponse::Ok()
            .insert_header((CONTENT_TYPE, SCRIPT_CONTENT_TYPE))
            .insert_header((
                CACHE_CONTROL,
                format!("public, max-age={}", config.tracking.script_max_age),
            ))
            .body(body),
        Err(e) => {
            error!("Failed to render tracker script: {}", e);
            HttpResponse::InternalServerError()
                .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                .body("Server error")
        }
    }
}
