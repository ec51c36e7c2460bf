use actix_web::{HttpResponse, Result, web};
use chrono::{DateTime, Utc};
use serde_json::json;
use crate::models::ApiResponse;

#[derive(Debug, Clone)]
pub struct HealthInfo {
    pub backend: &'static str,
    pub started_at: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn health(info: web::Data<HealthInfo>) -> Result<HttpResponse> {
    let now = Utc::now();
    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
        "status": "ok",
        "backend": info.backend,
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSeconds": (now - info.started_at).num_seconds(),
        "time": now,
    }))))
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
