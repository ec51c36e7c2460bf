use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use crate::handlers::current_user;
use crate::models::*;
use crate::services::SyncService;

#[utoipa::path(
    post,
    path = "/api/orders/sync/bulk",
    tag = "sync",
    request_body = BulkSyncRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every record lands in exactly one of created, updated, conflicts or errors", body = BulkSyncResult)
    )
)]
pub async fn bulk_sync(
    sync_service: web::Data<SyncService>,
    req: HttpRequest,
    request: web::Json<BulkSyncRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match sync_service.bulk_sync(user, request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/orders/sync/pending",
    tag = "sync",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders awaiting client acknowledgement", body = [Order])
    )
)]
pub async fn get_pending(
    sync_service: web::Data<SyncService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match sync_service.pending(user).await {
        Ok(orders) => Ok(HttpResponse::Ok().json(ApiResponse::success(orders))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/orders/sync/mark-synced",
    tag = "sync",
    request_body = MarkSyncedRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Number of orders acknowledged", body = MarkSyncedResponse),
        (status = 400, description = "No order ids")
    )
)]
pub async fn mark_synced(
    sync_service: web::Data<SyncService>,
    req: HttpRequest,
    request: web::Json<MarkSyncedRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match sync_service.mark_synced(user, request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/orders/sync/resolve-conflicts",
    tag = "sync",
    request_body = ResolveConflictsRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Per-resolution outcome", body = ResolveConflictsResult)
    )
)]
pub async fn resolve_conflicts(
    sync_service: web::Data<SyncService>,
    req: HttpRequest,
    request: web::Json<ResolveConflictsRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match sync_service
        .resolve_conflicts(user, request.into_inner())
        .await
    {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Mounted inside the `/orders` scope.
pub fn sync_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sync")
            .route("/bulk", web::post().to(bulk_sync))
            .route("/pending", web::get().to(get_pending))
            .route("/mark-synced", web::post().to(mark_synced))
            .route("/resolve-conflicts", web::post().to(resolve_conflicts)),
    );
}
