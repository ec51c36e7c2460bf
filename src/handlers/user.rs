use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use crate::handlers::current_user;
use crate::models::*;
use crate::services::UserService;

#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    tag = "user",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateRoleRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_role(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse> {
    let actor = current_user(&req)?;
    match user_service
        .set_role(actor, path.into_inner(), request.role)
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/active",
    tag = "user",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateActiveRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active flag changed", body = UserResponse),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_active(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateActiveRequest>,
) -> Result<HttpResponse> {
    let actor = current_user(&req)?;
    match user_service
        .set_active(actor, path.into_inner(), request.active)
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/{id}/role", web::put().to(update_role))
            .route("/{id}/active", web::put().to(update_active)),
    );
}
