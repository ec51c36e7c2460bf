use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use crate::handlers::current_user;
use crate::models::*;
use crate::services::DrinkService;

#[utoipa::path(
    get,
    path = "/api/drinks",
    tag = "drink",
    params(
        ("category" = Option<String>, Query, description = "Beer, Wine, Cocktail, Soft Drink or Other"),
        ("active" = Option<bool>, Query, description = "Filter on the active flag"),
        ("search" = Option<String>, Query, description = "Case-insensitive name search")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Drinks sorted by name", body = [Drink]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_drinks(
    drink_service: web::Data<DrinkService>,
    req: HttpRequest,
    query: web::Query<DrinkQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match drink_service.list(user, &query).await {
        Ok(drinks) => Ok(HttpResponse::Ok().json(ApiResponse::success(drinks))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/drinks",
    tag = "drink",
    request_body = CreateDrinkRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Drink created", body = Drink),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Name already used in this catalog")
    )
)]
pub async fn create_drink(
    drink_service: web::Data<DrinkService>,
    req: HttpRequest,
    request: web::Json<CreateDrinkRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match drink_service.create(user, request.into_inner()).await {
        Ok(drink) => Ok(HttpResponse::Created().json(ApiResponse::success(drink))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/drinks/{id}",
    tag = "drink",
    params(("id" = i64, Path, description = "Drink id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Drink", body = Drink),
        (status = 403, description = "Not your drink"),
        (status = 404, description = "Drink not found")
    )
)]
pub async fn get_drink(
    drink_service: web::Data<DrinkService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match drink_service.get(user, path.into_inner()).await {
        Ok(drink) => Ok(HttpResponse::Ok().json(ApiResponse::success(drink))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/drinks/{id}",
    tag = "drink",
    params(("id" = i64, Path, description = "Drink id")),
    request_body = UpdateDrinkRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Drink updated", body = Drink),
        (status = 403, description = "Only the owner may change a drink"),
        (status = 404, description = "Drink not found")
    )
)]
pub async fn update_drink(
    drink_service: web::Data<DrinkService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateDrinkRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match drink_service
        .update(user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(drink) => Ok(HttpResponse::Ok().json(ApiResponse::success(drink))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/drinks/{id}",
    tag = "drink",
    params(("id" = i64, Path, description = "Drink id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Drink deactivated", body = Drink),
        (status = 403, description = "Only the owner may change a drink"),
        (status = 404, description = "Drink not found")
    )
)]
pub async fn deactivate_drink(
    drink_service: web::Data<DrinkService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match drink_service.deactivate(user, path.into_inner()).await {
        Ok(drink) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            drink,
            "Drink deactivated",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn drink_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/drinks")
            .route("", web::get().to(get_drinks))
            .route("", web::post().to(create_drink))
            .route("/{id}", web::get().to(get_drink))
            .route("/{id}", web::put().to(update_drink))
            .route("/{id}", web::delete().to(deactivate_drink)),
    );
}
