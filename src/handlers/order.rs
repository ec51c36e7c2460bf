use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use crate::handlers::{current_user, sync};
use crate::models::*;
use crate::services::{OrderService, StatsService};

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "order",
    request_body = CreateOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, description = "Invalid input or insufficient payment"),
        (status = 404, description = "Drink not found")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match order_service.create(user, request.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Created().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "order",
    params(
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("limit" = Option<u64>, Query, description = "Page size, 1 to 100"),
        ("status" = Option<String>, Query, description = "pending, completed, cancelled or refunded"),
        ("startDate" = Option<String>, Query, description = "YYYY-MM-DD or RFC 3339, inclusive"),
        ("endDate" = Option<String>, Query, description = "YYYY-MM-DD or RFC 3339, inclusive"),
        ("sort" = Option<String>, Query, description = "createdAt, updatedAt, totalAmount or orderNumber; '-' prefix for descending")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Page of orders with revenue stats for the whole filter"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match order_service.list(user, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/orders/stats",
    tag = "order",
    params(
        ("tzOffset" = Option<i32>, Query, description = "Caller's UTC offset in minutes"),
        ("top" = Option<usize>, Query, description = "Number of top drinks")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order statistics", body = OrderStats)
    )
)]
pub async fn get_stats(
    stats_service: web::Data<StatsService>,
    req: HttpRequest,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match stats_service.stats(user, &query).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(stats))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/orders/dashboard/summary",
    tag = "order",
    params(
        ("tzOffset" = Option<i32>, Query, description = "Caller's UTC offset in minutes"),
        ("top" = Option<usize>, Query, description = "Number of top drinks")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardSummary)
    )
)]
pub async fn get_dashboard_summary(
    stats_service: web::Data<StatsService>,
    req: HttpRequest,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match stats_service.dashboard_summary(user, &query).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(summary))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 403, description = "Not your order"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match order_service.get(user, path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 400, description = "Unknown or immutable field"),
        (status = 403, description = "Not allowed to change this order or field"),
        (status = 409, description = "Order changed concurrently")
    )
)]
pub async fn update_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match order_service
        .update(user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order permanently deleted"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn purge_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    match order_service.purge(user, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Order deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    // fixed segments go before /{id}
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(get_orders))
            .route("/stats", web::get().to(get_stats))
            .route("/dashboard/summary", web::get().to(get_dashboard_summary))
            .configure(sync::sync_config)
            .route("/{id}", web::get().to(get_order))
            .route("/{id}", web::put().to(update_order))
            .route("/{id}", web::delete().to(purge_order)),
    );
}
