use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{DrinkCategory, OrderStatus, PaymentMethod, SyncStatus, UserRole};
use crate::error::FieldError;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::user::update_role,
        handlers::user::update_active,
        handlers::drink::get_drinks,
        handlers::drink::create_drink,
        handlers::drink::get_drink,
        handlers::drink::update_drink,
        handlers::drink::deactivate_drink,
        handlers::order::create_order,
        handlers::order::get_orders,
        handlers::order::get_stats,
        handlers::order::get_dashboard_summary,
        handlers::order::get_order,
        handlers::order::update_order,
        handlers::order::purge_order,
        handlers::sync::bulk_sync,
        handlers::sync::get_pending,
        handlers::sync::mark_synced,
        handlers::sync::resolve_conflicts,
        handlers::health::health,
    ),
    components(
        schemas(
            FieldError,
            UserRole,
            DrinkCategory,
            OrderStatus,
            PaymentMethod,
            SyncStatus,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            UpdateRoleRequest,
            UpdateActiveRequest,
            UserResponse,
            AuthResponse,
            Drink,
            CreateDrinkRequest,
            UpdateDrinkRequest,
            OrderItem,
            Order,
            OrderLineRequest,
            CreateOrderRequest,
            UpdateOrderRequest,
            StatsBucket,
            StatusCount,
            PaymentMethodCount,
            TopDrink,
            OrderStats,
            DashboardSummary,
            SyncOrderItem,
            SyncOrderRecord,
            BulkSyncRequest,
            SyncedOrder,
            SyncConflict,
            SyncError,
            BulkSyncResult,
            MarkSyncedRequest,
            MarkSyncedResponse,
            Resolution,
            ResolutionData,
            ConflictResolution,
            ResolveConflictsRequest,
            ResolvedConflict,
            ResolutionError,
            ResolveConflictsResult,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and tokens"),
        (name = "user", description = "Account administration"),
        (name = "drink", description = "Drink catalog"),
        (name = "order", description = "Orders and statistics"),
        (name = "sync", description = "Offline order synchronisation"),
        (name = "health", description = "Liveness"),
    ),
    info(
        title = "DrinkQuick Backend API",
        version = "1.0.0",
        description = "Point-of-sale REST API: catalog, orders, offline sync and reporting"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
