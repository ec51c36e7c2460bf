use crate::config::OrdersConfig;
use crate::database::Store;
use crate::error::AppError;
use crate::external::MailQueue;
use crate::handlers::{self, HealthInfo};
use crate::services::*;
use crate::utils::JwtService;
use actix_web::{ResponseError, error, web};
use std::sync::Arc;

/// Everything the HTTP layer needs, built once and cloned into each worker.
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub users: UserService,
    pub drinks: DrinkService,
    pub orders: OrderService,
    pub sync: SyncService,
    pub stats: StatsService,
    pub health: HealthInfo,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn Store>,
        jwt_service: JwtService,
        mail_queue: MailQueue,
        numbering: &OrdersConfig,
    ) -> Self {
        Self {
            auth: AuthService::new(store.clone(), jwt_service, mail_queue.clone()),
            users: UserService::new(store.clone()),
            drinks: DrinkService::new(store.clone()),
            orders: OrderService::new(store.clone(), mail_queue, numbering.clone()),
            sync: SyncService::new(store.clone(), numbering.clone()),
            stats: StatsService::new(store.clone()),
            health: HealthInfo {
                backend: store.backend_name(),
                started_at: chrono::Utc::now(),
            },
        }
    }

    /// Registers app data, extractor error handlers and the `/api` routes.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.users.clone()))
            .app_data(web::Data::new(self.drinks.clone()))
            .app_data(web::Data::new(self.orders.clone()))
            .app_data(web::Data::new(self.sync.clone()))
            .app_data(web::Data::new(self.stats.clone()))
            .app_data(web::Data::new(self.health.clone()))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                let response = AppError::invalid("body", err.to_string()).error_response();
                error::InternalError::from_response(err, response).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                let response = AppError::invalid("query", err.to_string()).error_response();
                error::InternalError::from_response(err, response).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                let response = AppError::invalid("path", err.to_string()).error_response();
                error::InternalError::from_response(err, response).into()
            }))
            .service(
                web::scope("/api")
                    .configure(handlers::health_config)
                    .configure(handlers::auth_config)
                    .configure(handlers::user_config)
                    .configure(handlers::drink_config)
                    .configure(handlers::order_config),
            );
    }
}
