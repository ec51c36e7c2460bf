#![allow(dead_code)]

use drinkquick_backend::AppServices;
use drinkquick_backend::config::OrdersConfig;
use drinkquick_backend::database::{MemoryStore, Store};
use drinkquick_backend::entities::{DrinkCategory, UserRole};
use drinkquick_backend::external::MailQueue;
use drinkquick_backend::models::{Drink, NewDrink, NewUser, User};
use drinkquick_backend::utils::JwtService;
use std::sync::Arc;

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub jwt: JwtService,
    pub services: AppServices,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let jwt = JwtService::new("integration-secret", 3600, 86_400);
        let services = AppServices::new(
            store.clone(),
            jwt.clone(),
            MailQueue::disabled(),
            &OrdersConfig::default(),
        );
        Self {
            store,
            jwt,
            services,
        }
    }

    /// Inserts an account directly and returns it with a bearer header value.
    pub async fn user(&self, username: &str, role: UserRole) -> (User, String) {
        let user = self
            .store
            .insert_user(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "unused".to_string(),
                role,
                active: true,
            })
            .await
            .unwrap();
        let token = self
            .jwt
            .generate_access_token(user.id, &user.username, user.role)
            .unwrap();
        (user, format!("Bearer {token}"))
    }

    pub async fn drink(&self, owner: &User, name: &str, price: i64) -> Drink {
        self.store
            .insert_drink(NewDrink {
                owner_id: owner.id,
                name: name.to_string(),
                description: None,
                price,
                category: DrinkCategory::Beer,
            })
            .await
            .unwrap()
    }
}

/// Builds the API behind the auth middleware, as `main` does.
#[macro_export]
macro_rules! init_app {
    ($ctx:expr) => {{
        let services = $ctx.services.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(drinkquick_backend::middlewares::AuthMiddleware::new(
                    $ctx.jwt.clone(),
                ))
                .configure(move |cfg| services.configure(cfg)),
        )
        .await
    }};
}
