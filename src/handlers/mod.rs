pub mod auth;
pub mod drink;
pub mod health;
pub mod order;
pub mod sync;
pub mod user;

pub use auth::auth_config;
pub use drink::drink_config;
pub use health::{HealthInfo, health_config};
pub use order::order_config;
pub use user::user_config;

use crate::error::{AppError, AppResult};
use crate::models::CurrentUser;
use actix_web::{HttpMessage, HttpRequest};

/// Identity placed in the request extensions by `AuthMiddleware`.
pub(crate) fn current_user(req: &HttpRequest) -> AppResult<CurrentUser> {
    req.extensions()
        .get::<CurrentUser>()
        .copied()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}
