pub mod auth_service;
pub mod drink_service;
pub mod order_service;
pub mod pricing;
pub mod stats_service;
pub mod sync_service;
pub mod user_service;

pub use auth_service::*;
pub use drink_service::*;
pub use order_service::OrderService;
pub use stats_service::StatsService;
pub use sync_service::*;
pub use user_service::*;
