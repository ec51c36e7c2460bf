pub mod drinks;
pub mod orders;
pub mod users;

pub use drinks as drink_entity;
pub use drinks::DrinkCategory;
pub use orders as order_entity;
pub use orders::{OrderStatus, PaymentMethod, SyncStatus};
pub use users as user_entity;
pub use users::UserRole;
