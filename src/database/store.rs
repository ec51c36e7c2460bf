use crate::error::AppResult;
use crate::models::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence gateway for users, drinks and orders.
///
/// Unique-key violations surface as `AppError::Duplicate(field)` with the
/// field names `username`, `email`, `name` (drink name per owner),
/// `order_number`, `receipt_number` and `client_local_id` (per owner).
#[async_trait]
pub trait Store: Send + Sync {
    fn backend_name(&self) -> &'static str;

    // ---- users ----
    async fn insert_user(&self, user: NewUser) -> AppResult<User>;
    async fn find_user(&self, id: i64) -> AppResult<Option<User>>;
    /// Matches either the username or the e-mail address.
    async fn find_user_by_login(&self, login: &str) -> AppResult<Option<User>>;
    async fn update_user(&self, user: &User) -> AppResult<User>;

    // ---- drinks ----
    async fn insert_drink(&self, drink: NewDrink) -> AppResult<Drink>;
    async fn find_drink(&self, id: i64) -> AppResult<Option<Drink>>;
    async fn find_drinks(&self, ids: &[i64]) -> AppResult<Vec<Drink>>;
    /// Sorted by name.
    async fn list_drinks(&self, filter: &DrinkFilter) -> AppResult<Vec<Drink>>;
    async fn count_drinks(&self, filter: &DrinkFilter) -> AppResult<u64>;
    async fn update_drink(&self, drink: &Drink) -> AppResult<Drink>;

    // ---- orders ----
    /// Totals are re-derived from the items before the row is written.
    async fn insert_order(&self, order: NewOrder) -> AppResult<Order>;
    async fn find_order(&self, id: i64) -> AppResult<Option<Order>>;
    /// Client local ids are only unique within one owner's orders.
    async fn find_order_by_local_id(
        &self,
        owner_id: i64,
        local_id: &str,
    ) -> AppResult<Option<Order>>;
    async fn find_order_by_number(&self, order_number: &str) -> AppResult<Option<Order>>;
    async fn list_orders(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Order>, u64)>;
    async fn all_orders(&self, filter: &OrderFilter) -> AppResult<Vec<Order>>;
    async fn count_orders(&self, filter: &OrderFilter) -> AppResult<u64>;
    /// Writes every mutable column of `order` (totals re-derived). With
    /// `expected_updated_at` the write only applies if the stored row still
    /// carries that timestamp, else `AppError::Conflict`.
    async fn update_order(
        &self,
        order: &Order,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<Order>;
    /// Hard delete. Returns whether a row was removed.
    async fn delete_order(&self, id: i64) -> AppResult<bool>;
}
