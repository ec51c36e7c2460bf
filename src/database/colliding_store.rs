use crate::database::{MemoryStore, Store};
use crate::error::{AppError, AppResult};
use crate::models::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// Memory store whose next `insert_order` fails once with
/// `Duplicate(field)`. Every attempted `(order_number, receipt_number)` pair
/// is recorded.
pub struct CollidingStore {
    inner: Arc<MemoryStore>,
    pending: Mutex<Option<String>>,
    attempts: Mutex<Vec<(String, String)>>,
}

impl CollidingStore {
    pub fn new(inner: Arc<MemoryStore>, field: &str) -> Self {
        Self {
            inner,
            pending: Mutex::new(Some(field.to_string())),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> Vec<(String, String)> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Store for CollidingStore {
    fn backend_name(&self) -> &'static str {
        "colliding"
    }

    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        self.inner.insert_user(user).await
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        self.inner.find_user(id).await
    }

    async fn find_user_by_login(&self, login: &str) -> AppResult<Option<User>> {
        self.inner.find_user_by_login(login).await
    }

    async fn update_user(&self, user: &User) -> AppResult<User> {
        self.inner.update_user(user).await
    }

    async fn insert_drink(&self, drink: NewDrink) -> AppResult<Drink> {
        self.inner.insert_drink(drink).await
    }

    async fn find_drink(&self, id: i64) -> AppResult<Option<Drink>> {
        self.inner.find_drink(id).await
    }

    async fn find_drinks(&self, ids: &[i64]) -> AppResult<Vec<Drink>> {
        self.inner.find_drinks(ids).await
    }

    async fn list_drinks(&self, filter: &DrinkFilter) -> AppResult<Vec<Drink>> {
        self.inner.list_drinks(filter).await
    }

    async fn count_drinks(&self, filter: &DrinkFilter) -> AppResult<u64> {
        self.inner.count_drinks(filter).await
    }

    async fn update_drink(&self, drink: &Drink) -> AppResult<Drink> {
        self.inner.update_drink(drink).await
    }

    async fn insert_order(&self, order: NewOrder) -> AppResult<Order> {
        self.attempts
            .lock()
            .unwrap()
            .push((order.order_number.clone(), order.receipt_number.clone()));
        let collision = self.pending.lock().unwrap().take();
        match collision {
            Some(field) => Err(AppError::Duplicate(field)),
            None => self.inner.insert_order(order).await,
        }
    }

    async fn find_order(&self, id: i64) -> AppResult<Option<Order>> {
        self.inner.find_order(id).await
    }

    async fn find_order_by_local_id(
        &self,
        owner_id: i64,
        local_id: &str,
    ) -> AppResult<Option<Order>> {
        self.inner.find_order_by_local_id(owner_id, local_id).await
    }

    async fn find_order_by_number(&self, order_number: &str) -> AppResult<Option<Order>> {
        self.inner.find_order_by_number(order_number).await
    }

    async fn list_orders(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Order>, u64)> {
        self.inner.list_orders(filter, sort, page).await
    }

    async fn all_orders(&self, filter: &OrderFilter) -> AppResult<Vec<Order>> {
        self.inner.all_orders(filter).await
    }

    async fn count_orders(&self, filter: &OrderFilter) -> AppResult<u64> {
        self.inner.count_orders(filter).await
    }

    async fn update_order(
        &self,
        order: &Order,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<Order> {
        self.inner.update_order(order, expected_updated_at).await
    }

    async fn delete_order(&self, id: i64) -> AppResult<bool> {
        self.inner.delete_order(id).await
    }
}
