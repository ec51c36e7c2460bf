use crate::database::Store;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::time;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    drinks: BTreeMap<i64, Drink>,
    orders: BTreeMap<i64, Order>,
    next_user_id: i64,
    next_drink_id: i64,
    next_order_id: i64,
}

impl MemoryState {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn check_user_unique(&self, username: &str, email: &str, except: Option<i64>) -> AppResult<()> {
        for user in self.users.values().filter(|u| Some(u.id) != except) {
            if user.username == username {
                return Err(AppError::Duplicate("username".into()));
            }
            if user.email == email {
                return Err(AppError::Duplicate("email".into()));
            }
        }
        Ok(())
    }

    fn check_drink_unique(&self, owner_id: i64, name: &str, except: Option<i64>) -> AppResult<()> {
        let taken = self
            .drinks
            .values()
            .any(|d| Some(d.id) != except && d.owner_id == owner_id && d.name == name);
        if taken {
            return Err(AppError::Duplicate("name".into()));
        }
        Ok(())
    }

    fn check_order_unique(&self, order: &Order) -> AppResult<()> {
        for other in self.orders.values().filter(|o| o.id != order.id) {
            if let Some(local_id) = &order.client_local_id
                && other.owner_id == order.owner_id
                && other.client_local_id.as_ref() == Some(local_id)
            {
                return Err(AppError::Duplicate("client_local_id".into()));
            }
            if other.receipt_number == order.receipt_number {
                return Err(AppError::Duplicate("receipt_number".into()));
            }
            if other.order_number == order.order_number {
                return Err(AppError::Duplicate("order_number".into()));
            }
        }
        Ok(())
    }
}

fn compare_orders(a: &Order, b: &Order, sort: OrderSort) -> Ordering {
    let primary = match sort.field {
        OrderSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        OrderSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        OrderSortField::TotalAmount => a.total_amount.cmp(&b.total_amount),
        OrderSortField::OrderNumber => a.order_number.cmp(&b.order_number),
    };
    let ord = primary.then(a.id.cmp(&b.id));
    if sort.descending { ord.reverse() } else { ord }
}

/// Process-local store used for tests and `database.backend = "memory"`.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        state.check_user_unique(&user.username, &user.email, None)?;
        let now = time::now();
        let id = MemoryState::next_id(&mut state.next_user_id);
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            active: user.active,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username == login || u.email == login)
            .cloned())
    }

    async fn update_user(&self, user: &User) -> AppResult<User> {
        let mut state = self.state.write().await;
        state.check_user_unique(&user.username, &user.email, Some(user.id))?;
        let stored = state
            .users
            .get_mut(&user.id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;
        let created_at = stored.created_at;
        *stored = User {
            created_at,
            updated_at: time::now(),
            ..user.clone()
        };
        Ok(stored.clone())
    }

    async fn insert_drink(&self, drink: NewDrink) -> AppResult<Drink> {
        let mut state = self.state.write().await;
        state.check_drink_unique(drink.owner_id, &drink.name, None)?;
        let now = time::now();
        let id = MemoryState::next_id(&mut state.next_drink_id);
        let drink = Drink {
            id,
            owner_id: drink.owner_id,
            name: drink.name,
            description: drink.description,
            price: drink.price,
            category: drink.category,
            active: true,
            created_at: now,
            updated_at: now,
        };
        state.drinks.insert(id, drink.clone());
        Ok(drink)
    }

    async fn find_drink(&self, id: i64) -> AppResult<Option<Drink>> {
        Ok(self.state.read().await.drinks.get(&id).cloned())
    }

    async fn find_drinks(&self, ids: &[i64]) -> AppResult<Vec<Drink>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.drinks.get(id))
            .cloned()
            .collect())
    }

    async fn list_drinks(&self, filter: &DrinkFilter) -> AppResult<Vec<Drink>> {
        let state = self.state.read().await;
        let mut drinks: Vec<Drink> = state
            .drinks
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        drinks.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(drinks)
    }

    async fn count_drinks(&self, filter: &DrinkFilter) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state.drinks.values().filter(|d| filter.matches(d)).count() as u64)
    }

    async fn update_drink(&self, drink: &Drink) -> AppResult<Drink> {
        let mut state = self.state.write().await;
        state.check_drink_unique(drink.owner_id, &drink.name, Some(drink.id))?;
        let stored = state
            .drinks
            .get_mut(&drink.id)
            .ok_or_else(|| AppError::NotFound(format!("Drink {} not found", drink.id)))?;
        let created_at = stored.created_at;
        *stored = Drink {
            created_at,
            updated_at: time::now(),
            ..drink.clone()
        };
        Ok(stored.clone())
    }

    async fn insert_order(&self, order: NewOrder) -> AppResult<Order> {
        let mut state = self.state.write().await;
        // id 0 never collides with a stored order during the uniqueness scan
        let mut order = Order::from_new(0, order)?;
        state.check_order_unique(&order)?;
        order.id = MemoryState::next_id(&mut state.next_order_id);
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_order(&self, id: i64) -> AppResult<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn find_order_by_local_id(
        &self,
        owner_id: i64,
        local_id: &str,
    ) -> AppResult<Option<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .values()
            .find(|o| o.owner_id == owner_id && o.client_local_id.as_deref() == Some(local_id))
            .cloned())
    }

    async fn find_order_by_number(&self, order_number: &str) -> AppResult<Option<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .values()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn list_orders(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Order>, u64)> {
        let state = self.state.read().await;
        let mut orders: Vec<&Order> = state.orders.values().filter(|o| filter.matches(o)).collect();
        orders.sort_by(|a, b| compare_orders(a, b, sort));
        let total = orders.len() as u64;
        let page_items = orders
            .into_iter()
            .skip(page.get_offset() as usize)
            .take(page.get_limit() as usize)
            .cloned()
            .collect();
        Ok((page_items, total))
    }

    async fn all_orders(&self, filter: &OrderFilter) -> AppResult<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(orders)
    }

    async fn count_orders(&self, filter: &OrderFilter) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state.orders.values().filter(|o| filter.matches(o)).count() as u64)
    }

    async fn update_order(
        &self,
        order: &Order,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<Order> {
        let mut state = self.state.write().await;
        let stored = state
            .orders
            .get(&order.id)
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order.id)))?;
        if let Some(expected) = expected_updated_at
            && stored.updated_at != expected
        {
            return Err(AppError::Conflict(format!(
                "Order {} was modified concurrently",
                order.id
            )));
        }

        let mut next = order.clone();
        next.order_number = stored.order_number.clone();
        next.receipt_number = stored.receipt_number.clone();
        next.created_at = stored.created_at;
        next.recompute_totals()?;
        state.check_order_unique(&next)?;
        state.orders.insert(next.id, next.clone());
        Ok(next)
    }

    async fn delete_order(&self, id: i64) -> AppResult<bool> {
        Ok(self.state.write().await.orders.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DrinkCategory, OrderStatus, PaymentMethod, SyncStatus, UserRole};
    use chrono::Duration;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "hash".to_string(),
            role: UserRole::Staff,
            active: true,
        }
    }

    fn new_order(owner_id: i64, number: &str, local_id: Option<&str>) -> NewOrder {
        let now = time::now();
        NewOrder {
            order_number: format!("ORD-{number}"),
            receipt_number: format!("RCP-{number}"),
            owner_id,
            customer_name: None,
            customer_email: None,
            items: vec![OrderItem::new(1, "Pilsner", 2, 800).unwrap()],
            discount: 0,
            tax: 0,
            amount_paid: 2000,
            status: OrderStatus::Completed,
            payment_method: PaymentMethod::Cash,
            notes: None,
            receipt_printed: false,
            email_sent: false,
            client_local_id: local_id.map(str::to_string),
            last_synced_at: None,
            sync_status: SyncStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn users_are_unique_by_username_and_email() {
        let store = MemoryStore::new();
        store.insert_user(new_user("ana")).await.unwrap();

        let err = store.insert_user(new_user("ana")).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(ref f) if f == "username"));

        let mut other = new_user("bob");
        other.email = "ana@example.com".into();
        let err = store.insert_user(other).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(ref f) if f == "email"));

        let found = store.find_user_by_login("ana@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.username), Some("ana".to_string()));
    }

    #[tokio::test]
    async fn drink_names_are_unique_per_owner() {
        let store = MemoryStore::new();
        let drink = |owner_id| NewDrink {
            owner_id,
            name: "Pilsner".into(),
            description: None,
            price: 800,
            category: DrinkCategory::Beer,
        };
        store.insert_drink(drink(1)).await.unwrap();
        store.insert_drink(drink(2)).await.unwrap();
        let err = store.insert_drink(drink(1)).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(ref f) if f == "name"));
    }

    #[tokio::test]
    async fn insert_order_derives_totals_and_rejects_duplicates() {
        let store = MemoryStore::new();
        let order = store
            .insert_order(new_order(1, "0001", Some("local-1")))
            .await
            .unwrap();
        assert_eq!(order.id, 1);
        assert_eq!(order.total_amount, 1600);
        assert_eq!(order.balance, 400);

        let err = store
            .insert_order(new_order(1, "0002", Some("local-1")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate(ref f) if f == "client_local_id"));

        let err = store.insert_order(new_order(1, "0001", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(ref f) if f == "receipt_number"));
    }

    #[tokio::test]
    async fn local_ids_are_scoped_to_their_owner() {
        let store = MemoryStore::new();
        let mine = store
            .insert_order(new_order(1, "0001", Some("till-1")))
            .await
            .unwrap();
        let theirs = store
            .insert_order(new_order(2, "0002", Some("till-1")))
            .await
            .unwrap();

        let found = store.find_order_by_local_id(1, "till-1").await.unwrap();
        assert_eq!(found.map(|o| o.id), Some(mine.id));
        let found = store.find_order_by_local_id(2, "till-1").await.unwrap();
        assert_eq!(found.map(|o| o.id), Some(theirs.id));
        assert!(store.find_order_by_local_id(3, "till-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_order_honours_expected_timestamp() {
        let store = MemoryStore::new();
        let order = store.insert_order(new_order(1, "0001", None)).await.unwrap();

        let mut changed = order.clone();
        changed.notes = Some("first".into());
        changed.updated_at = order.updated_at + Duration::seconds(1);
        let saved = store
            .update_order(&changed, Some(order.updated_at))
            .await
            .unwrap();
        assert_eq!(saved.notes.as_deref(), Some("first"));

        // stale expectation
        let mut late = order.clone();
        late.notes = Some("second".into());
        let err = store
            .update_order(&late, Some(order.updated_at))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let stored = store.find_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.notes.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn order_numbers_survive_updates() {
        let store = MemoryStore::new();
        let order = store.insert_order(new_order(1, "0001", None)).await.unwrap();
        let mut tampered = order.clone();
        tampered.order_number = "ORD-9999".into();
        let saved = store.update_order(&tampered, None).await.unwrap();
        assert_eq!(saved.order_number, order.order_number);
    }

    #[tokio::test]
    async fn list_orders_filters_sorts_and_pages() {
        let store = MemoryStore::new();
        for n in 1..=5 {
            store
                .insert_order(new_order(if n % 2 == 0 { 2 } else { 1 }, &format!("{n:04}"), None))
                .await
                .unwrap();
        }

        let (page, total) = store
            .list_orders(
                &OrderFilter::for_owner(1),
                OrderSort::default(),
                &PaginationParams::new(Some(1), Some(2)),
            )
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        assert!(page.iter().all(|o| o.owner_id == 1));
        // newest first, id breaks ties
        assert_eq!(page[0].id, 5);
        assert_eq!(page[1].id, 3);

        let sort: OrderSort = "orderNumber".parse().unwrap();
        let (page, _) = store
            .list_orders(&OrderFilter::default(), sort, &PaginationParams::new(Some(2), Some(2)))
            .await
            .unwrap();
        assert_eq!(page[0].order_number, "ORD-0003");
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = MemoryStore::new();
        let order = store.insert_order(new_order(1, "0001", None)).await.unwrap();
        assert!(store.delete_order(order.id).await.unwrap());
        assert!(!store.delete_order(order.id).await.unwrap());
    }
}
