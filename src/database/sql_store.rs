use crate::database::Store;
use crate::entities::{drink_entity as drinks, order_entity as orders, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::time;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    Order as SortOrder, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

/// Unique-index markers, most specific first (`username` contains `name`).
const UNIQUE_FIELDS: [&str; 6] = [
    "client_local_id",
    "receipt_number",
    "order_number",
    "username",
    "email",
    "name",
];

fn map_db_err(err: DbErr) -> AppError {
    if let Some(SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
        let field = UNIQUE_FIELDS
            .iter()
            .find(|f| msg.contains(*f))
            .copied()
            .unwrap_or("unique key");
        return AppError::Duplicate(field.to_string());
    }
    AppError::DatabaseError(err)
}

/// sea-orm backed store; works against PostgreSQL and SQLite.
#[derive(Clone)]
pub struct SqlStore {
    pool: DatabaseConnection,
}

impl SqlStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    fn drink_condition(filter: &DrinkFilter) -> Condition {
        let mut cond = Condition::all();
        if let Some(owner_id) = filter.owner_id {
            cond = cond.add(drinks::Column::OwnerId.eq(owner_id));
        }
        if let Some(category) = filter.category {
            cond = cond.add(drinks::Column::Category.eq(category));
        }
        if let Some(active) = filter.active {
            cond = cond.add(drinks::Column::Active.eq(active));
        }
        if let Some(needle) = &filter.name_contains {
            cond = cond.add(
                Expr::expr(Func::lower(Expr::col((drinks::Entity, drinks::Column::Name))))
                    .like(format!("%{}%", needle.to_lowercase())),
            );
        }
        cond
    }

    fn order_condition(filter: &OrderFilter) -> Condition {
        let mut cond = Condition::all();
        if let Some(owner_id) = filter.owner_id {
            cond = cond.add(orders::Column::OwnerId.eq(owner_id));
        }
        if let Some(status) = filter.status {
            cond = cond.add(orders::Column::Status.eq(status));
        }
        if let Some(sync_status) = filter.sync_status {
            cond = cond.add(orders::Column::SyncStatus.eq(sync_status));
        }
        if let Some(from) = filter.created_from {
            cond = cond.add(orders::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.created_to {
            cond = cond.add(orders::Column::CreatedAt.lte(to));
        }
        cond
    }

    fn order_active_model(order: &Order) -> AppResult<orders::ActiveModel> {
        Ok(orders::ActiveModel {
            id: Set(order.id),
            order_number: Set(order.order_number.clone()),
            receipt_number: Set(order.receipt_number.clone()),
            owner_id: Set(order.owner_id),
            customer_name: Set(order.customer_name.clone()),
            customer_email: Set(order.customer_email.clone()),
            items: Set(serde_json::to_value(&order.items)?),
            subtotal: Set(order.subtotal),
            discount: Set(order.discount),
            tax: Set(order.tax),
            total_amount: Set(order.total_amount),
            amount_paid: Set(order.amount_paid),
            balance: Set(order.balance),
            status: Set(order.status),
            payment_method: Set(order.payment_method),
            notes: Set(order.notes.clone()),
            receipt_printed: Set(order.receipt_printed),
            email_sent: Set(order.email_sent),
            client_local_id: Set(order.client_local_id.clone()),
            last_synced_at: Set(order.last_synced_at),
            sync_status: Set(order.sync_status),
            created_at: Set(order.created_at),
            updated_at: Set(order.updated_at),
        })
    }

    fn to_orders(models: Vec<orders::Model>) -> AppResult<Vec<Order>> {
        models.into_iter().map(Order::try_from).collect()
    }
}

#[async_trait]
impl Store for SqlStore {
    fn backend_name(&self) -> &'static str {
        "sql"
    }

    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let now = time::now();
        let model = users::ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role),
            active: Set(user.active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        let model = users::Entity::find_by_id(id).one(&self.pool).await?;
        Ok(model.map(Into::into))
    }

    async fn find_user_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let model = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(login))
                    .add(users::Column::Email.eq(login)),
            )
            .one(&self.pool)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn update_user(&self, user: &User) -> AppResult<User> {
        let model = users::ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(user.role),
            active: Set(user.active),
            created_at: ActiveValue::NotSet,
            updated_at: Set(time::now()),
        }
        .update(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn insert_drink(&self, drink: NewDrink) -> AppResult<Drink> {
        let now = time::now();
        let model = drinks::ActiveModel {
            owner_id: Set(drink.owner_id),
            name: Set(drink.name),
            description: Set(drink.description),
            price: Set(drink.price),
            category: Set(drink.category),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn find_drink(&self, id: i64) -> AppResult<Option<Drink>> {
        let model = drinks::Entity::find_by_id(id).one(&self.pool).await?;
        Ok(model.map(Into::into))
    }

    async fn find_drinks(&self, ids: &[i64]) -> AppResult<Vec<Drink>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = drinks::Entity::find()
            .filter(drinks::Column::Id.is_in(ids.iter().copied()))
            .all(&self.pool)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_drinks(&self, filter: &DrinkFilter) -> AppResult<Vec<Drink>> {
        let models = drinks::Entity::find()
            .filter(Self::drink_condition(filter))
            .order_by_asc(drinks::Column::Name)
            .order_by_asc(drinks::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_drinks(&self, filter: &DrinkFilter) -> AppResult<u64> {
        let count = drinks::Entity::find()
            .filter(Self::drink_condition(filter))
            .count(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update_drink(&self, drink: &Drink) -> AppResult<Drink> {
        let model = drinks::ActiveModel {
            id: Set(drink.id),
            owner_id: Set(drink.owner_id),
            name: Set(drink.name.clone()),
            description: Set(drink.description.clone()),
            price: Set(drink.price),
            category: Set(drink.category),
            active: Set(drink.active),
            created_at: ActiveValue::NotSet,
            updated_at: Set(time::now()),
        }
        .update(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn insert_order(&self, order: NewOrder) -> AppResult<Order> {
        // from_new re-derives the totals
        let order = Order::from_new(0, order)?;
        let mut am = Self::order_active_model(&order)?;
        am.id = ActiveValue::NotSet;
        let model = am.insert(&self.pool).await.map_err(map_db_err)?;
        Order::try_from(model)
    }

    async fn find_order(&self, id: i64) -> AppResult<Option<Order>> {
        orders::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn find_order_by_local_id(
        &self,
        owner_id: i64,
        local_id: &str,
    ) -> AppResult<Option<Order>> {
        orders::Entity::find()
            .filter(orders::Column::OwnerId.eq(owner_id))
            .filter(orders::Column::ClientLocalId.eq(local_id))
            .one(&self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn find_order_by_number(&self, order_number: &str) -> AppResult<Option<Order>> {
        orders::Entity::find()
            .filter(orders::Column::OrderNumber.eq(order_number))
            .one(&self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn list_orders(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Order>, u64)> {
        let base = orders::Entity::find().filter(Self::order_condition(filter));
        let total = base.clone().count(&self.pool).await?;

        let column = match sort.field {
            OrderSortField::CreatedAt => orders::Column::CreatedAt,
            OrderSortField::UpdatedAt => orders::Column::UpdatedAt,
            OrderSortField::TotalAmount => orders::Column::TotalAmount,
            OrderSortField::OrderNumber => orders::Column::OrderNumber,
        };
        let direction = if sort.descending {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };

        let models = base
            .order_by(column, direction.clone())
            .order_by(orders::Column::Id, direction)
            .offset(page.get_offset())
            .limit(page.get_limit())
            .all(&self.pool)
            .await?;

        Ok((Self::to_orders(models)?, total))
    }

    async fn all_orders(&self, filter: &OrderFilter) -> AppResult<Vec<Order>> {
        let models = orders::Entity::find()
            .filter(Self::order_condition(filter))
            .order_by_asc(orders::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Self::to_orders(models)
    }

    async fn count_orders(&self, filter: &OrderFilter) -> AppResult<u64> {
        let count = orders::Entity::find()
            .filter(Self::order_condition(filter))
            .count(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update_order(
        &self,
        order: &Order,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<Order> {
        let mut order = order.clone();
        order.recompute_totals()?;

        let mut am = Self::order_active_model(&order)?;
        am.id = ActiveValue::NotSet;
        // numbers are immutable once assigned
        am.order_number = ActiveValue::NotSet;
        am.receipt_number = ActiveValue::NotSet;
        am.created_at = ActiveValue::NotSet;

        let mut update = orders::Entity::update_many()
            .set(am)
            .filter(orders::Column::Id.eq(order.id));
        if let Some(expected) = expected_updated_at {
            update = update.filter(orders::Column::UpdatedAt.eq(expected));
        }
        let result = update.exec(&self.pool).await.map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return match self.find_order(order.id).await? {
                Some(_) => Err(AppError::Conflict(format!(
                    "Order {} was modified concurrently",
                    order.id
                ))),
                None => Err(AppError::NotFound(format!("Order {} not found", order.id))),
            };
        }

        self.find_order(order.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order.id)))
    }

    async fn delete_order(&self, id: i64) -> AppResult<bool> {
        let result = orders::Entity::delete_by_id(id).exec(&self.pool).await?;
        Ok(result.rows_affected > 0)
    }
}
