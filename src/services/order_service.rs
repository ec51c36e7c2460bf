use crate::config::OrdersConfig;
use crate::database::Store;
use crate::entities::{SyncStatus, UserRole};
use crate::error::{AppError, AppResult};
use crate::external::{MailJob, MailKind, MailQueue};
use crate::models::*;
use crate::services::pricing::{self, Catalog};
use crate::services::stats_service;
use crate::utils::{generate_order_number, generate_receipt_number, time, validate_email};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

/// Inserts an order built by `build`. The receipt number is always
/// generated here; the order number is generated unless the client already
/// chose one. A collision on a generated number regenerates once, while a
/// collision on the client's own order number is returned as is.
pub(crate) async fn insert_with_fresh_numbers(
    store: &dyn Store,
    numbering: &OrdersConfig,
    at: DateTime<Utc>,
    client_number: Option<&str>,
    build: impl Fn(String, String) -> NewOrder,
) -> AppResult<Order> {
    let mut retried = false;
    loop {
        let order_number = match client_number {
            Some(number) => number.to_string(),
            None => generate_order_number(&numbering.order_number_prefix, at),
        };
        let new_order = build(
            order_number,
            generate_receipt_number(&numbering.receipt_number_prefix, at),
        );
        match store.insert_order(new_order).await {
            Err(AppError::Duplicate(field))
                if !retried
                    && (field == "receipt_number"
                        || (field == "order_number" && client_number.is_none())) =>
            {
                log::warn!("Generated {field} collided, regenerating");
                retried = true;
            }
            other => return other,
        }
    }
}

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
    mail_queue: MailQueue,
    numbering: OrdersConfig,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>, mail_queue: MailQueue, numbering: OrdersConfig) -> Self {
        Self {
            store,
            mail_queue,
            numbering,
        }
    }

    async fn load_visible(&self, user: CurrentUser, id: i64) -> AppResult<Order> {
        let order = self
            .store
            .find_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))?;
        if !user.can_access(order.owner_id) {
            return Err(AppError::Forbidden(
                "You do not have access to this order".to_string(),
            ));
        }
        Ok(order)
    }

    pub async fn create(&self, user: CurrentUser, request: CreateOrderRequest) -> AppResult<Order> {
        if let Some(email) = &request.customer_email {
            validate_email("customerEmail", email)?;
        }

        let owner = self
            .store
            .find_user(user.id)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        let drink_ids: Vec<i64> = request.items.iter().map(|l| l.drink).collect();
        let drinks = self.store.find_drinks(&drink_ids).await?;
        let catalog = Catalog::new(owner.id, &drinks);
        let (items, _) = pricing::assemble(
            &request.items,
            &catalog,
            request.discount,
            request.tax,
            request.amount_paid,
        )?;

        let now = time::now();
        let customer_name = request.customer_name.or_else(|| Some(owner.username.clone()));
        let customer_email = request.customer_email.or_else(|| Some(owner.email.clone()));

        let order = insert_with_fresh_numbers(self.store.as_ref(), &self.numbering, now, None, |order_number, receipt_number| NewOrder {
            order_number,
            receipt_number,
            owner_id: owner.id,
            customer_name: customer_name.clone(),
            customer_email: customer_email.clone(),
            items: items.clone(),
            discount: request.discount,
            tax: request.tax,
            amount_paid: request.amount_paid,
            status: request.status.unwrap_or_default(),
            payment_method: request.payment_method.unwrap_or_default(),
            notes: request.notes.clone(),
            receipt_printed: false,
            email_sent: false,
            client_local_id: None,
            last_synced_at: None,
            sync_status: SyncStatus::Pending,
            created_at: now,
            updated_at: now,
        })
        .await?;

        log::info!(
            "Order created: {} (owner {}, total {})",
            order.order_number,
            order.owner_id,
            order.total_amount
        );
        self.queue_receipt(&order);
        Ok(order)
    }

    fn queue_receipt(&self, order: &Order) {
        let Some(to) = order.customer_email.clone() else {
            return;
        };
        self.mail_queue.submit(MailJob {
            to,
            kind: MailKind::OrderReceipt,
            payload: json!({
                "orderNumber": order.order_number,
                "receiptNumber": order.receipt_number,
                "customerName": order.customer_name,
                "items": order.items,
                "subtotal": order.subtotal,
                "discount": order.discount,
                "tax": order.tax,
                "totalAmount": order.total_amount,
                "amountPaid": order.amount_paid,
                "balance": order.balance,
                "createdAt": order.created_at,
            }),
        });
    }

    pub async fn get(&self, user: CurrentUser, id: i64) -> AppResult<Order> {
        self.load_visible(user, id).await
    }

    pub async fn list(&self, user: CurrentUser, query: &OrderQuery) -> AppResult<OrderListResponse> {
        let filter = OrderFilter {
            owner_id: (!user.is_admin()).then_some(user.id),
            status: query.status,
            sync_status: None,
            created_from: query
                .start_date
                .as_deref()
                .map(|raw| time::parse_date_bound("startDate", raw, false))
                .transpose()?,
            created_to: query
                .end_date
                .as_deref()
                .map(|raw| time::parse_date_bound("endDate", raw, true))
                .transpose()?,
        };
        let sort = match query.sort.as_deref() {
            Some(raw) => raw.parse()?,
            None => OrderSort::default(),
        };
        let params = PaginationParams::new(query.page, query.limit);

        let (orders, total) = self.store.list_orders(&filter, sort, &params).await?;
        let matching = self.store.all_orders(&filter).await?;

        Ok(OrderListResponse {
            orders: PaginatedResponse::new(orders, &params, total),
            stats: stats_service::bucket(&matching),
        })
    }

    /// Field patch. `status`, `notes` and `receiptPrinted` are open to the
    /// owner; the remaining fields need a management role.
    pub async fn update(
        &self,
        user: CurrentUser,
        id: i64,
        patch: UpdateOrderRequest,
    ) -> AppResult<Order> {
        if patch.is_empty() {
            return Err(AppError::invalid("body", "no updatable fields supplied"));
        }
        let existing = self.load_visible(user, id).await?;
        if patch.touches_privileged_fields() && !user.role.is_management() {
            return Err(AppError::Forbidden(format!(
                "Role {} may only change status, notes and receiptPrinted",
                user.role
            )));
        }
        if let Some(email) = &patch.customer_email {
            validate_email("customerEmail", email)?;
        }

        let mut order = existing.clone();
        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(notes) = patch.notes {
            order.notes = Some(notes);
        }
        if let Some(printed) = patch.receipt_printed {
            order.receipt_printed = printed;
        }
        if let Some(name) = patch.customer_name {
            order.customer_name = Some(name);
        }
        if let Some(email) = patch.customer_email {
            order.customer_email = Some(email);
        }
        if let Some(method) = patch.payment_method {
            order.payment_method = method;
        }
        if let Some(sent) = patch.email_sent {
            order.email_sent = sent;
        }
        order.sync_status = SyncStatus::Pending;
        order.updated_at = time::now();

        let saved = self
            .store
            .update_order(&order, Some(existing.updated_at))
            .await?;
        log::info!("Order {} updated by user {}", saved.order_number, user.id);
        Ok(saved)
    }

    /// Hard delete, Administrators only.
    pub async fn purge(&self, user: CurrentUser, id: i64) -> AppResult<()> {
        if user.role != UserRole::Administrator {
            return Err(AppError::Forbidden(
                "Only administrators may delete orders".to_string(),
            ));
        }
        if !self.store.delete_order(id).await? {
            return Err(AppError::NotFound(format!("Order {id} not found")));
        }
        log::warn!("Order {id} purged by administrator {}", user.id);
        Ok(())
    }
}
