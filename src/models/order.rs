use crate::entities::{OrderStatus, PaymentMethod, SyncStatus, order_entity};
use crate::error::{AppError, AppResult};
use crate::models::{PaginatedResponse, StatsBucket};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Frozen snapshot of one ordered drink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub drink_id: i64,
    pub drink_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub line_total: i64,
}

fn out_of_range(field: &str) -> AppError {
    AppError::invalid(field, "amount is out of range")
}

/// `unit_price * quantity`, rejected when it does not fit in cents.
fn line_total(unit_price: i64, quantity: i64) -> AppResult<i64> {
    unit_price
        .checked_mul(quantity)
        .ok_or_else(|| out_of_range("items"))
}

impl OrderItem {
    pub fn new(
        drink_id: i64,
        drink_name: impl Into<String>,
        quantity: i64,
        unit_price: i64,
    ) -> AppResult<Self> {
        Ok(Self {
            drink_id,
            drink_name: drink_name.into(),
            quantity,
            unit_price,
            line_total: line_total(unit_price, quantity)?,
        })
    }
}

/// Amounts derived from the item snapshot and the payment inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: i64,
    pub total_amount: i64,
    pub balance: i64,
}

impl Totals {
    pub fn derive(items: &[OrderItem], discount: i64, tax: i64, amount_paid: i64) -> AppResult<Self> {
        let mut subtotal: i64 = 0;
        for item in items {
            subtotal = subtotal
                .checked_add(line_total(item.unit_price, item.quantity)?)
                .ok_or_else(|| out_of_range("items"))?;
        }
        let total_amount = subtotal
            .checked_sub(discount)
            .and_then(|t| t.checked_add(tax))
            .ok_or_else(|| out_of_range("totalAmount"))?;
        let balance = amount_paid
            .checked_sub(total_amount)
            .ok_or_else(|| out_of_range("amountPaid"))?;
        Ok(Self {
            subtotal,
            total_amount,
            balance,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub receipt_number: String,
    pub owner_id: i64,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<OrderItem>,
    pub subtotal: i64,
    pub discount: i64,
    pub tax: i64,
    pub total_amount: i64,
    pub amount_paid: i64,
    pub balance: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub receipt_printed: bool,
    pub email_sent: bool,
    pub client_local_id: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn from_new(id: i64, new: NewOrder) -> AppResult<Self> {
        let mut order = Self {
            id,
            order_number: new.order_number,
            receipt_number: new.receipt_number,
            owner_id: new.owner_id,
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            items: new.items,
            subtotal: 0,
            discount: new.discount,
            tax: new.tax,
            total_amount: 0,
            amount_paid: new.amount_paid,
            balance: 0,
            status: new.status,
            payment_method: new.payment_method,
            notes: new.notes,
            receipt_printed: new.receipt_printed,
            email_sent: new.email_sent,
            client_local_id: new.client_local_id,
            last_synced_at: new.last_synced_at,
            sync_status: new.sync_status,
            created_at: new.created_at,
            updated_at: new.updated_at,
        };
        order.recompute_totals()?;
        Ok(order)
    }

    /// Re-derives line totals, subtotal, total and balance. Client-supplied
    /// amounts are never trusted.
    pub fn recompute_totals(&mut self) -> AppResult<()> {
        for item in &mut self.items {
            item.line_total = line_total(item.unit_price, item.quantity)?;
        }
        let totals = Totals::derive(&self.items, self.discount, self.tax, self.amount_paid)?;
        self.subtotal = totals.subtotal;
        self.total_amount = totals.total_amount;
        self.balance = totals.balance;
        Ok(())
    }

    pub fn item_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.quantity))
    }
}

impl TryFrom<order_entity::Model> for Order {
    type Error = AppError;

    fn try_from(m: order_entity::Model) -> AppResult<Self> {
        let items: Vec<OrderItem> = serde_json::from_value(m.items)?;
        Ok(Self {
            id: m.id,
            order_number: m.order_number,
            receipt_number: m.receipt_number,
            owner_id: m.owner_id,
            customer_name: m.customer_name,
            customer_email: m.customer_email,
            items,
            subtotal: m.subtotal,
            discount: m.discount,
            tax: m.tax,
            total_amount: m.total_amount,
            amount_paid: m.amount_paid,
            balance: m.balance,
            status: m.status,
            payment_method: m.payment_method,
            notes: m.notes,
            receipt_printed: m.receipt_printed,
            email_sent: m.email_sent,
            client_local_id: m.client_local_id,
            last_synced_at: m.last_synced_at,
            sync_status: m.sync_status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

/// Insert payload for the store; totals are derived on persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_number: String,
    pub receipt_number: String,
    pub owner_id: i64,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<OrderItem>,
    pub discount: i64,
    pub tax: i64,
    pub amount_paid: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub receipt_printed: bool,
    pub email_sent: bool,
    pub client_local_id: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    /// Drink id.
    #[serde(alias = "drinkId")]
    pub drink: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
    #[schema(example = 1600)]
    pub amount_paid: i64,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub tax: i64,
    pub notes: Option<String>,
}

/// Field patch for an existing order. Items, amounts and numbers are not
/// patchable; unknown fields are rejected.
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub notes: Option<String>,
    pub receipt_printed: Option<bool>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub email_sent: Option<bool>,
}

impl UpdateOrderRequest {
    /// True when the patch touches a field outside `{status, notes, receiptPrinted}`.
    pub fn touches_privileged_fields(&self) -> bool {
        self.customer_name.is_some()
            || self.customer_email.is_some()
            || self.payment_method.is_some()
            || self.email_sent.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.notes.is_none()
            && self.receipt_printed.is_none()
            && !self.touches_privileged_fields()
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<OrderStatus>,
    /// `YYYY-MM-DD` or RFC 3339, inclusive.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD` (whole day) or RFC 3339, inclusive.
    pub end_date: Option<String>,
    /// Field name, `-` prefix for descending. Default `-createdAt`.
    pub sort: Option<String>,
}

/// Store-level order filter.
#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub owner_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub sync_status: Option<SyncStatus>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

impl OrderFilter {
    pub fn for_owner(owner_id: i64) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.owner_id.is_none_or(|o| order.owner_id == o)
            && self.status.is_none_or(|s| order.status == s)
            && self.sync_status.is_none_or(|s| order.sync_status == s)
            && self.created_from.is_none_or(|from| order.created_at >= from)
            && self.created_to.is_none_or(|to| order.created_at <= to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    TotalAmount,
    OrderNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSort {
    pub field: OrderSortField,
    pub descending: bool,
}

impl Default for OrderSort {
    fn default() -> Self {
        Self {
            field: OrderSortField::CreatedAt,
            descending: true,
        }
    }
}

impl std::str::FromStr for OrderSort {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let (descending, name) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let field = match name {
            "createdAt" | "created_at" => OrderSortField::CreatedAt,
            "updatedAt" | "updated_at" => OrderSortField::UpdatedAt,
            "totalAmount" | "total_amount" => OrderSortField::TotalAmount,
            "orderNumber" | "order_number" => OrderSortField::OrderNumber,
            other => {
                return Err(AppError::invalid(
                    "sort",
                    format!("unsupported sort field: {other}"),
                ));
            }
        };
        Ok(Self { field, descending })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    #[serde(flatten)]
    pub orders: PaginatedResponse<Order>,
    pub stats: StatsBucket,
}
