use crate::entities::{OrderStatus, PaymentMethod};
use crate::models::Order;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// One line of a client-side order. Offline clients snapshot the price they
/// charged; when it is missing the catalog price is used.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncOrderItem {
    #[serde(alias = "drinkId")]
    pub drink: i64,
    pub drink_name: Option<String>,
    pub quantity: i64,
    #[serde(alias = "price")]
    pub unit_price: Option<i64>,
}

/// Order as submitted by a (possibly offline) client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncOrderRecord {
    #[serde(alias = "clientLocalId")]
    pub local_id: Option<String>,
    pub order_number: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<SyncOrderItem>,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub tax: i64,
    pub amount_paid: i64,
    pub status: Option<OrderStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub receipt_printed: Option<bool>,
    pub email_sent: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    /// Client's last-modified time; required to update an existing order.
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkSyncRequest {
    /// Records are decoded one by one so a malformed entry only fails itself.
    #[schema(value_type = Vec<Object>)]
    pub orders: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncedOrder {
    /// Position of the record in the submitted batch.
    pub index: usize,
    pub local_id: Option<String>,
    pub order: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncConflict {
    pub index: usize,
    pub local_id: Option<String>,
    pub order_id: i64,
    pub client_updated_at: Option<DateTime<Utc>>,
    /// Server's current record, unchanged.
    pub server_order: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncError {
    pub index: usize,
    pub local_id: Option<String>,
    pub order_number: Option<String>,
    pub code: String,
    pub message: String,
}

/// Four-way partition covering every submitted record exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BulkSyncResult {
    pub created: Vec<SyncedOrder>,
    pub updated: Vec<SyncedOrder>,
    pub conflicts: Vec<SyncConflict>,
    pub errors: Vec<SyncError>,
}

impl BulkSyncResult {
    pub fn total(&self) -> usize {
        self.created.len() + self.updated.len() + self.conflicts.len() + self.errors.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkSyncedRequest {
    pub order_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkSyncedResponse {
    pub modified: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    KeepServer,
    UseClient,
    Merge,
}

/// Order fields carried by a conflict resolution. `use_client` requires
/// `items` and `amountPaid`; `merge` applies only what is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionData {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub items: Option<Vec<SyncOrderItem>>,
    pub discount: Option<i64>,
    pub tax: Option<i64>,
    pub amount_paid: Option<i64>,
    pub status: Option<OrderStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub receipt_printed: Option<bool>,
    pub email_sent: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResolution {
    pub order_id: i64,
    pub resolution: Resolution,
    #[serde(default)]
    pub data: Option<ResolutionData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResolveConflictsRequest {
    #[schema(value_type = Vec<Object>)]
    pub resolutions: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConflict {
    pub index: usize,
    pub order_id: i64,
    pub resolution: Resolution,
    pub order: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionError {
    pub index: usize,
    pub order_id: Option<i64>,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ResolveConflictsResult {
    pub resolved: Vec<ResolvedConflict>,
    pub errors: Vec<ResolutionError>,
}
