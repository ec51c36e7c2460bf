use crate::entities::{OrderStatus, PaymentMethod};
use crate::models::Order;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Revenue rollup over completed orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsBucket {
    pub order_count: i64,
    pub total_revenue: i64,
    pub avg_order_value: f64,
    pub total_items: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodCount {
    pub payment_method: PaymentMethod,
    pub count: i64,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopDrink {
    pub drink_id: i64,
    pub drink_name: String,
    pub quantity: i64,
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub overall: StatsBucket,
    pub today: StatsBucket,
    pub this_week: StatsBucket,
    pub this_month: StatsBucket,
    pub by_status: Vec<StatusCount>,
    pub by_payment_method: Vec<PaymentMethodCount>,
    pub top_drinks: Vec<TopDrink>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub today: StatsBucket,
    pub this_month: StatsBucket,
    pub recent_orders: Vec<Order>,
    pub top_drinks: Vec<TopDrink>,
    pub pending_sync: i64,
    pub active_drinks: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    /// Caller's offset from UTC in minutes (east positive).
    pub tz_offset: Option<i32>,
    /// Number of top drinks to report (default 5, max 50).
    pub top: Option<usize>,
}
