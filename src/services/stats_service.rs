use crate::database::Store;
use crate::entities::{OrderStatus, PaymentMethod, SyncStatus};
use crate::error::AppResult;
use crate::models::*;
use crate::utils::time::{self, ReportWindows};
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_TOP_DRINKS: usize = 5;
pub const MAX_TOP_DRINKS: usize = 50;
const RECENT_ORDERS: u64 = 5;

/// Revenue rollup; only completed orders count.
pub fn bucket<'a>(orders: impl IntoIterator<Item = &'a Order>) -> StatsBucket {
    let mut b = StatsBucket::default();
    for order in orders
        .into_iter()
        .filter(|o| o.status == OrderStatus::Completed)
    {
        b.order_count += 1;
        b.total_revenue += order.total_amount;
        b.total_items += order.item_quantity();
    }
    if b.order_count > 0 {
        b.avg_order_value = b.total_revenue as f64 / b.order_count as f64;
    }
    b
}

fn bucket_since(orders: &[Order], since: DateTime<Utc>) -> StatsBucket {
    bucket(orders.iter().filter(|o| o.created_at >= since))
}

pub fn by_status(orders: &[Order]) -> Vec<StatusCount> {
    let mut counts: HashMap<OrderStatus, i64> = HashMap::new();
    for order in orders {
        *counts.entry(order.status).or_default() += 1;
    }
    let mut out: Vec<StatusCount> = counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then(a.status.to_string().cmp(&b.status.to_string())));
    out
}

pub fn by_payment_method(orders: &[Order]) -> Vec<PaymentMethodCount> {
    let mut groups: HashMap<PaymentMethod, (i64, i64)> = HashMap::new();
    for order in orders.iter().filter(|o| o.status == OrderStatus::Completed) {
        let entry = groups.entry(order.payment_method).or_default();
        entry.0 += 1;
        entry.1 += order.total_amount;
    }
    let mut out: Vec<PaymentMethodCount> = groups
        .into_iter()
        .map(|(payment_method, (count, revenue))| PaymentMethodCount {
            payment_method,
            count,
            revenue,
        })
        .collect();
    out.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then(a.payment_method.to_string().cmp(&b.payment_method.to_string()))
    });
    out
}

/// Explodes completed orders into their lines and ranks drinks by quantity.
pub fn top_drinks(orders: &[Order], limit: usize) -> Vec<TopDrink> {
    let mut groups: HashMap<i64, TopDrink> = HashMap::new();
    for order in orders.iter().filter(|o| o.status == OrderStatus::Completed) {
        for item in &order.items {
            let entry = groups.entry(item.drink_id).or_insert_with(|| TopDrink {
                drink_id: item.drink_id,
                drink_name: item.drink_name.clone(),
                quantity: 0,
                revenue: 0,
            });
            entry.quantity += item.quantity;
            entry.revenue += item.line_total;
        }
    }
    let mut out: Vec<TopDrink> = groups.into_values().collect();
    out.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then(b.revenue.cmp(&a.revenue))
            .then(a.drink_id.cmp(&b.drink_id))
    });
    out.truncate(limit);
    out
}

pub fn compute(orders: &[Order], now: DateTime<Utc>, offset: FixedOffset, top: usize) -> OrderStats {
    let windows = ReportWindows::at(now, offset);
    OrderStats {
        overall: bucket(orders),
        today: bucket_since(orders, windows.today),
        this_week: bucket_since(orders, windows.week),
        this_month: bucket_since(orders, windows.month),
        by_status: by_status(orders),
        by_payment_method: by_payment_method(orders),
        top_drinks: top_drinks(orders, top),
    }
}

/// Read-side aggregates over the order store. Nothing is cached; every call
/// recomputes from current state.
#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn Store>,
}

impl StatsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Administrators see the whole dataset, everyone else their own orders.
    fn scope(user: CurrentUser) -> OrderFilter {
        if user.is_admin() {
            OrderFilter::default()
        } else {
            OrderFilter::for_owner(user.id)
        }
    }

    fn top_limit(query: &StatsQuery) -> usize {
        query
            .top
            .unwrap_or(DEFAULT_TOP_DRINKS)
            .clamp(1, MAX_TOP_DRINKS)
    }

    pub async fn stats(&self, user: CurrentUser, query: &StatsQuery) -> AppResult<OrderStats> {
        let offset = time::caller_offset(query.tz_offset)?;
        let orders = self.store.all_orders(&Self::scope(user)).await?;
        Ok(compute(&orders, time::now(), offset, Self::top_limit(query)))
    }

    pub async fn dashboard_summary(
        &self,
        user: CurrentUser,
        query: &StatsQuery,
    ) -> AppResult<DashboardSummary> {
        let offset = time::caller_offset(query.tz_offset)?;
        let scope = Self::scope(user);
        let orders = self.store.all_orders(&scope).await?;
        let windows = ReportWindows::at(time::now(), offset);

        let (recent_orders, _) = self
            .store
            .list_orders(
                &scope,
                OrderSort::default(),
                &PaginationParams::new(Some(1), Some(RECENT_ORDERS)),
            )
            .await?;

        let pending_sync = self
            .store
            .count_orders(&OrderFilter {
                sync_status: Some(SyncStatus::Pending),
                ..scope.clone()
            })
            .await?;

        let active_drinks = self
            .store
            .count_drinks(&DrinkFilter {
                owner_id: scope.owner_id,
                active: Some(true),
                ..Default::default()
            })
            .await?;

        Ok(DashboardSummary {
            today: bucket_since(&orders, windows.today),
            this_month: bucket_since(&orders, windows.month),
            recent_orders,
            top_drinks: top_drinks(&orders, Self::top_limit(query)),
            pending_sync: pending_sync as i64,
            active_drinks: active_drinks as i64,
        })
    }
}
