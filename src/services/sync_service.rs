use crate::config::OrdersConfig;
use crate::database::Store;
use crate::entities::SyncStatus;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::order_service::insert_with_fresh_numbers;
use crate::services::pricing::{self, Catalog};
use crate::utils::time;
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use std::sync::Arc;

enum RecordOutcome {
    Created(Order),
    Updated(Order),
    Conflict(Order),
}

/// Reads a string field from an undecodable record so its error entry can
/// still be correlated by the client.
fn raw_str(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| raw.get(k).and_then(Value::as_str))
        .map(str::to_string)
}

fn sync_error(index: usize, raw: &Value, err: &AppError) -> SyncError {
    SyncError {
        index,
        local_id: raw_str(raw, &["localId", "clientLocalId"]),
        order_number: raw_str(raw, &["orderNumber"]),
        code: err.code().to_string(),
        message: err.to_string(),
    }
}

/// Reconciles client-side orders with the server copy, last write wins by
/// `updatedAt`. Records are independent: one failing record never affects
/// the rest of the batch.
#[derive(Clone)]
pub struct SyncService {
    store: Arc<dyn Store>,
    numbering: OrdersConfig,
}

impl SyncService {
    pub fn new(store: Arc<dyn Store>, numbering: OrdersConfig) -> Self {
        Self { store, numbering }
    }

    async fn catalog_drinks(&self, ids: impl Iterator<Item = i64>) -> AppResult<Vec<Drink>> {
        let ids: Vec<i64> = ids.collect();
        self.store.find_drinks(&ids).await
    }

    pub async fn bulk_sync(
        &self,
        user: CurrentUser,
        request: BulkSyncRequest,
    ) -> AppResult<BulkSyncResult> {
        let owner = self
            .store
            .find_user(user.id)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        let mut result = BulkSyncResult::default();
        for (index, raw) in request.orders.into_iter().enumerate() {
            let record = match serde_json::from_value::<SyncOrderRecord>(raw.clone()) {
                Ok(record) => record,
                Err(e) => {
                    let err = AppError::invalid("orders", format!("malformed record: {e}"));
                    result.errors.push(sync_error(index, &raw, &err));
                    continue;
                }
            };
            let local_id = record.local_id.clone();
            match self.sync_record(user, &owner, record).await {
                Ok(RecordOutcome::Created(order)) => result.created.push(SyncedOrder {
                    index,
                    local_id,
                    order,
                }),
                Ok(RecordOutcome::Updated(order)) => result.updated.push(SyncedOrder {
                    index,
                    local_id,
                    order,
                }),
                Ok(RecordOutcome::Conflict(server_order)) => {
                    let client_updated_at = raw
                        .get("updatedAt")
                        .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v.clone()).ok());
                    result.conflicts.push(SyncConflict {
                        index,
                        local_id,
                        order_id: server_order.id,
                        client_updated_at,
                        server_order,
                    })
                }
                Err(err) => {
                    log::warn!("Sync record {index} rejected: {err}");
                    result.errors.push(sync_error(index, &raw, &err));
                }
            }
        }

        log::info!(
            "Sync batch from user {}: {} created, {} updated, {} conflicts, {} errors",
            user.id,
            result.created.len(),
            result.updated.len(),
            result.conflicts.len(),
            result.errors.len()
        );
        Ok(result)
    }

    /// Local ids belong to the submitting owner's tills; order numbers are
    /// global.
    async fn find_existing(
        &self,
        owner_id: i64,
        record: &SyncOrderRecord,
    ) -> AppResult<Option<Order>> {
        if let Some(local_id) = &record.local_id
            && let Some(order) = self.store.find_order_by_local_id(owner_id, local_id).await?
        {
            return Ok(Some(order));
        }
        match &record.order_number {
            Some(number) => self.store.find_order_by_number(number).await,
            None => Ok(None),
        }
    }

    async fn sync_record(
        &self,
        user: CurrentUser,
        owner: &User,
        record: SyncOrderRecord,
    ) -> AppResult<RecordOutcome> {
        pricing::check_inputs(
            record.items.iter().map(|i| i.quantity),
            record.discount,
            record.tax,
            record.amount_paid,
        )?;

        match self.find_existing(owner.id, &record).await? {
            None => self.create_from_record(owner, record).await.map(RecordOutcome::Created),
            Some(existing) => self.overwrite_from_record(user, existing, record).await,
        }
    }

    async fn create_from_record(&self, owner: &User, record: SyncOrderRecord) -> AppResult<Order> {
        let drinks = self.catalog_drinks(record.items.iter().map(|i| i.drink)).await?;
        let items = pricing::snapshot_lines(&record.items, &Catalog::new(owner.id, &drinks))?;
        pricing::settle(&items, record.discount, record.tax, record.amount_paid)?;

        let now = time::now();
        let created_at = record.created_at.map_or(now, |t| t.trunc_subsecs(6));
        let updated_at = record.updated_at.map_or(now, |t| t.trunc_subsecs(6));
        let build = |order_number: String, receipt_number: String| NewOrder {
            order_number,
            receipt_number,
            owner_id: owner.id,
            customer_name: record
                .customer_name
                .clone()
                .or_else(|| Some(owner.username.clone())),
            customer_email: record
                .customer_email
                .clone()
                .or_else(|| Some(owner.email.clone())),
            items: items.clone(),
            discount: record.discount,
            tax: record.tax,
            amount_paid: record.amount_paid,
            status: record.status.unwrap_or_default(),
            payment_method: record.payment_method.unwrap_or_default(),
            notes: record.notes.clone(),
            receipt_printed: record.receipt_printed.unwrap_or(false),
            email_sent: record.email_sent.unwrap_or(false),
            client_local_id: record.local_id.clone(),
            last_synced_at: Some(now),
            sync_status: SyncStatus::Synced,
            created_at,
            updated_at,
        };

        // an offline client may already have numbered the order
        insert_with_fresh_numbers(
            self.store.as_ref(),
            &self.numbering,
            created_at,
            record.order_number.as_deref(),
            build,
        )
        .await
    }

    async fn overwrite_from_record(
        &self,
        user: CurrentUser,
        existing: Order,
        record: SyncOrderRecord,
    ) -> AppResult<RecordOutcome> {
        if !user.can_access(existing.owner_id) {
            return Err(AppError::Forbidden(
                "You do not have access to this order".to_string(),
            ));
        }
        let incoming = record
            .updated_at
            .ok_or_else(|| {
                AppError::invalid("updatedAt", "required when syncing an existing order")
            })?
            .trunc_subsecs(6);

        if existing.updated_at > incoming {
            return Ok(RecordOutcome::Conflict(existing));
        }

        let drinks = self.catalog_drinks(record.items.iter().map(|i| i.drink)).await?;
        let items =
            pricing::snapshot_lines(&record.items, &Catalog::new(existing.owner_id, &drinks))?;
        pricing::settle(&items, record.discount, record.tax, record.amount_paid)?;

        let mut next = existing.clone();
        next.items = items;
        next.discount = record.discount;
        next.tax = record.tax;
        next.amount_paid = record.amount_paid;
        if record.customer_name.is_some() {
            next.customer_name = record.customer_name;
        }
        if record.customer_email.is_some() {
            next.customer_email = record.customer_email;
        }
        if let Some(status) = record.status {
            next.status = status;
        }
        if let Some(method) = record.payment_method {
            next.payment_method = method;
        }
        if record.notes.is_some() {
            next.notes = record.notes;
        }
        if let Some(printed) = record.receipt_printed {
            next.receipt_printed = printed;
        }
        if let Some(sent) = record.email_sent {
            next.email_sent = sent;
        }
        if record.local_id.is_some() {
            next.client_local_id = record.local_id;
        }
        next.sync_status = SyncStatus::Synced;
        next.updated_at = incoming;
        next.recompute_totals()?;

        // resubmission of what the server already holds
        let mut unchanged = next.clone();
        unchanged.last_synced_at = existing.last_synced_at;
        if unchanged == existing {
            return Ok(RecordOutcome::Updated(existing));
        }

        next.last_synced_at = Some(time::now());
        match self.store.update_order(&next, Some(existing.updated_at)).await {
            Ok(saved) => Ok(RecordOutcome::Updated(saved)),
            Err(AppError::Conflict(_)) => {
                // another writer got there first; report what it left behind
                let current = self
                    .store
                    .find_order(existing.id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Order {} not found", existing.id)))?;
                Ok(RecordOutcome::Conflict(current))
            }
            Err(e) => Err(e),
        }
    }

    /// Caller's orders changed on the server and not yet acknowledged.
    pub async fn pending(&self, user: CurrentUser) -> AppResult<Vec<Order>> {
        let filter = OrderFilter {
            sync_status: Some(SyncStatus::Pending),
            ..OrderFilter::for_owner(user.id)
        };
        self.store.all_orders(&filter).await
    }

    pub async fn mark_synced(
        &self,
        user: CurrentUser,
        request: MarkSyncedRequest,
    ) -> AppResult<MarkSyncedResponse> {
        if request.order_ids.is_empty() {
            return Err(AppError::invalid("orderIds", "at least one order id is required"));
        }

        let mut modified = 0;
        for id in request.order_ids {
            let Some(order) = self.store.find_order(id).await? else {
                continue;
            };
            if !user.can_access(order.owner_id) || order.sync_status == SyncStatus::Synced {
                continue;
            }
            let mut next = order.clone();
            next.sync_status = SyncStatus::Synced;
            next.last_synced_at = Some(time::now());
            match self.store.update_order(&next, Some(order.updated_at)).await {
                Ok(_) => modified += 1,
                Err(AppError::Conflict(_)) => {
                    log::warn!("Order {id} changed while being marked synced, skipped");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(MarkSyncedResponse { modified })
    }

    pub async fn resolve_conflicts(
        &self,
        user: CurrentUser,
        request: ResolveConflictsRequest,
    ) -> AppResult<ResolveConflictsResult> {
        let mut result = ResolveConflictsResult::default();
        for (index, raw) in request.resolutions.into_iter().enumerate() {
            let order_id = raw.get("orderId").and_then(Value::as_i64);
            let outcome = match serde_json::from_value::<ConflictResolution>(raw) {
                Ok(resolution) => self
                    .resolve_one(user, &resolution)
                    .await
                    .map(|order| (resolution, order)),
                Err(e) => Err(AppError::invalid(
                    "resolutions",
                    format!("malformed resolution: {e}"),
                )),
            };
            match outcome {
                Ok((resolution, order)) => result.resolved.push(ResolvedConflict {
                    index,
                    order_id: order.id,
                    resolution: resolution.resolution,
                    order,
                }),
                Err(err) => {
                    log::warn!("Conflict resolution {index} rejected: {err}");
                    result.errors.push(ResolutionError {
                        index,
                        order_id,
                        code: err.code().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }
        Ok(result)
    }

    async fn resolve_one(&self, user: CurrentUser, resolution: &ConflictResolution) -> AppResult<Order> {
        let existing = self
            .store
            .find_order(resolution.order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", resolution.order_id)))?;
        if !user.can_access(existing.owner_id) {
            return Err(AppError::Forbidden(
                "You do not have access to this order".to_string(),
            ));
        }

        let data = resolution.data.clone().unwrap_or_default();
        let mut next = existing.clone();
        match resolution.resolution {
            Resolution::KeepServer => return Ok(existing),
            Resolution::UseClient => {
                let (Some(items), Some(amount_paid)) = (&data.items, data.amount_paid) else {
                    return Err(AppError::invalid(
                        "data",
                        "use_client requires items and amountPaid",
                    ));
                };
                next.items = self.snapshot(&existing, items).await?;
                next.amount_paid = amount_paid;
                next.discount = data.discount.unwrap_or(0);
                next.tax = data.tax.unwrap_or(0);
                next.customer_name = data.customer_name;
                next.customer_email = data.customer_email;
                next.notes = data.notes;
                next.status = data.status.unwrap_or(existing.status);
                next.payment_method = data.payment_method.unwrap_or(existing.payment_method);
                next.receipt_printed = data.receipt_printed.unwrap_or(existing.receipt_printed);
                next.email_sent = data.email_sent.unwrap_or(existing.email_sent);
            }
            Resolution::Merge => {
                if let Some(items) = &data.items {
                    next.items = self.snapshot(&existing, items).await?;
                }
                if let Some(v) = data.amount_paid {
                    next.amount_paid = v;
                }
                if let Some(v) = data.discount {
                    next.discount = v;
                }
                if let Some(v) = data.tax {
                    next.tax = v;
                }
                if data.customer_name.is_some() {
                    next.customer_name = data.customer_name;
                }
                if data.customer_email.is_some() {
                    next.customer_email = data.customer_email;
                }
                if data.notes.is_some() {
                    next.notes = data.notes;
                }
                if let Some(v) = data.status {
                    next.status = v;
                }
                if let Some(v) = data.payment_method {
                    next.payment_method = v;
                }
                if let Some(v) = data.receipt_printed {
                    next.receipt_printed = v;
                }
                if let Some(v) = data.email_sent {
                    next.email_sent = v;
                }
            }
        }

        pricing::check_inputs(
            next.items.iter().map(|i| i.quantity),
            next.discount,
            next.tax,
            next.amount_paid,
        )?;
        pricing::settle(&next.items, next.discount, next.tax, next.amount_paid)?;

        let now = time::now();
        next.sync_status = SyncStatus::Synced;
        next.last_synced_at = Some(now);
        next.updated_at = now;
        let saved = self
            .store
            .update_order(&next, Some(existing.updated_at))
            .await?;
        log::info!(
            "Conflict on order {} resolved with {:?}",
            saved.order_number,
            resolution.resolution
        );
        Ok(saved)
    }

    async fn snapshot(&self, existing: &Order, items: &[SyncOrderItem]) -> AppResult<Vec<OrderItem>> {
        let drinks = self.catalog_drinks(items.iter().map(|i| i.drink)).await?;
        pricing::snapshot_lines(items, &Catalog::new(existing.owner_id, &drinks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::database::colliding_store::CollidingStore;
    use crate::entities::{DrinkCategory, UserRole};
    use chrono::Duration;
    use serde_json::json;

    struct Fixture {
        service: SyncService,
        store: Arc<MemoryStore>,
        owner: CurrentUser,
        drink_id: i64,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .insert_user(NewUser {
                username: "till-1".into(),
                email: "till-1@example.com".into(),
                password_hash: "x".into(),
                role: UserRole::Staff,
                active: true,
            })
            .await
            .unwrap();
        let drink = store
            .insert_drink(NewDrink {
                owner_id: user.id,
                name: "Pilsner".into(),
                description: None,
                price: 800,
                category: DrinkCategory::Beer,
            })
            .await
            .unwrap();
        Fixture {
            service: SyncService::new(store.clone(), OrdersConfig::default()),
            store,
            owner: CurrentUser {
                id: user.id,
                role: user.role,
            },
            drink_id: drink.id,
        }
    }

    fn record(local_id: &str, drink: i64, qty: i64, paid: i64, updated_at: DateTime<Utc>) -> Value {
        json!({
            "localId": local_id,
            "items": [{"drink": drink, "quantity": qty, "unitPrice": 800}],
            "amountPaid": paid,
            "updatedAt": updated_at,
        })
    }

    #[tokio::test]
    async fn batch_is_partitioned_exactly_once() {
        let f = fixture().await;
        let t = time::now();
        let batch = BulkSyncRequest {
            orders: vec![
                record("a", f.drink_id, 1, 800, t),
                record("b", f.drink_id, 2, 100, t),
                json!({"localId": "c", "items": "nope"}),
                record("d", 999, 1, 800, t),
            ],
        };
        let result = f.service.bulk_sync(f.owner, batch).await.unwrap();
        assert_eq!(result.total(), 4);
        assert_eq!(result.created.len(), 1);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.errors[0].code, "INSUFFICIENT_PAYMENT");
        assert_eq!(result.errors[1].local_id.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn client_numbered_record_regenerates_only_the_receipt() {
        let f = fixture().await;
        let store = Arc::new(CollidingStore::new(f.store.clone(), "receipt_number"));
        let service = SyncService::new(store.clone(), OrdersConfig::default());

        let mut raw = record("r-1", f.drink_id, 1, 800, time::now());
        raw["orderNumber"] = json!("ORD-20260101-0042");
        let result = service
            .bulk_sync(f.owner, BulkSyncRequest { orders: vec![raw] })
            .await
            .unwrap();
        assert_eq!(result.created.len(), 1);
        let order = &result.created[0].order;
        assert_eq!(order.order_number, "ORD-20260101-0042");

        let attempts = store.attempts();
        assert_eq!(attempts.len(), 2);
        assert!(attempts.iter().all(|(number, _)| number == "ORD-20260101-0042"));
        assert_eq!(attempts[1].1, order.receipt_number);
    }

    #[tokio::test]
    async fn local_ids_do_not_cross_owners() {
        let f = fixture().await;
        let other = f
            .store
            .insert_user(NewUser {
                username: "till-2".into(),
                email: "till-2@example.com".into(),
                password_hash: "x".into(),
                role: UserRole::Staff,
                active: true,
            })
            .await
            .unwrap();
        let other_drink = f
            .store
            .insert_drink(NewDrink {
                owner_id: other.id,
                name: "Pilsner".into(),
                description: None,
                price: 800,
                category: DrinkCategory::Beer,
            })
            .await
            .unwrap();
        let other_user = CurrentUser {
            id: other.id,
            role: other.role,
        };

        let t = time::now();
        let first = f
            .service
            .bulk_sync(f.owner, BulkSyncRequest { orders: vec![record("till-1", f.drink_id, 1, 800, t)] })
            .await
            .unwrap();
        let second = f
            .service
            .bulk_sync(other_user, BulkSyncRequest { orders: vec![record("till-1", other_drink.id, 1, 800, t)] })
            .await
            .unwrap();
        assert_eq!(second.created.len(), 1);
        assert!(second.errors.is_empty());
        assert_ne!(first.created[0].order.id, second.created[0].order.id);
        assert_eq!(second.created[0].order.owner_id, other.id);
    }

    #[tokio::test]
    async fn server_newer_record_is_a_conflict() {
        let f = fixture().await;
        let t1 = time::now();
        let created = f
            .service
            .bulk_sync(f.owner, BulkSyncRequest { orders: vec![record("x", f.drink_id, 1, 5000, t1)] })
            .await
            .unwrap();
        let server = &created.created[0].order;

        // server-side edit moves updatedAt past the client's copy
        let mut edited = server.clone();
        edited.notes = Some("server edit".into());
        edited.updated_at = t1 + Duration::seconds(30);
        f.store.update_order(&edited, None).await.unwrap();

        let result = f
            .service
            .bulk_sync(f.owner, BulkSyncRequest { orders: vec![record("x", f.drink_id, 3, 5000, t1)] })
            .await
            .unwrap();
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].server_order.total_amount, 800);

        let stored = f.store.find_order(server.id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, 800);
        assert_eq!(stored.notes.as_deref(), Some("server edit"));
    }

    #[tokio::test]
    async fn newer_client_record_overwrites() {
        let f = fixture().await;
        let t1 = time::now();
        f.service
            .bulk_sync(f.owner, BulkSyncRequest { orders: vec![record("x", f.drink_id, 1, 5000, t1)] })
            .await
            .unwrap();
        let t2 = t1 + Duration::seconds(5);
        let result = f
            .service
            .bulk_sync(f.owner, BulkSyncRequest { orders: vec![record("x", f.drink_id, 2, 5000, t2)] })
            .await
            .unwrap();
        assert_eq!(result.updated.len(), 1);
        let order = &result.updated[0].order;
        assert_eq!(order.total_amount, 1600);
        assert_eq!(order.updated_at, t2);
        assert_eq!(order.sync_status, SyncStatus::Synced);
    }

    #[tokio::test]
    async fn resubmission_is_idempotent() {
        let f = fixture().await;
        let t = time::now();
        let first = f
            .service
            .bulk_sync(f.owner, BulkSyncRequest { orders: vec![record("x", f.drink_id, 1, 800, t)] })
            .await
            .unwrap();
        let again = f
            .service
            .bulk_sync(f.owner, BulkSyncRequest { orders: vec![record("x", f.drink_id, 1, 800, t)] })
            .await
            .unwrap();
        assert_eq!(again.updated.len(), 1);
        assert_eq!(again.updated[0].order, first.created[0].order);
    }

    #[tokio::test]
    async fn existing_orders_need_a_client_timestamp() {
        let f = fixture().await;
        let t = time::now();
        f.service
            .bulk_sync(f.owner, BulkSyncRequest { orders: vec![record("x", f.drink_id, 1, 800, t)] })
            .await
            .unwrap();
        let result = f
            .service
            .bulk_sync(
                f.owner,
                BulkSyncRequest {
                    orders: vec![json!({
                        "localId": "x",
                        "items": [{"drink": f.drink_id, "quantity": 1}],
                        "amountPaid": 800,
                    })],
                },
            )
            .await
            .unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn foreign_orders_are_errors_not_overwrites() {
        let f = fixture().await;
        let t = time::now();
        f.service
            .bulk_sync(f.owner, BulkSyncRequest { orders: vec![record("x", f.drink_id, 1, 800, t)] })
            .await
            .unwrap();
        let intruder = f
            .store
            .insert_user(NewUser {
                username: "other".into(),
                email: "other@example.com".into(),
                password_hash: "x".into(),
                role: UserRole::Staff,
                active: true,
            })
            .await
            .unwrap();
        let result = f
            .service
            .bulk_sync(
                CurrentUser { id: intruder.id, role: UserRole::Staff },
                BulkSyncRequest {
                    orders: vec![record("x", f.drink_id, 9, 99_999, t + Duration::seconds(1))],
                },
            )
            .await
            .unwrap();
        assert_eq!(result.errors[0].code, "FORBIDDEN");
    }

    #[tokio::test]
    async fn resolutions_are_independent() {
        let f = fixture().await;
        let t = time::now();
        let created = f
            .service
            .bulk_sync(f.owner, BulkSyncRequest { orders: vec![record("x", f.drink_id, 1, 5000, t)] })
            .await
            .unwrap();
        let id = created.created[0].order.id;

        let result = f
            .service
            .resolve_conflicts(
                f.owner,
                ResolveConflictsRequest {
                    resolutions: vec![
                        json!({"orderId": id, "resolution": "keep_server"}),
                        json!({"orderId": id, "resolution": "merge", "data": {"notes": "merged"}}),
                        json!({"orderId": 404, "resolution": "merge", "data": {}}),
                        json!({"orderId": id, "resolution": "use_client", "data": {"notes": "x"}}),
                        json!({
                            "orderId": id,
                            "resolution": "use_client",
                            "data": {"items": [{"drink": f.drink_id, "quantity": 4}], "amountPaid": 5000}
                        }),
                    ],
                },
            )
            .await
            .unwrap();
        assert_eq!(result.resolved.len(), 3);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].order_id, Some(404));
        assert_eq!(result.errors[1].code, "VALIDATION_ERROR");

        let stored = f.store.find_order(id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, 3200);
        // use_client replaces the whole payload
        assert_eq!(stored.notes, None);
    }

    #[tokio::test]
    async fn pending_and_mark_synced() {
        let f = fixture().await;
        let t = time::now();
        let created = f
            .service
            .bulk_sync(f.owner, BulkSyncRequest { orders: vec![record("x", f.drink_id, 1, 800, t)] })
            .await
            .unwrap();
        let mut order = created.created[0].order.clone();
        order.sync_status = SyncStatus::Pending;
        f.store.update_order(&order, None).await.unwrap();

        let pending = f.service.pending(f.owner).await.unwrap();
        assert_eq!(pending.len(), 1);

        let response = f
            .service
            .mark_synced(f.owner, MarkSyncedRequest { order_ids: vec![order.id, 12345] })
            .await
            .unwrap();
        assert_eq!(response.modified, 1);
        assert!(f.service.pending(f.owner).await.unwrap().is_empty());
    }
}
