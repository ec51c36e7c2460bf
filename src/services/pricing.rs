//! Cart pricing and payment settlement.
//!
//! Everything here is pure: callers fetch the catalog first and persist the
//! result in a single write afterwards.

use crate::error::{AppError, AppResult};
use crate::models::{Drink, OrderItem, OrderLineRequest, SyncOrderItem, Totals};
use crate::utils::Violations;
use std::collections::HashMap;

/// Catalog entries visible to one owner, keyed by drink id.
pub struct Catalog<'a> {
    drinks: HashMap<i64, &'a Drink>,
}

impl<'a> Catalog<'a> {
    pub fn new(owner_id: i64, drinks: &'a [Drink]) -> Self {
        Self {
            drinks: drinks
                .iter()
                .filter(|d| d.owner_id == owner_id)
                .map(|d| (d.id, d))
                .collect(),
        }
    }

    pub fn get(&self, drink_id: i64) -> AppResult<&'a Drink> {
        self.drinks
            .get(&drink_id)
            .copied()
            .ok_or_else(|| AppError::NotFound(format!("Drink {drink_id} not found")))
    }
}

/// Shape checks shared by every write path: at least one line, quantities
/// positive, money inputs non-negative.
pub fn check_inputs(
    quantities: impl IntoIterator<Item = i64>,
    discount: i64,
    tax: i64,
    amount_paid: i64,
) -> AppResult<()> {
    let mut violations = Violations::new();
    let mut lines = 0usize;
    for (i, quantity) in quantities.into_iter().enumerate() {
        lines += 1;
        violations.check(
            quantity >= 1,
            format!("items[{i}].quantity"),
            "must be a positive integer",
        );
    }
    violations.check(lines > 0, "items", "at least one item is required");
    violations.check(discount >= 0, "discount", "must not be negative");
    violations.check(tax >= 0, "tax", "must not be negative");
    violations.check(amount_paid >= 0, "amountPaid", "must not be negative");
    violations.into_result()
}

/// Snapshots the current catalog price of every requested drink.
/// All-or-nothing: the first unknown drink rejects the whole cart.
pub fn price_lines(lines: &[OrderLineRequest], catalog: &Catalog<'_>) -> AppResult<Vec<OrderItem>> {
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let drink = catalog.get(line.drink)?;
        if !drink.active {
            return Err(AppError::invalid(
                "items",
                format!("Drink {} is not available", drink.id),
            ));
        }
        items.push(OrderItem::new(drink.id, &drink.name, line.quantity, drink.price)?);
    }
    Ok(items)
}

/// Rebuilds the snapshot carried by a client-side order. Prices the client
/// charged are kept; missing names or prices come from the catalog.
pub fn snapshot_lines(lines: &[SyncOrderItem], catalog: &Catalog<'_>) -> AppResult<Vec<OrderItem>> {
    let mut items = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let (name, unit_price) = match (&line.drink_name, line.unit_price) {
            (Some(name), Some(price)) => (name.clone(), price),
            (name, price) => {
                let drink = catalog.get(line.drink)?;
                (
                    name.clone().unwrap_or_else(|| drink.name.clone()),
                    price.unwrap_or(drink.price),
                )
            }
        };
        if unit_price < 0 {
            return Err(AppError::invalid(
                format!("items[{i}].unitPrice"),
                "must not be negative",
            ));
        }
        items.push(OrderItem::new(line.drink, name, line.quantity, unit_price)?);
    }
    Ok(items)
}

/// Derives the totals and enforces the payment rule.
pub fn settle(items: &[OrderItem], discount: i64, tax: i64, amount_paid: i64) -> AppResult<Totals> {
    let totals = Totals::derive(items, discount, tax, amount_paid)?;
    if totals.total_amount < 0 {
        return Err(AppError::invalid(
            "discount",
            "must not exceed subtotal plus tax",
        ));
    }
    if amount_paid < totals.total_amount {
        return Err(AppError::InsufficientPayment {
            required: totals.total_amount,
            paid: amount_paid,
        });
    }
    Ok(totals)
}

/// Full assembly for a new counter order.
pub fn assemble(
    lines: &[OrderLineRequest],
    catalog: &Catalog<'_>,
    discount: i64,
    tax: i64,
    amount_paid: i64,
) -> AppResult<(Vec<OrderItem>, Totals)> {
    check_inputs(lines.iter().map(|l| l.quantity), discount, tax, amount_paid)?;
    let items = price_lines(lines, catalog)?;
    let totals = settle(&items, discount, tax, amount_paid)?;
    Ok((items, totals))
}
