use crate::error::{AppError, Result};
use crate::models::{NewOrder, NewOrderEvent, Order, OrderItem, User};
use crate::notify::Broadcaster;
use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Largest gap tolerated between a submitted total and the line-item sum.
const TOTAL_TOLERANCE: f64 = 0.005;

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
    broadcaster: Broadcaster,
    currency: String,
    verify_totals: bool,
}

fn validate_item(item: &OrderItem) -> Result<()> {
    if item.product.trim().is_empty() || item.name.trim().is_empty() {
        return Err(AppError::Validation("Order item needs a product and a name".into()));
    }
    if item.qty < 1 {
        return Err(AppError::Validation(format!("Invalid quantity for {}", item.name)));
    }
    if !item.price.is_finite() || item.price < 0.0 {
        return Err(AppError::Validation(format!("Invalid price for {}", item.name)));
    }
    Ok(())
}

pub fn items_total(items: &[OrderItem]) -> f64 {
    items.iter().map(OrderItem::subtotal).sum()
}

impl OrderService {
    pub fn new(
        store: Arc<dyn Store>,
        broadcaster: Broadcaster,
        currency: impl Into<String>,
    ) -> Self {
        OrderService {
            store,
            broadcaster,
            currency: currency.into(),
            verify_totals: false,
        }
    }

    /// Reject orders whose submitted total disagrees with their line items.
    /// Off by default: the submitted total is stored as given.
    pub fn with_total_verification(mut self, enabled: bool) -> Self {
        self.verify_totals = enabled;
        self
    }

    /// Persists the order, then announces it to connected viewers.
    ///
    /// The announcement happens after the write and its outcome is ignored,
    /// so a placed order is never rolled back by a failed broadcast. Not
    /// idempotent: resubmitting the same cart creates a second order.
    pub async fn place_order(&self, user: &User, new_order: NewOrder) -> Result<Order> {
        if new_order.order_items.is_empty() {
            return Err(AppError::EmptyOrder);
        }
        for item in &new_order.order_items {
            validate_item(item)?;
        }
        if !new_order.total_price.is_finite() || new_order.total_price < 0.0 {
            return Err(AppError::Validation("Invalid total price".into()));
        }
        if self.verify_totals {
            let expected = items_total(&new_order.order_items);
            if (expected - new_order.total_price).abs() > TOTAL_TOLERANCE {
                return Err(AppError::Validation(format!(
                    "Total price {} does not match order items ({})",
                    new_order.total_price, expected
                )));
            }
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            buyer: user.id.clone(),
            order_items: new_order.order_items,
            total_price: new_order.total_price,
            is_paid: false,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_order(&order).await?;
        log::info!("User {} placed order {} ({})", user.id, order.id, order.total_price);

        self.broadcaster.broadcast(NewOrderEvent {
            message: format!("New Order Received! Value: {} {}", self.currency, order.total_price),
            order_id: order.id.clone(),
        });

        Ok(order)
    }

    /// The user's orders, newest first.
    pub async fn my_orders(&self, user: &User) -> Result<Vec<Order>> {
        let mut orders = self.store.list_orders_by_buyer(&user.id).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}
