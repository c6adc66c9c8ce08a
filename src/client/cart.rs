use super::storage::{LocalStorage, StorageError};
use crate::models::{NewOrder, OrderItem, Product};
use serde::{Deserialize, Serialize};

pub const CART_KEY: &str = "cart";

/// A cart line. Name and price are copied when the product is first added
/// and are not refreshed if the catalog changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub qty: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    fn from_product(product: &Product) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            qty: 1,
            category: Some(product.category.clone()),
            image: product.image.clone(),
        }
    }
}

/// Client-side cart, written back to storage on every change. A change the
/// storage refuses is not applied.
///
/// Stock levels are not consulted; the cart accepts any quantity.
pub struct Cart<S: LocalStorage> {
    storage: S,
    items: Vec<CartItem>,
}

impl<S: LocalStorage> Cart<S> {
    /// Restores the cart saved in `storage`, or starts empty.
    pub fn load(storage: S) -> Result<Self, StorageError> {
        let items = match storage.get_item(CART_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        Ok(Cart { storage, items })
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, product: &Product) -> Result<(), StorageError> {
        let mut items = self.items.clone();
        match items.iter_mut().find(|i| i.product_id == product.id) {
            Some(existing) => existing.qty += 1,
            None => items.push(CartItem::from_product(product)),
        }
        self.replace(items)?;
        log::debug!("{} added to cart", product.name);
        Ok(())
    }

    /// Drops the entry for `product_id`; unknown ids are ignored.
    pub fn remove(&mut self, product_id: &str) -> Result<(), StorageError> {
        let items = self
            .items
            .iter()
            .filter(|i| i.product_id != product_id)
            .cloned()
            .collect();
        self.replace(items)
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.replace(Vec::new())
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.price * i.qty as f64).sum()
    }

    /// The order body for checking out this cart, `None` when there is
    /// nothing to buy.
    pub fn checkout_request(&self) -> Option<NewOrder> {
        if self.items.is_empty() {
            return None;
        }
        Some(NewOrder {
            order_items: self
                .items
                .iter()
                .map(|i| OrderItem {
                    product: i.product_id.clone(),
                    name: i.name.clone(),
                    qty: i.qty,
                    price: i.price,
                })
                .collect(),
            total_price: self.total(),
        })
    }

    /// Writes `items` to storage and only then adopts them, so a failed
    /// write leaves the in-memory cart matching what was last saved.
    fn replace(&mut self, items: Vec<CartItem>) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&items)?;
        self.storage.set_item(CART_KEY, &raw)?;
        self.items = items;
        Ok(())
    }
}
