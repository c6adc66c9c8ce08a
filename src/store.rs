use crate::error::{AppError, Result};
use crate::models::{Order, Product, User};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Persistence operations the services rely on.
///
/// Implemented by the MongoDB store in `db` and by `MemoryStore`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a user, failing with `DuplicateEmail` if the email is taken.
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn insert_product(&self, product: &Product) -> Result<()>;
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn list_products_by_owner(&self, owner: &str) -> Result<Vec<Product>>;
    async fn find_product(&self, id: &str) -> Result<Option<Product>>;
    /// Returns whether a product was actually removed.
    async fn delete_product(&self, id: &str) -> Result<bool>;

    async fn insert_order(&self, order: &Order) -> Result<()>;
    async fn list_orders_by_buyer(&self, buyer: &str) -> Result<Vec<Order>>;
}

/// In-process store. Insertion order is preserved for listings.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    products: RwLock<Vec<Product>>,
    orders: RwLock<Vec<Order>>,
    emails: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_count(&self) -> usize {
        self.orders.read().len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut emails = self.emails.write();
        if emails.contains_key(&user.email) {
            return Err(AppError::DuplicateEmail);
        }
        emails.insert(user.email.clone(), user.id.clone());
        self.users.write().push(user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.products.write().push(product.clone());
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.products.read().clone())
    }

    async fn list_products_by_owner(&self, owner: &str) -> Result<Vec<Product>> {
        Ok(self
            .products
            .read()
            .iter()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect())
    }

    async fn find_product(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.products.read().iter().find(|p| p.id == id).cloned())
    }

    async fn delete_product(&self, id: &str) -> Result<bool> {
        let mut products = self.products.write();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.orders.write().push(order.clone());
        Ok(())
    }

    async fn list_orders_by_buyer(&self, buyer: &str) -> Result<Vec<Order>> {
        Ok(self
            .orders
            .read()
            .iter()
            .filter(|o| o.buyer == buyer)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: &str, email: &str) -> User {
        User {
            id: id.into(),
            name: id.into(),
            email: email.into(),
            password: "hash".into(),
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    fn product(id: &str, owner: &str) -> Product {
        let now = Utc::now();
        Product {
            id: id.into(),
            owner: owner.into(),
            name: "Tomatoes".into(),
            image: None,
            description: "Fresh".into(),
            category: "Vegetables".into(),
            price: 50.0,
            stock: 10,
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_web::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.insert_user(&user("a", "a@example.com")).await.unwrap();
        let err = store.insert_user(&user("b", "a@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
        assert!(store.find_user_by_id("b").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn second_delete_reports_nothing_removed() {
        let store = MemoryStore::new();
        store.insert_product(&product("p1", "a")).await.unwrap();
        assert!(store.delete_product("p1").await.unwrap());
        assert!(!store.delete_product("p1").await.unwrap());
    }

    #[actix_web::test]
    async fn owner_listing_filters_other_sellers() {
        let store = MemoryStore::new();
        store.insert_product(&product("p1", "a")).await.unwrap();
        store.insert_product(&product("p2", "b")).await.unwrap();
        let mine = store.list_products_by_owner("a").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "p1");
        assert_eq!(store.list_products().await.unwrap().len(), 2);
    }
}
