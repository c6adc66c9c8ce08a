use crate::error::{AppError, Result};
use crate::models::{Product, ProductInput, User};
use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

fn invalid(reason: &str) -> AppError {
    AppError::Validation(format!("Invalid product data: {}", reason))
}

fn required_text(value: Option<String>, field: &str) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(invalid(&format!("{} is required", field))),
    }
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        CatalogService { store }
    }

    /// Every product, unfiltered. Search and category filtering happen client side.
    pub async fn list(&self) -> Result<Vec<Product>> {
        self.store.list_products().await
    }

    pub async fn list_mine(&self, user: &User) -> Result<Vec<Product>> {
        self.store.list_products_by_owner(&user.id).await
    }

    pub async fn create(&self, user: &User, input: ProductInput) -> Result<Product> {
        let name = required_text(input.name, "name")?;
        let description = required_text(input.description, "description")?;
        let category = required_text(input.category, "category")?;
        let price = input.price.ok_or_else(|| invalid("price is required"))?;
        let stock = input.stock.ok_or_else(|| invalid("stock is required"))?;
        if !price.is_finite() || price < 0.0 {
            return Err(invalid("price must not be negative"));
        }
        if stock < 0 {
            return Err(invalid("stock must not be negative"));
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            owner: user.id.clone(),
            name,
            image: input.image.filter(|i| !i.trim().is_empty()),
            description,
            category,
            price,
            stock,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_product(&product).await?;
        log::info!("User {} listed product {}", user.id, product.id);
        Ok(product)
    }

    /// Removes a product owned by `user`.
    ///
    /// Two racing deletes of the same product both pass the ownership check;
    /// whichever reaches the store second gets `NotFound`.
    pub async fn delete(&self, user: &User, product_id: &str) -> Result<()> {
        let product = self
            .store
            .find_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

        if product.owner != user.id {
            return Err(AppError::Forbidden("Not authorized to delete this product".into()));
        }

        if !self.store.delete_product(product_id).await? {
            return Err(AppError::NotFound("Product not found".into()));
        }
        log::info!("User {} removed product {}", user.id, product_id);
        Ok(())
    }
}
