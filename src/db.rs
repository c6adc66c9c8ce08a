use crate::error::{AppError, Result};
use crate::models::{Order, Product, User};
use crate::store::Store;
use async_trait::async_trait;
use futures::stream::StreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Cursor, Database, IndexModel};
use serde::de::DeserializeOwned;

const DUPLICATE_KEY: i32 = 11000;

pub async fn connect(database_url: &str, database_name: &str) -> Result<Database> {
    // Parse the connection string into client options
    let client_options = ClientOptions::parse(database_url).await?;

    // Initialize the MongoDB client
    let client = Client::with_options(client_options)?;

    log::info!("Connected to MongoDB database {}", database_name);
    Ok(client.database(database_name))
}

pub struct MongoStore {
    users: Collection<User>,
    products: Collection<Product>,
    orders: Collection<Order>,
}

impl MongoStore {
    /// Opens the collections and makes sure the unique email index exists.
    pub async fn new(db: &Database) -> Result<Self> {
        let users = db.collection::<User>("users");
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users.create_index(index, None).await?;

        Ok(MongoStore {
            users,
            products: db.collection::<Product>("products"),
            orders: db.collection::<Order>("orders"),
        })
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

async fn collect<T>(mut cursor: Cursor<T>) -> Result<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut items = vec![];
    while let Some(result) = cursor.next().await {
        items.push(result?);
    }
    Ok(items)
}

async fn find_all<T>(collection: &Collection<T>, filter: Document) -> Result<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let cursor = collection.find(filter, None).await?;
    collect(cursor).await
}

#[async_trait]
impl Store for MongoStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        match self.users.insert_one(user, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(AppError::DuplicateEmail),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.find_one(doc! { "email": email }, None).await?)
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.find_one(doc! { "_id": id }, None).await?)
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.products.insert_one(product, None).await?;
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        find_all(&self.products, doc! {}).await
    }

    async fn list_products_by_owner(&self, owner: &str) -> Result<Vec<Product>> {
        find_all(&self.products, doc! { "user": owner }).await
    }

    async fn find_product(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.products.find_one(doc! { "_id": id }, None).await?)
    }

    async fn delete_product(&self, id: &str) -> Result<bool> {
        let result = self.products.delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count == 1)
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.orders.insert_one(order, None).await?;
        Ok(())
    }

    async fn list_orders_by_buyer(&self, buyer: &str) -> Result<Vec<Order>> {
        find_all(&self.orders, doc! { "user": buyer }).await
    }
}
