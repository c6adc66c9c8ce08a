pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod orders;
pub mod routes;
pub mod store;

pub use config::Config;
pub use error::{AppError, Result};
pub use routes::{configure, cors, AppState};

use std::sync::Arc;

/// Picks the backing store named by `DATABASE_URL`.
pub async fn open_store(config: &Config) -> Result<Arc<dyn store::Store>> {
    if config.uses_memory_store() {
        log::warn!("Using the in-memory store, data is lost on restart");
        return Ok(Arc::new(store::MemoryStore::new()));
    }
    let database = db::connect(&config.database_url, &config.database_name).await?;
    Ok(Arc::new(db::MongoStore::new(&database).await?))
}
