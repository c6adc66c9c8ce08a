use crate::error::{AppError, Result};
use std::env;

/// `DATABASE_URL` value that selects the in-process store instead of MongoDB.
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Upper bound for `JWT_EXPIRES_IN_HOURS` (ten years).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub broadcast_capacity: usize,
    pub currency: String,
    pub verify_order_totals: bool,
    /// Browser origins allowed to call the API; `*` allows any.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load environment variables from .env file
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("{} must be set", key)))
        };
        let optional =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = optional("PORT", "5000")
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("Invalid PORT: {}", e)))?;
        let token_ttl_hours = optional("JWT_EXPIRES_IN_HOURS", "720")
            .parse::<i64>()
            .map_err(|e| AppError::Config(format!("Invalid JWT_EXPIRES_IN_HOURS: {}", e)))?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            return Err(AppError::Config(format!(
                "JWT_EXPIRES_IN_HOURS must be between 1 and {}",
                MAX_TOKEN_TTL_HOURS
            )));
        }
        let broadcast_capacity = optional("BROADCAST_CAPACITY", "64")
            .parse::<usize>()
            .map_err(|e| AppError::Config(format!("Invalid BROADCAST_CAPACITY: {}", e)))?;
        if broadcast_capacity == 0 {
            return Err(AppError::Config("BROADCAST_CAPACITY must be at least 1".into()));
        }
        let verify_order_totals = optional("VERIFY_ORDER_TOTALS", "false")
            .parse::<bool>()
            .map_err(|e| AppError::Config(format!("Invalid VERIFY_ORDER_TOTALS: {}", e)))?;
        let cors_origins: Vec<String> = optional("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Config {
            host: optional("HOST", "127.0.0.1"),
            port,
            database_url: required("DATABASE_URL")?,
            database_name: optional("DATABASE_NAME", "marketplace"),
            jwt_secret: required("JWT_SECRET")?,
            token_ttl_hours,
            broadcast_capacity,
            currency: optional("CURRENCY", "KSh"),
            verify_order_totals,
            cors_origins,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
