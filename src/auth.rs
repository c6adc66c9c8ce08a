//! Registration, login and bearer-token handling.

use crate::config::MAX_TOKEN_TTL_HOURS;
use crate::error::{AppError, Result};
use crate::models::{AuthResponse, Claims, SignInInput, SignUpInput, User, UserProfile};
use crate::store::Store;
use argon2::{self, Config as ArgonConfig};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

pub fn hash_password(password: &str) -> Result<String> {
    let salt: [u8; 16] = rand::thread_rng().gen();
    let config = ArgonConfig::default();
    argon2::hash_encoded(password.as_bytes(), &salt, &config).map_err(|e| {
        log::error!("Password hashing failed: {}", e);
        AppError::Internal(format!("password hashing failed: {}", e))
    })
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    argon2::verify_encoded(hash, password.as_bytes()).unwrap_or(false)
}

/// Signs and checks HS256 tokens carrying the user id.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// `ttl_hours` is clamped to `1..=MAX_TOKEN_TTL_HOURS`.
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        TokenIssuer {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
            ttl: Duration::hours(ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS)),
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal("token expiry overflow".into()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            log::error!("Failed to encode token: {}", e);
            AppError::Internal(format!("token encoding failed: {}", e))
        })
    }

    /// Checks signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Token rejected: {}", e);
                AppError::Unauthorized("Not authorized, token failed".into())
            })
    }
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        AuthService { store, tokens }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn register(&self, input: SignUpInput) -> Result<AuthResponse> {
        let name = input.name.trim();
        let email = input.email.trim().to_lowercase();
        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AppError::Validation("Please add all fields".into()));
        }

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            password: hash_password(&input.password)?,
            is_admin: false,
            created_at: Utc::now(),
        };
        // The store enforces uniqueness again for registrations racing past the lookup
        self.store.insert_user(&user).await?;
        log::info!("Registered user {}", user.id);

        self.respond(&user)
    }

    pub async fn login(&self, input: SignInInput) -> Result<AuthResponse> {
        let email = input.email.trim().to_lowercase();
        match self.store.find_user_by_email(&email).await? {
            Some(user) if verify_password(&user.password, &input.password) => {
                log::info!("User {} logged in", user.id);
                self.respond(&user)
            }
            _ => Err(AppError::InvalidCredentials),
        }
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.tokens.verify(token)?;
        self.resolve(&claims).await
    }

    pub async fn resolve(&self, claims: &Claims) -> Result<User> {
        self.store
            .find_user_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Not authorized, user not found".into()))
    }

    fn respond(&self, user: &User) -> Result<AuthResponse> {
        Ok(AuthResponse {
            profile: UserProfile::from(user),
            token: self.tokens.issue(&user.id)?,
        })
    }
}
