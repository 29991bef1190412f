//! Authentication service - registration, login and bearer tokens.
//!
//! Password handling lives in the domain `Password` value object; this
//! service only orchestrates it with the Unit of Work and JWT encoding.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{CurrentUser, NewUser, Password, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account email
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Principal carried by a verified token
    pub fn principal(&self) -> CurrentUser {
        CurrentUser::new(self.sub.clone(), UserRole::from(self.role.as_str()))
    }
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new USER together with an empty cart
    async fn register(
        &self,
        firstname: String,
        lastname: String,
        email: String,
        password: String,
    ) -> AppResult<TokenResponse>;

    /// Login and return JWT token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Create the ADMIN account if the email is unknown. Returns true if created.
    async fn ensure_admin(&self, email: String, password: String) -> AppResult<bool>;
}

/// Generate JWT token for a user (shared helper to avoid duplication)
fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.email.clone(),
        role: user.role.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Verify JWT token and extract claims (shared helper)
fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        AppError::Unauthorized
    })?;

    Ok(token_data.claims)
}

fn require_name(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(field, format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    /// Persist the user and their cart in one transaction
    async fn create_account(&self, new_user: NewUser) -> AppResult<User> {
        with_transaction!(self.uow, |ctx| {
            let user = ctx.users().create(new_user).await?;
            ctx.carts().create_for_user(user.id).await?;
            Ok(user)
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(
        &self,
        firstname: String,
        lastname: String,
        email: String,
        password: String,
    ) -> AppResult<TokenResponse> {
        // Email format is validated by the handler's ValidatedJson extractor
        require_name("firstname", &firstname)?;
        require_name("lastname", &lastname)?;

        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User already exists"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .create_account(NewUser {
                email,
                password_hash,
                firstname,
                lastname,
                role: UserRole::User,
            })
            .await?;

        tracing::info!(user_id = user.id, email = %user.email, "User registered");
        generate_token(&user, &self.config)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self.uow.users().find_by_email(&email).await?;

        // Unknown emails still pay for one hash verification
        let stored = user.as_ref().map(|u| u.password_hash.as_str());
        if !Password::verify_stored(stored, &password) {
            return Err(AppError::InvalidCredentials);
        }

        let user = user.ok_or(AppError::InvalidCredentials)?;
        generate_token(&user, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    async fn ensure_admin(&self, email: String, password: String) -> AppResult<bool> {
        if self.uow.users().find_by_email(&email).await?.is_some() {
            tracing::debug!(email = %email, "Admin account already present");
            return Ok(false);
        }

        let password_hash = Password::new(&password)?.into_string();
        let admin = self
            .create_account(NewUser {
                email,
                password_hash,
                firstname: "Admin".to_string(),
                lastname: "Admin".to_string(),
                role: UserRole::Admin,
            })
            .await?;

        tracing::info!(user_id = admin.id, email = %admin.email, "Admin account created");
        Ok(true)
    }
}
