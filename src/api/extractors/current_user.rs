//! Principal extractors for handlers behind `auth_middleware`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::domain::{Capability, CurrentUser};
use crate::errors::AppError;
use crate::services::AccessGate;

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Principal allowed to manage the catalog; rejects everyone else with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        AccessGate::authorize(&user, Capability::ManageCatalog)?;
        Ok(AdminUser(user))
    }
}
