//! Authorization gate.
//!
//! Resolves the caller behind a verified principal and enforces the
//! role-based and ownership-based checks the book and cart services rely on.

use std::sync::Arc;

use crate::domain::{Capability, CurrentUser, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;

/// Message returned when a caller asks for a book they do not own
pub const PURCHASE_REQUIRED: &str = "You must purchase this book before downloading";

#[derive(Clone)]
pub struct AccessGate {
    users: Arc<dyn UserRepository>,
}

impl AccessGate {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Role check only; no storage access.
    pub fn authorize(principal: &CurrentUser, capability: Capability) -> AppResult<()> {
        if principal.can(capability) {
            Ok(())
        } else {
            tracing::debug!(email = %principal.email, ?capability, "Capability denied");
            Err(AppError::Forbidden)
        }
    }

    /// Check the capability, then load the caller's account.
    pub async fn resolve(&self, principal: &CurrentUser, capability: Capability) -> AppResult<User> {
        Self::authorize(principal, capability)?;

        self.users
            .find_by_email(&principal.email)
            .await?
            .ok_or_user_not_found()
    }

    /// Fail unless the book is in the user's ownership set.
    pub fn ensure_owns(user: &User, book_id: i64) -> AppResult<()> {
        if user.has_purchased(book_id) {
            Ok(())
        } else {
            Err(AppError::access_denied(PURCHASE_REQUIRED))
        }
    }
}
