//! User service - the caller's personal library.

use async_trait::async_trait;
use std::sync::Arc;

use super::access_gate::AccessGate;
use crate::domain::{Book, Capability, CurrentUser};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Books the caller has purchased
    async fn purchased_books(&self, principal: &CurrentUser) -> AppResult<Vec<Book>>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    gate: AccessGate,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        let gate = AccessGate::new(uow.users());
        Self { uow, gate }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn purchased_books(&self, principal: &CurrentUser) -> AppResult<Vec<Book>> {
        let user = self.gate.resolve(principal, Capability::ViewLibrary).await?;
        self.uow.users().purchased_books(user.id).await
    }
}
