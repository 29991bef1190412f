//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and runs multi-aggregate workflows
//! (registration, cart checkout) inside a single database transaction.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};

use super::repositories::{
    BookRepository, BookStore, CartRepository, CartStore, UserRepository, UserStore,
};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by transaction closures
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Note: This trait is not mockable directly due to generic methods.
/// Tests provide their own implementation backed by mock or in-memory repositories.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get book repository
    fn books(&self) -> Arc<dyn BookRepository>;

    /// Get cart repository
    fn carts(&self) -> Arc<dyn CartRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Committed when the closure returns `Ok`, rolled back on `Err`.
    /// Uses ReadCommitted isolation.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repositories bound to one open transaction.
pub trait TransactionScope: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn carts(&self) -> &dyn CartRepository;
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same transaction.
#[derive(Clone, Copy)]
pub struct TransactionContext<'a> {
    scope: &'a dyn TransactionScope,
}

impl<'a> TransactionContext<'a> {
    pub fn new(scope: &'a dyn TransactionScope) -> Self {
        Self { scope }
    }

    /// Get user repository for this transaction
    pub fn users(&self) -> &'a dyn UserRepository {
        let scope: &'a dyn TransactionScope = self.scope;
        scope.users()
    }

    /// Get cart repository for this transaction
    pub fn carts(&self) -> &'a dyn CartRepository {
        let scope: &'a dyn TransactionScope = self.scope;
        scope.carts()
    }
}

/// Stores sharing one SeaORM transaction
struct TxStores {
    users: UserStore<DatabaseTransaction>,
    carts: CartStore<DatabaseTransaction>,
}

impl TransactionScope for TxStores {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn carts(&self) -> &dyn CartRepository {
        &self.carts
    }
}

/// SeaORM-backed implementation of UnitOfWork
pub struct Persistence {
    db: Arc<DatabaseConnection>,
    user_repo: Arc<UserStore>,
    book_repo: Arc<BookStore>,
    cart_repo: Arc<CartStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let db = Arc::new(db);
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            book_repo: Arc::new(BookStore::new(db.clone())),
            cart_repo: Arc::new(CartStore::new(db.clone())),
            db,
        }
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = Arc::new(
            self.db
                .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
                .await?,
        );

        let stores = TxStores {
            users: UserStore::new(txn.clone()),
            carts: CartStore::new(txn.clone()),
        };

        let result = f(TransactionContext::new(&stores)).await;
        drop(stores);

        // Dropping an unfinished transaction rolls it back
        let txn = Arc::try_unwrap(txn)
            .map_err(|_| AppError::internal("Transaction still referenced after completion"))?;

        match result {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn books(&self) -> Arc<dyn BookRepository> {
        self.book_repo.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.cart_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f).await
    }
}

/// Simpler API for executing transactional operations.
///
/// This helper macro reduces boilerplate when using transactions.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
