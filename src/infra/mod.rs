//! Infrastructure layer - External systems integration
//!
//! - Database connection, schema migrations and repositories
//! - Local file storage for book content
//! - Unit of Work for transaction management

pub mod db;
pub mod repositories;
pub mod storage;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    BookRepository, BookStore, CartRepository, CartStore, UserRepository, UserStore,
};
pub use storage::{FileStorage, LocalFileStorage};
pub use unit_of_work::{Persistence, TransactionContext, TransactionScope, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockBookRepository, MockCartRepository, MockUserRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use storage::MockFileStorage;
