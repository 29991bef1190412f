//! Service Container - Centralized service access.
//!
//! Handlers depend on the `ServiceContainer` trait rather than concrete
//! services; `AppState` is built from any implementation.

use std::sync::Arc;

use super::{AuthService, BookService, CartService, UserService};
use crate::config::Config;
use crate::infra::{FileStorage, Persistence};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get catalog and ownership service
    fn books(&self) -> Arc<dyn BookService>;

    /// Get cart service
    fn carts(&self) -> Arc<dyn CartService>;

    /// Get user library service
    fn users(&self) -> Arc<dyn UserService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    book_service: Arc<dyn BookService>,
    cart_service: Arc<dyn CartService>,
    user_service: Arc<dyn UserService>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        book_service: Arc<dyn BookService>,
        cart_service: Arc<dyn CartService>,
        user_service: Arc<dyn UserService>,
    ) -> Self {
        Self {
            auth_service,
            book_service,
            cart_service,
            user_service,
        }
    }

    /// Create service container from database connection, config and file storage
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        storage: Arc<dyn FileStorage>,
    ) -> Self {
        use super::{Authenticator, BookManager, CartManager, UserManager};

        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            book_service: Arc::new(BookManager::new(uow.clone(), storage)),
            cart_service: Arc::new(CartManager::new(uow.clone())),
            user_service: Arc::new(UserManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn books(&self) -> Arc<dyn BookService> {
        self.book_service.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.cart_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }
}
