//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::{Config, DEFAULT_MAX_UPLOAD_BYTES};
use crate::infra::{Database, FileStorage};
use crate::services::{
    AuthService, BookService, CartService, ServiceContainer, Services, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Catalog and ownership service
    pub book_service: Arc<dyn BookService>,
    /// Cart service
    pub cart_service: Arc<dyn CartService>,
    /// User library service
    pub user_service: Arc<dyn UserService>,
    /// Database connection
    pub database: Arc<Database>,
    /// Request body limit for file uploads
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create application state from database connection, file storage and config.
    pub fn from_config(
        database: Arc<Database>,
        storage: Arc<dyn FileStorage>,
        config: Config,
    ) -> Self {
        let max_upload_bytes = config.max_upload_bytes;
        let container = Services::from_connection(database.get_connection(), config, storage);

        Self::new(&container, database).with_upload_limit(max_upload_bytes)
    }

    /// Create application state from any service container.
    pub fn new(services: &dyn ServiceContainer, database: Arc<Database>) -> Self {
        Self {
            auth_service: services.auth(),
            book_service: services.books(),
            cart_service: services.carts(),
            user_service: services.users(),
            database,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
