//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

pub mod access_gate;
mod auth_service;
mod book_service;
mod cart_service;
pub mod container;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Authorization
pub use access_gate::{AccessGate, PURCHASE_REQUIRED};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use book_service::{BookManager, BookService};
pub use cart_service::{CartManager, CartService};
pub use user_service::{UserManager, UserService};

