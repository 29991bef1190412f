//! HTTP request handlers.

pub mod auth_handler;
pub mod book_handler;
pub mod cart_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use book_handler::book_routes;
pub use cart_handler::cart_routes;
pub use user_handler::user_routes;
