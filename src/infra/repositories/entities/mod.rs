//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod book;
pub mod book_file;
pub mod cart;
pub mod cart_item;
pub mod user;
pub mod user_purchase;
