//! Domain layer - Core business entities and logic
//!
//! Users with their ownership sets, catalog books with their file records,
//! carts, and the capability model used by the authorization gate.
//! No infrastructure dependencies beyond error types.

pub mod book;
pub mod cart;
pub mod file;
pub mod password;
pub mod principal;
pub mod user;

pub use book::{Book, BookResponse, NewBook, UpdateBook};
pub use cart::{Cart, CartItem, CartItemResponse, CartResponse};
pub use file::{FileDownload, FileRecord, UploadedFile};
pub use password::Password;
pub use principal::{Capability, CurrentUser};
pub use user::{NewUser, User, UserRole};
