//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, book_handler, cart_handler, user_handler};
use crate::domain::{BookResponse, CartItemResponse, CartResponse, NewBook, UpdateBook, UserRole};
use crate::services::TokenResponse;
use crate::types::ApiResponse;

/// OpenAPI documentation for the Books API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Books API",
        version = "0.1.0",
        description = "Digital bookstore: catalog, purchases, carts and purchase-gated downloads",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        // Catalog endpoints
        book_handler::list_books,
        book_handler::get_book,
        book_handler::add_book,
        book_handler::update_book,
        book_handler::delete_book,
        book_handler::update_book_file,
        book_handler::purchase_book,
        book_handler::download_book,
        // Cart endpoints
        cart_handler::list_cart,
        cart_handler::add_to_cart,
        cart_handler::remove_from_cart,
        cart_handler::clear_cart,
        cart_handler::purchase_from_cart,
        // Library endpoints
        user_handler::purchased_books,
    ),
    components(
        schemas(
            ApiResponse,
            // Domain types
            UserRole,
            BookResponse,
            NewBook,
            UpdateBook,
            CartResponse,
            CartItemResponse,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User registration and login"),
        (name = "Books", description = "Catalog, purchases and file transfer"),
        (name = "Cart", description = "Per-user shopping cart"),
        (name = "Users", description = "Purchased library")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
