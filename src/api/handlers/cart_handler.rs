//! Cart handlers, scoped to the authenticated caller.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Router,
};

use crate::api::AppState;
use crate::domain::{BookResponse, CartResponse, CurrentUser};
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// Create cart routes
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cart))
        .route("/add/:book_id", post(add_to_cart))
        .route("/delete/:book_id", delete(remove_from_cart))
        .route("/clear", delete(clear_cart))
        .route("/purchase", post(purchase_from_cart))
}

/// Show the caller's cart
#[utoipa::path(
    get,
    path = "/user/cart",
    tag = "Cart",
    responses(
        (status = 200, description = "data.cart holds a CartResponse", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Cart not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_cart(State(state): State<AppState>, user: CurrentUser) -> AppResult<ApiResponse> {
    let cart = state.cart_service.list_cart(&user).await?;
    ApiResponse::success("cart", CartResponse::from(cart))
}

/// Put a book in the cart
#[utoipa::path(
    post,
    path = "/user/cart/add/{book_id}",
    tag = "Cart",
    params(("book_id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book added to cart", body = ApiResponse),
        (status = 404, description = "Book or cart not found"),
        (status = 409, description = "Book already purchased or already in cart")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(book_id): Path<i64>,
) -> AppResult<ApiResponse> {
    let book = state.cart_service.add_to_cart(&user, book_id).await?;
    ApiResponse::message("Book added to cart").with_data("book", BookResponse::from(book))
}

/// Take a book out of the cart
#[utoipa::path(
    delete,
    path = "/user/cart/delete/{book_id}",
    tag = "Cart",
    params(("book_id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book removed from cart", body = ApiResponse),
        (status = 409, description = "Book not in cart")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(book_id): Path<i64>,
) -> AppResult<ApiResponse> {
    state.cart_service.remove_from_cart(&user, book_id).await?;
    ApiResponse::message("Book removed from cart").with_data("book_id", book_id)
}

/// Empty the cart
#[utoipa::path(
    delete,
    path = "/user/cart/clear",
    tag = "Cart",
    responses(
        (status = 200, description = "Cart cleared", body = ApiResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_cart(State(state): State<AppState>, user: CurrentUser) -> AppResult<ApiResponse> {
    state.cart_service.clear_cart(&user).await?;
    Ok(ApiResponse::message("Cart cleared"))
}

/// Buy everything in the cart
#[utoipa::path(
    post,
    path = "/user/cart/purchase",
    tag = "Cart",
    responses(
        (status = 200, description = "data.purchased_books holds every owned book", body = ApiResponse),
        (status = 409, description = "Cart is empty")
    ),
    security(("bearer_auth" = []))
)]
pub async fn purchase_from_cart(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<ApiResponse> {
    let books: Vec<BookResponse> = state
        .cart_service
        .purchase_from_cart(&user)
        .await?
        .into_iter()
        .map(BookResponse::from)
        .collect();

    ApiResponse::message("Purchase success").with_data("purchased_books", books)
}
