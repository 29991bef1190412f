//! Personal library handlers.

use axum::{extract::State, routing::get, Router};

use crate::api::AppState;
use crate::domain::{BookResponse, CurrentUser};
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/my/books", get(purchased_books))
}

/// List the caller's purchased books
#[utoipa::path(
    get,
    path = "/user/my/books",
    tag = "Users",
    responses(
        (status = 200, description = "data.purchased_books holds every owned book", body = ApiResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn purchased_books(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<ApiResponse> {
    let books: Vec<BookResponse> = state
        .user_service
        .purchased_books(&user)
        .await?
        .into_iter()
        .map(BookResponse::from)
        .collect();

    ApiResponse::success("purchased_books", books)
}
