//! Catalog, purchase and file transfer handlers.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};

use crate::api::extractors::{AdminUser, ValidatedJson};
use crate::api::AppState;
use crate::config::UPLOAD_FIELD_NAME;
use crate::domain::{BookResponse, CurrentUser, NewBook, UpdateBook, UploadedFile};
use crate::errors::{AppError, AppResult};
use crate::types::{ApiResponse, Created};

/// Create book routes
pub fn book_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(list_books).post(add_book))
        .route(
            "/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route(
            "/:id/file",
            patch(update_book_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/:id/purchase", post(purchase_book))
        .route("/:id/download", get(download_book))
}

/// List the catalog
#[utoipa::path(
    get,
    path = "/books",
    tag = "Books",
    responses(
        (status = 200, description = "data.books holds every BookResponse", body = ApiResponse)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<ApiResponse> {
    let books: Vec<BookResponse> = state
        .book_service
        .list_books()
        .await?
        .into_iter()
        .map(BookResponse::from)
        .collect();

    ApiResponse::success("books", books)
}

/// Get a single book
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "data.book holds a BookResponse", body = ApiResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<ApiResponse> {
    let book = state.book_service.get_book(id).await?;
    ApiResponse::success("book", BookResponse::from(book))
}

/// Add a book (admin only)
#[utoipa::path(
    post,
    path = "/books",
    tag = "Books",
    request_body = NewBook,
    responses(
        (status = 201, description = "Book created", body = ApiResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_book(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidatedJson(payload): ValidatedJson<NewBook>,
) -> AppResult<Created> {
    let book = state.book_service.add_book(&admin, payload).await?;
    Ok(Created(ApiResponse::success("book", BookResponse::from(book))?))
}

/// Update a book; absent fields keep their value (admin only)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = ApiResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Book not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_book(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateBook>,
) -> AppResult<ApiResponse> {
    let book = state.book_service.update_book(&admin, id, payload).await?;
    ApiResponse::success("book", BookResponse::from(book))
}

/// Delete a book and its file (admin only)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted; data.book holds the deleted book", body = ApiResponse),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Book not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse> {
    let book = state.book_service.delete_book(&admin, id).await?;
    ApiResponse::message("Book deleted").with_data("book", BookResponse::from(book))
}

/// Upload or replace a book's PDF (admin only)
#[utoipa::path(
    patch,
    path = "/books/{id}/file",
    tag = "Books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body(
        content = Vec<u8>,
        content_type = "multipart/form-data",
        description = "PDF in the `file` field"
    ),
    responses(
        (status = 200, description = "File stored", body = ApiResponse),
        (status = 400, description = "Missing, empty or non-PDF file"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Book not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_book_file(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<ApiResponse> {
    let file = read_upload(multipart).await?;
    let book = state.book_service.update_book_file(&admin, id, file).await?;
    ApiResponse::success("book", BookResponse::from(book))
}

/// Purchase a book
#[utoipa::path(
    post,
    path = "/books/{id}/purchase",
    tag = "Books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book owned by the caller", body = ApiResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Book or user not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn purchase_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse> {
    let book = state.book_service.purchase_book(&user, id).await?;
    ApiResponse::message("Book purchased").with_data("book", BookResponse::from(book))
}

/// Download a purchased book's file
#[utoipa::path(
    get,
    path = "/books/{id}/download",
    tag = "Books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Raw file content with Content-Disposition attachment"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Book not purchased"),
        (status = 404, description = "Book or file not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let download = state.book_service.download_book(&user, id).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        download.file_name.replace('"', "")
    );

    Ok((
        [(CONTENT_TYPE, download.content_type), (CONTENT_DISPOSITION, disposition)],
        download.content,
    )
        .into_response())
}

/// Pull the `file` field out of a multipart body; other fields are ignored.
async fn read_upload(mut multipart: Multipart) -> AppResult<Option<UploadedFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_argument(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::invalid_argument(e.body_text()))?;

        return Ok(Some(UploadedFile::new(file_name, content_type, bytes.to_vec())));
    }

    Ok(None)
}
