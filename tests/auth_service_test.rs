//! Authentication and library service tests over the in-memory Unit of Work.

mod common;

use books_api::config::Config;
use books_api::domain::UserRole;
use books_api::errors::AppError;
use books_api::infra::CartRepository;
use books_api::services::{AuthService, Authenticator, UserManager, UserService};

use common::{price, principal, MemoryUow, PASSWORD};

fn config() -> Config {
    Config::new(
        "postgres://localhost/books_test",
        "test-secret-key-that-is-at-least-32-chars",
    )
}

#[tokio::test]
async fn test_register_creates_user_with_cart_and_token() {
    let uow = MemoryUow::new();
    let auth = Authenticator::new(uow.clone(), config());

    let token = auth
        .register(
            "Jane".to_string(),
            "Doe".to_string(),
            "jane@example.com".to_string(),
            "LongEnough1".to_string(),
        )
        .await
        .unwrap();

    let claims = auth.verify_token(&token.access_token).unwrap();
    assert_eq!(claims.sub, "jane@example.com");
    assert_eq!(claims.role, "USER");

    let user = uow.store.user("jane@example.com").unwrap();
    assert_eq!(user.role, UserRole::User);
    assert_ne!(user.password_hash, "LongEnough1");

    let cart = uow.store.find_by_user_id(user.id).await.unwrap();
    assert!(cart.is_some_and(|c| c.is_empty()));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let uow = MemoryUow::new();
    uow.seed_user("jane@example.com", UserRole::User).await;
    let auth = Authenticator::new(uow.clone(), config());

    let err = auth
        .register(
            "Jane".to_string(),
            "Doe".to_string(),
            "jane@example.com".to_string(),
            "LongEnough1".to_string(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(ref m) if m == "User already exists"));
}

#[tokio::test]
async fn test_register_racing_duplicate_is_a_conflict() {
    let uow = MemoryUow::new();
    uow.seed_user("jane@example.com", UserRole::User).await;
    let auth = Authenticator::new(uow.clone(), config());

    // The pre-check misses, so the insert itself hits the unique email
    uow.store.hide_next_user_lookup();
    let err = auth
        .register(
            "Jane".to_string(),
            "Doe".to_string(),
            "jane@example.com".to_string(),
            "LongEnough1".to_string(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(ref m) if m == "User already exists"));
    assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let uow = MemoryUow::new();
    let auth = Authenticator::new(uow.clone(), config());

    let err = auth
        .register(
            "Jane".to_string(),
            "Doe".to_string(),
            "jane@example.com".to_string(),
            "short".to_string(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(ref fields) if fields.contains_key("password")));
    assert!(uow.store.user("jane@example.com").is_none());
}

#[tokio::test]
async fn test_login() {
    let uow = MemoryUow::new();
    uow.seed_user("reader@example.com", UserRole::User).await;
    let auth = Authenticator::new(uow.clone(), config());

    let token = auth
        .login("reader@example.com".to_string(), PASSWORD.to_string())
        .await
        .unwrap();
    assert_eq!(token.token_type, "Bearer");
    assert!(auth.verify_token(&token.access_token).is_ok());

    let wrong = auth
        .login("reader@example.com".to_string(), "WrongHorse1".to_string())
        .await;
    assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

    let unknown = auth
        .login("ghost@example.com".to_string(), PASSWORD.to_string())
        .await;
    assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_verify_garbage_token() {
    let auth = Authenticator::new(MemoryUow::new(), config());
    assert!(matches!(auth.verify_token("garbage"), Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_ensure_admin_is_idempotent() {
    let uow = MemoryUow::new();
    let auth = Authenticator::new(uow.clone(), config());

    let created = auth
        .ensure_admin("admin@books.com".to_string(), "AdminPass1".to_string())
        .await
        .unwrap();
    assert!(created);

    let again = auth
        .ensure_admin("admin@books.com".to_string(), "Different1".to_string())
        .await
        .unwrap();
    assert!(!again);

    let admin = uow.store.user("admin@books.com").unwrap();
    assert!(admin.is_admin());

    let token = auth
        .login("admin@books.com".to_string(), "AdminPass1".to_string())
        .await
        .unwrap();
    let claims = auth.verify_token(&token.access_token).unwrap();
    assert!(claims.principal().is_admin());
}

#[tokio::test]
async fn test_library_lists_purchased_books() {
    let uow = MemoryUow::new();
    let user = uow.seed_user("reader@example.com", UserRole::User).await;
    let dune = uow.seed_book("Dune", price(1999)).await;
    uow.seed_book("Emma", price(1000)).await;

    let library = UserManager::new(uow.clone());
    let reader = principal(&user);
    assert!(library.purchased_books(&reader).await.unwrap().is_empty());

    books_api::infra::UserRepository::add_purchase(uow.store.as_ref(), user.id, dune.id)
        .await
        .unwrap();

    let books = library.purchased_books(&reader).await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");
}
