//! Book service - catalog management and the ownership rules around a book:
//! purchase, file upload/replace and purchase-gated download.

use std::sync::Arc;

use async_trait::async_trait;
use validator::Validate;

use super::access_gate::AccessGate;
use crate::config::ACCEPTED_CONTENT_TYPE;
use crate::domain::{
    Book, Capability, CurrentUser, FileDownload, FileRecord, NewBook, UpdateBook, UploadedFile,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{FileStorage, UnitOfWork};

/// Book service trait for dependency injection.
#[async_trait]
pub trait BookService: Send + Sync {
    /// List the whole catalog
    async fn list_books(&self) -> AppResult<Vec<Book>>;

    /// Get a single book
    async fn get_book(&self, id: i64) -> AppResult<Book>;

    /// Add a book to the catalog (admin only)
    async fn add_book(&self, principal: &CurrentUser, book: NewBook) -> AppResult<Book>;

    /// Partially update a book (admin only)
    async fn update_book(
        &self,
        principal: &CurrentUser,
        id: i64,
        update: UpdateBook,
    ) -> AppResult<Book>;

    /// Delete a book and its stored file, returning the pre-deletion snapshot (admin only)
    async fn delete_book(&self, principal: &CurrentUser, id: i64) -> AppResult<Book>;

    /// Upload or replace a book's file (admin only)
    async fn update_book_file(
        &self,
        principal: &CurrentUser,
        id: i64,
        file: Option<UploadedFile>,
    ) -> AppResult<Book>;

    /// Add a book to the caller's ownership set; repeat purchases are no-ops
    async fn purchase_book(&self, principal: &CurrentUser, id: i64) -> AppResult<Book>;

    /// Load the file of a book the caller owns
    async fn download_book(&self, principal: &CurrentUser, id: i64) -> AppResult<FileDownload>;
}

/// Concrete implementation of BookService using Unit of Work.
pub struct BookManager<U: UnitOfWork> {
    uow: Arc<U>,
    storage: Arc<dyn FileStorage>,
    gate: AccessGate,
}

impl<U: UnitOfWork> BookManager<U> {
    pub fn new(uow: Arc<U>, storage: Arc<dyn FileStorage>) -> Self {
        let gate = AccessGate::new(uow.users());
        Self { uow, storage, gate }
    }

    async fn find_book(&self, id: i64) -> AppResult<Book> {
        self.uow.books().find_by_id(id).await?.ok_or_book_not_found()
    }
}

#[async_trait]
impl<U: UnitOfWork> BookService for BookManager<U> {
    async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.uow.books().list().await
    }

    async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.find_book(id).await
    }

    async fn add_book(&self, principal: &CurrentUser, book: NewBook) -> AppResult<Book> {
        AccessGate::authorize(principal, Capability::ManageCatalog)?;
        book.validate()?;

        let created = self.uow.books().create(book).await?;
        tracing::info!(book_id = created.id, title = %created.title, "Book added");
        Ok(created)
    }

    async fn update_book(
        &self,
        principal: &CurrentUser,
        id: i64,
        update: UpdateBook,
    ) -> AppResult<Book> {
        AccessGate::authorize(principal, Capability::ManageCatalog)?;
        update.validate()?;

        let mut book = self.find_book(id).await?;
        book.apply_update(update);
        self.uow.books().save(book).await
    }

    async fn delete_book(&self, principal: &CurrentUser, id: i64) -> AppResult<Book> {
        AccessGate::authorize(principal, Capability::ManageCatalog)?;
        let book = self.find_book(id).await?;

        if let Some(path) = book.file_path() {
            if let Err(e) = self.storage.delete(path).await {
                tracing::warn!(book_id = id, path, error = %e, "Failed to delete book file");
            }
        }

        self.uow.books().delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(book)
    }

    async fn update_book_file(
        &self,
        principal: &CurrentUser,
        id: i64,
        file: Option<UploadedFile>,
    ) -> AppResult<Book> {
        AccessGate::authorize(principal, Capability::ManageCatalog)?;

        let file = match file {
            Some(file) if !file.is_empty() => file,
            _ => return Err(AppError::invalid_argument("File is empty")),
        };
        if !file.has_content_type(ACCEPTED_CONTENT_TYPE) {
            return Err(AppError::invalid_argument("Only PDF files are allowed"));
        }

        let mut book = self.find_book(id).await?;
        let path = self.storage.save(book.id, &file).await?;

        // Storage strips client directories from the name
        let stored_name = path.rsplit('/').next().unwrap_or_default().to_string();
        let previous = book.attach_file(FileRecord::new(stored_name, path.clone(), ACCEPTED_CONTENT_TYPE));
        let saved = self.uow.books().save(book).await?;

        // A replaced upload under a different name leaves an orphan behind
        if let Some(old_path) = previous.as_ref().and_then(FileRecord::stored_path) {
            if old_path != path {
                if let Err(e) = self.storage.delete(old_path).await {
                    tracing::warn!(book_id = id, path = old_path, error = %e, "Failed to delete replaced file");
                }
            }
        }

        tracing::info!(book_id = id, path = %path, "Book file uploaded");
        Ok(saved)
    }

    async fn purchase_book(&self, principal: &CurrentUser, id: i64) -> AppResult<Book> {
        let mut user = self.gate.resolve(principal, Capability::Purchase).await?;
        let book = self.find_book(id).await?;

        if user.record_purchase(book.id) {
            self.uow.users().add_purchase(user.id, book.id).await?;
            tracing::info!(user_id = user.id, book_id = book.id, "Book purchased");
        } else {
            tracing::debug!(user_id = user.id, book_id = book.id, "Book already owned");
        }

        Ok(book)
    }

    async fn download_book(&self, principal: &CurrentUser, id: i64) -> AppResult<FileDownload> {
        let user = self.gate.resolve(principal, Capability::Download).await?;
        let book = self.find_book(id).await?;

        let record = book
            .file
            .as_ref()
            .ok_or_else(|| AppError::file_not_found("No file attached to this book"))?;
        let path = record
            .stored_path()
            .ok_or_else(|| AppError::file_not_found("No file attached to this book"))?;

        AccessGate::ensure_owns(&user, book.id)?;

        let content = self.storage.load(path).await?;
        tracing::debug!(user_id = user.id, book_id = book.id, bytes = content.len(), "Book downloaded");

        Ok(FileDownload {
            file_name: record.file_name.clone(),
            content_type: record.content_type.clone(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::{User, UserRole};
    use crate::infra::{
        BookRepository, CartRepository, MockBookRepository, MockCartRepository, MockFileStorage,
        MockUserRepository, TransactionContext, TxFuture, UserRepository,
    };

    struct MockUow {
        users: Arc<MockUserRepository>,
        books: Arc<MockBookRepository>,
        carts: Arc<MockCartRepository>,
    }

    impl MockUow {
        fn new(users: MockUserRepository, books: MockBookRepository) -> Arc<Self> {
            Arc::new(Self {
                users: Arc::new(users),
                books: Arc::new(books),
                carts: Arc::new(MockCartRepository::new()),
            })
        }
    }

    #[async_trait]
    impl UnitOfWork for MockUow {
        fn users(&self) -> Arc<dyn UserRepository> {
            self.users.clone()
        }

        fn books(&self) -> Arc<dyn BookRepository> {
            self.books.clone()
        }

        fn carts(&self) -> Arc<dyn CartRepository> {
            self.carts.clone()
        }

        async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
        where
            F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
            T: Send,
        {
            Err(AppError::internal("Transactions not supported in this mock"))
        }
    }

    fn admin() -> CurrentUser {
        CurrentUser::new("admin@books.com", UserRole::Admin)
    }

    fn reader_principal() -> CurrentUser {
        CurrentUser::new("reader@example.com", UserRole::User)
    }

    fn reader(purchased: &[i64]) -> User {
        User {
            id: 3,
            email: "reader@example.com".to_string(),
            password_hash: "hashed".to_string(),
            firstname: "Jane".to_string(),
            lastname: "Doe".to_string(),
            role: UserRole::User,
            purchased_books: purchased.iter().copied().collect::<BTreeSet<_>>(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn book(id: i64, path: Option<&str>) -> Book {
        Book {
            id,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            publish_year: Some(1965),
            page_count: Some(412),
            price: Decimal::new(1999, 2),
            description: None,
            file: path.map(|p| FileRecord::new("b.pdf", p, "application/pdf")),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn pdf(name: &str) -> UploadedFile {
        UploadedFile::new(name, Some("application/pdf".to_string()), b"%PDF-1.7".to_vec())
    }

    #[tokio::test]
    async fn test_delete_book_removes_stored_file_once() {
        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .with(eq(9))
            .returning(|id| Ok(Some(book(id, Some("p/b.pdf")))));
        books.expect_delete().with(eq(9)).times(1).returning(|_| Ok(()));

        let mut storage = MockFileStorage::new();
        storage
            .expect_delete()
            .with(eq("p/b.pdf"))
            .times(1)
            .returning(|_| Ok(()));

        let service = BookManager::new(MockUow::new(MockUserRepository::new(), books), Arc::new(storage));
        let deleted = service.delete_book(&admin(), 9).await.unwrap();

        assert_eq!(deleted.id, 9);
        assert_eq!(deleted.file_path(), Some("p/b.pdf"));
    }

    #[tokio::test]
    async fn test_delete_book_survives_storage_failure() {
        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .returning(|id| Ok(Some(book(id, Some("p/b.pdf")))));
        books.expect_delete().times(1).returning(|_| Ok(()));

        let mut storage = MockFileStorage::new();
        storage
            .expect_delete()
            .returning(|_| Err(AppError::file_storage("disk on fire")));

        let service = BookManager::new(MockUow::new(MockUserRepository::new(), books), Arc::new(storage));
        assert!(service.delete_book(&admin(), 9).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_book() {
        let mut books = MockBookRepository::new();
        books.expect_find_by_id().returning(|_| Ok(None));
        books.expect_delete().never();

        let service = BookManager::new(
            MockUow::new(MockUserRepository::new(), books),
            Arc::new(MockFileStorage::new()),
        );
        let result = service.delete_book(&admin(), 1).await;

        assert!(matches!(result, Err(AppError::BookNotFound)));
    }

    #[tokio::test]
    async fn test_catalog_changes_require_admin() {
        let mut books = MockBookRepository::new();
        books.expect_delete().never();

        let service = BookManager::new(
            MockUow::new(MockUserRepository::new(), books),
            Arc::new(MockFileStorage::new()),
        );
        let result = service.delete_book(&reader_principal(), 1).await;

        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_purchase_twice_writes_once() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(reader(&[4]))));
        users.expect_add_purchase().never();

        let mut books = MockBookRepository::new();
        books.expect_find_by_id().returning(|id| Ok(Some(book(id, None))));

        let service = BookManager::new(MockUow::new(users, books), Arc::new(MockFileStorage::new()));
        let purchased = service.purchase_book(&reader_principal(), 4).await.unwrap();

        assert_eq!(purchased.id, 4);
    }

    #[tokio::test]
    async fn test_purchase_records_ownership() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(Some(reader(&[]))));
        users
            .expect_add_purchase()
            .with(eq(3), eq(4))
            .times(1)
            .returning(|_, _| Ok(true));

        let mut books = MockBookRepository::new();
        books.expect_find_by_id().returning(|id| Ok(Some(book(id, None))));

        let service = BookManager::new(MockUow::new(users, books), Arc::new(MockFileStorage::new()));
        assert!(service.purchase_book(&reader_principal(), 4).await.is_ok());
    }

    #[tokio::test]
    async fn test_download_without_file_is_not_found_before_access_denied() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(Some(reader(&[]))));

        let mut books = MockBookRepository::new();
        books.expect_find_by_id().returning(|id| Ok(Some(book(id, None))));

        let service = BookManager::new(MockUow::new(users, books), Arc::new(MockFileStorage::new()));
        let result = service.download_book(&reader_principal(), 4).await;

        assert!(matches!(result, Err(AppError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_download_unpurchased_book_is_denied() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(Some(reader(&[]))));

        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .returning(|id| Ok(Some(book(id, Some("4/b.pdf")))));

        let mut storage = MockFileStorage::new();
        storage.expect_load().never();

        let service = BookManager::new(MockUow::new(users, books), Arc::new(storage));
        let err = service.download_book(&reader_principal(), 4).await.unwrap_err();

        assert!(matches!(err, AppError::AccessDenied(ref m) if m == "You must purchase this book before downloading"));
    }

    #[tokio::test]
    async fn test_download_owned_book() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(Some(reader(&[4]))));

        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .returning(|id| Ok(Some(book(id, Some("4/b.pdf")))));

        let mut storage = MockFileStorage::new();
        storage
            .expect_load()
            .with(eq("4/b.pdf"))
            .returning(|_| Ok(b"%PDF-1.7".to_vec()));

        let service = BookManager::new(MockUow::new(users, books), Arc::new(storage));
        let download = service.download_book(&reader_principal(), 4).await.unwrap();

        assert_eq!(download.file_name, "b.pdf");
        assert_eq!(download.content_type, "application/pdf");
        assert_eq!(download.content, b"%PDF-1.7".to_vec());
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_and_non_pdf() {
        let service = BookManager::new(
            MockUow::new(MockUserRepository::new(), MockBookRepository::new()),
            Arc::new(MockFileStorage::new()),
        );

        let err = service.update_book_file(&admin(), 1, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(ref m) if m == "File is empty"));

        let empty = UploadedFile::new("a.pdf", Some("application/pdf".to_string()), vec![]);
        let err = service.update_book_file(&admin(), 1, Some(empty)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(ref m) if m == "File is empty"));

        let text = UploadedFile::new("a.txt", Some("text/plain".to_string()), b"hi".to_vec());
        let err = service.update_book_file(&admin(), 1, Some(text)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(ref m) if m == "Only PDF files are allowed"));
    }

    #[tokio::test]
    async fn test_upload_to_missing_book() {
        let mut books = MockBookRepository::new();
        books.expect_find_by_id().returning(|_| Ok(None));

        let mut storage = MockFileStorage::new();
        storage.expect_save().never();

        let service = BookManager::new(MockUow::new(MockUserRepository::new(), books), Arc::new(storage));
        let result = service.update_book_file(&admin(), 1, Some(pdf("a.pdf"))).await;

        assert!(matches!(result, Err(AppError::BookNotFound)));
    }

    #[tokio::test]
    async fn test_replacing_file_deletes_old_path() {
        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .returning(|id| Ok(Some(book(id, Some("1/old.pdf")))));
        books.expect_save().times(1).returning(|b| Ok(b));

        let mut storage = MockFileStorage::new();
        storage
            .expect_save()
            .times(1)
            .returning(|id, f| Ok(format!("{}/{}", id, f.file_name)));
        storage
            .expect_delete()
            .with(eq("1/old.pdf"))
            .times(1)
            .returning(|_| Ok(()));

        let service = BookManager::new(MockUow::new(MockUserRepository::new(), books), Arc::new(storage));
        let updated = service
            .update_book_file(&admin(), 1, Some(pdf("new.pdf")))
            .await
            .unwrap();

        assert_eq!(updated.file_path(), Some("1/new.pdf"));
        assert_eq!(updated.file.unwrap().file_name, "new.pdf");
    }

    #[tokio::test]
    async fn test_add_book_validates_fields() {
        let mut books = MockBookRepository::new();
        books.expect_create().never();

        let service = BookManager::new(
            MockUow::new(MockUserRepository::new(), books),
            Arc::new(MockFileStorage::new()),
        );
        let invalid = NewBook {
            title: "X".to_string(),
            author: "Frank Herbert".to_string(),
            publish_year: None,
            page_count: None,
            price: Decimal::new(1999, 2),
            description: None,
        };

        let err = service.add_book(&admin(), invalid).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref fields) if fields.contains_key("title")));
    }
}
