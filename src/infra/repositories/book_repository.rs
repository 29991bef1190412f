//! Book repository: catalog entries and their file records.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::entities::{book, book_file};
use crate::domain::{Book, NewBook};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Book repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// List every book, ordered by id
    async fn list(&self) -> AppResult<Vec<Book>>;

    /// Find a book with its file record
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>>;

    /// Insert a new book without a file
    async fn create(&self, book: NewBook) -> AppResult<Book>;

    /// Persist scalar fields and upsert the file record
    async fn save(&self, book: Book) -> AppResult<Book>;

    /// Delete a book; its file record, cart lines and purchases cascade
    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// Load books by id together with their file records.
pub(crate) async fn load_books<C>(db: &C, ids: Vec<i64>) -> AppResult<Vec<Book>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = book::Entity::find()
        .filter(book::Column::Id.is_in(ids))
        .find_also_related(book_file::Entity)
        .order_by_asc(book::Column::Id)
        .all(db)
        .await?;

    Ok(rows.into_iter().map(Book::from).collect())
}

/// SeaORM implementation of BookRepository
pub struct BookStore<C = DatabaseConnection> {
    db: Arc<C>,
}

impl<C> BookStore<C> {
    /// Create new repository instance
    pub fn new(db: Arc<C>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<C> BookRepository for BookStore<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn list(&self) -> AppResult<Vec<Book>> {
        let rows = book::Entity::find()
            .find_also_related(book_file::Entity)
            .order_by_asc(book::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let row = book::Entity::find_by_id(id)
            .find_also_related(book_file::Entity)
            .one(self.db.as_ref())
            .await?;

        Ok(row.map(Book::from))
    }

    async fn create(&self, new_book: NewBook) -> AppResult<Book> {
        let now = chrono::Utc::now();
        let active_model = book::ActiveModel {
            id: NotSet,
            title: Set(new_book.title),
            author: Set(new_book.author),
            publish_year: Set(new_book.publish_year),
            page_count: Set(new_book.page_count),
            price: Set(new_book.price),
            description: Set(new_book.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.db.as_ref()).await?;
        Ok(Book::from((model, None)))
    }

    async fn save(&self, book: Book) -> AppResult<Book> {
        let txn = self.db.begin().await?;

        let active_model = book::ActiveModel {
            id: Set(book.id),
            title: Set(book.title),
            author: Set(book.author),
            publish_year: Set(book.publish_year),
            page_count: Set(book.page_count),
            price: Set(book.price),
            description: Set(book.description),
            created_at: NotSet,
            updated_at: Set(book.updated_at),
        };

        match active_model.update(&txn).await {
            Ok(_) => {}
            Err(DbErr::RecordNotUpdated) => return Err(AppError::BookNotFound),
            Err(e) => return Err(e.into()),
        }

        if let Some(file) = book.file {
            let record = book_file::ActiveModel {
                id: NotSet,
                book_id: Set(book.id),
                file_name: Set(file.file_name),
                file_path: Set(file.file_path),
                content_type: Set(file.content_type),
            };

            // One file per book: a second upload overwrites the row in place
            book_file::Entity::insert(record)
                .on_conflict(
                    OnConflict::column(book_file::Column::BookId)
                        .update_columns([
                            book_file::Column::FileName,
                            book_file::Column::FilePath,
                            book_file::Column::ContentType,
                        ])
                        .to_owned(),
                )
                .exec(&txn)
                .await?;
        }

        let saved = book::Entity::find_by_id(book.id)
            .find_also_related(book_file::Entity)
            .one(&txn)
            .await?
            .ok_or_book_not_found()?;

        txn.commit().await?;
        Ok(Book::from(saved))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = book::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::BookNotFound);
        }

        Ok(())
    }
}
