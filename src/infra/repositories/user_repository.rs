//! User repository: accounts and their ownership sets.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};

use super::book_repository::load_books;
use super::entities::{user, user_purchase};
use crate::domain::{Book, NewUser, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by email address, with the purchased book ids loaded
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Create a new user with an empty ownership set
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Record a purchase. Returns false if the user already owned the book.
    async fn add_purchase(&self, user_id: i64, book_id: i64) -> AppResult<bool>;

    /// Books owned by the user, ordered by id
    async fn purchased_books(&self, user_id: i64) -> AppResult<Vec<Book>>;
}

/// SeaORM implementation of UserRepository.
///
/// Generic over the connection so the same store serves plain
/// connections and open transactions.
pub struct UserStore<C = DatabaseConnection> {
    db: Arc<C>,
}

impl<C> UserStore<C> {
    /// Create new repository instance
    pub fn new(db: Arc<C>) -> Self {
        Self { db }
    }
}

impl<C> UserStore<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn purchased_ids(&self, user_id: i64) -> AppResult<BTreeSet<i64>> {
        let rows = user_purchase::Entity::find()
            .filter(user_purchase::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await?;

        Ok(rows.into_iter().map(|row| row.book_id).collect())
    }
}

#[async_trait]
impl<C> UserRepository for UserStore<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let Some(model) = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?
        else {
            return Ok(None);
        };

        let purchased = self.purchased_ids(model.id).await?;
        Ok(Some(model.into_user(purchased)))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = user::ActiveModel {
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            firstname: Set(new_user.firstname),
            lastname: Set(new_user.lastname),
            role: Set(new_user.role.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        // Unique email is the authoritative guard when registrations race
        let model = active_model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AppError::conflict("User already exists")
                }
                _ => AppError::from(e),
            })?;
        Ok(model.into_user(BTreeSet::new()))
    }

    async fn add_purchase(&self, user_id: i64, book_id: i64) -> AppResult<bool> {
        let row = user_purchase::ActiveModel {
            user_id: Set(user_id),
            book_id: Set(book_id),
            purchased_at: Set(chrono::Utc::now()),
        };

        // The composite primary key is the authoritative duplicate guard
        let inserted = user_purchase::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([user_purchase::Column::UserId, user_purchase::Column::BookId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await;

        match inserted {
            Ok(rows) => Ok(rows > 0),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(AppError::from(e)),
        }
    }

    async fn purchased_books(&self, user_id: i64) -> AppResult<Vec<Book>> {
        let ids: Vec<i64> = self.purchased_ids(user_id).await?.into_iter().collect();
        load_books(self.db.as_ref(), ids).await
    }
}
