//! Cart repository: one cart per user and its lines.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::entities::{book, cart, cart_item};
use crate::domain::Cart;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cart repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Find a user's cart with its items projected onto their books
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Option<Cart>>;

    /// Create the empty cart paired with a new user
    async fn create_for_user(&self, user_id: i64) -> AppResult<Cart>;

    /// Add a book. Returns false if the cart already holds it.
    async fn add_item(&self, cart_id: i64, book_id: i64) -> AppResult<bool>;

    /// Remove a book. Returns false if the cart did not hold it.
    async fn remove_item(&self, cart_id: i64, book_id: i64) -> AppResult<bool>;

    /// Remove every item, returning how many were removed
    async fn clear(&self, cart_id: i64) -> AppResult<u64>;

    /// Remove exactly the given books, leaving any other line in place
    async fn remove_items(&self, cart_id: i64, book_ids: &[i64]) -> AppResult<u64>;
}

/// SeaORM implementation of CartRepository
pub struct CartStore<C = DatabaseConnection> {
    db: Arc<C>,
}

impl<C> CartStore<C> {
    /// Create new repository instance
    pub fn new(db: Arc<C>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<C> CartRepository for CartStore<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Option<Cart>> {
        let Some(model) = cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
        else {
            return Ok(None);
        };

        let rows = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(model.id))
            .find_also_related(book::Entity)
            .order_by_asc(cart_item::Column::Id)
            .all(self.db.as_ref())
            .await?;

        let items = rows
            .into_iter()
            .filter_map(|(item, book)| book.map(|book| item.into_item(book)))
            .collect();

        Ok(Some(Cart {
            id: model.id,
            user_id: model.user_id,
            items,
        }))
    }

    async fn create_for_user(&self, user_id: i64) -> AppResult<Cart> {
        let active_model = cart::ActiveModel {
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model.insert(self.db.as_ref()).await?;
        Ok(Cart {
            id: model.id,
            user_id: model.user_id,
            items: Vec::new(),
        })
    }

    async fn add_item(&self, cart_id: i64, book_id: i64) -> AppResult<bool> {
        let row = cart_item::ActiveModel {
            cart_id: Set(cart_id),
            book_id: Set(book_id),
            added_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        // Unique (cart_id, book_id) is the authoritative duplicate guard
        let inserted = cart_item::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([cart_item::Column::CartId, cart_item::Column::BookId])
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

    async fn remove_item(&self, cart_id: i64, book_id: i64) -> AppResult<bool> {
        let result = cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::BookId.eq(book_id))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn clear(&self, cart_id: i64) -> AppResult<u64> {
        let result = cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn remove_items(&self, cart_id: i64, book_ids: &[i64]) -> AppResult<u64> {
        if book_ids.is_empty() {
            return Ok(0);
        }

        let result = cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::BookId.is_in(book_ids.iter().copied()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }
}
