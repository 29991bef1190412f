//! Cart service - per-user staging of books and checkout.

use std::sync::Arc;

use async_trait::async_trait;

use super::access_gate::AccessGate;
use crate::domain::{Book, Capability, Cart, CurrentUser};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// Cart service trait for dependency injection.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Put a book in the caller's cart, returning the book
    async fn add_to_cart(&self, principal: &CurrentUser, book_id: i64) -> AppResult<Book>;

    /// Take a book out of the caller's cart
    async fn remove_from_cart(&self, principal: &CurrentUser, book_id: i64) -> AppResult<()>;

    /// Empty the caller's cart
    async fn clear_cart(&self, principal: &CurrentUser) -> AppResult<()>;

    /// The caller's cart with its items
    async fn list_cart(&self, principal: &CurrentUser) -> AppResult<Cart>;

    /// Buy everything in the cart and empty it, atomically.
    ///
    /// Returns the caller's full set of purchased books.
    async fn purchase_from_cart(&self, principal: &CurrentUser) -> AppResult<Vec<Book>>;
}

/// Concrete implementation of CartService using Unit of Work.
pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
    gate: AccessGate,
}

impl<U: UnitOfWork> CartManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        let gate = AccessGate::new(uow.users());
        Self { uow, gate }
    }

    async fn cart_of(&self, principal: &CurrentUser) -> AppResult<(i64, Cart)> {
        let user = self.gate.resolve(principal, Capability::ManageCart).await?;
        let cart = self
            .uow
            .carts()
            .find_by_user_id(user.id)
            .await?
            .ok_or_cart_not_found()?;
        Ok((user.id, cart))
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn add_to_cart(&self, principal: &CurrentUser, book_id: i64) -> AppResult<Book> {
        let user = self.gate.resolve(principal, Capability::ManageCart).await?;
        let cart = self
            .uow
            .carts()
            .find_by_user_id(user.id)
            .await?
            .ok_or_cart_not_found()?;
        let book = self
            .uow
            .books()
            .find_by_id(book_id)
            .await?
            .ok_or_book_not_found()?;

        if user.has_purchased(book.id) {
            return Err(AppError::conflict("Book is already purchased"));
        }
        if cart.contains(book.id) {
            return Err(AppError::conflict("Book already in cart"));
        }

        // The unique (cart_id, book_id) index catches concurrent adds
        if !self.uow.carts().add_item(cart.id, book.id).await? {
            return Err(AppError::conflict("Book already in cart"));
        }

        tracing::debug!(user_id = user.id, book_id = book.id, "Book added to cart");
        Ok(book)
    }

    async fn remove_from_cart(&self, principal: &CurrentUser, book_id: i64) -> AppResult<()> {
        let (user_id, cart) = self.cart_of(principal).await?;

        if !cart.contains(book_id) || !self.uow.carts().remove_item(cart.id, book_id).await? {
            return Err(AppError::conflict(format!(
                "Book with ID {} was not found in your cart",
                book_id
            )));
        }

        tracing::debug!(user_id, book_id, "Book removed from cart");
        Ok(())
    }

    async fn clear_cart(&self, principal: &CurrentUser) -> AppResult<()> {
        let (user_id, cart) = self.cart_of(principal).await?;
        let removed = self.uow.carts().clear(cart.id).await?;

        tracing::debug!(user_id, removed, "Cart cleared");
        Ok(())
    }

    async fn list_cart(&self, principal: &CurrentUser) -> AppResult<Cart> {
        let (_, cart) = self.cart_of(principal).await?;
        Ok(cart)
    }

    async fn purchase_from_cart(&self, principal: &CurrentUser) -> AppResult<Vec<Book>> {
        AccessGate::authorize(principal, Capability::Purchase)?;
        let email = principal.email.clone();

        let purchased = with_transaction!(self.uow, |ctx| {
            let mut user = ctx
                .users()
                .find_by_email(&email)
                .await?
                .ok_or_user_not_found()?;
            let cart = ctx
                .carts()
                .find_by_user_id(user.id)
                .await?
                .ok_or_cart_not_found()?;

            if cart.is_empty() {
                return Err(AppError::conflict("Cart is empty"));
            }

            // Only the lines read here are consumed; a concurrent add stays in the cart
            let book_ids = cart.book_ids();
            for &book_id in &book_ids {
                if user.record_purchase(book_id) {
                    ctx.users().add_purchase(user.id, book_id).await?;
                }
            }
            ctx.carts().remove_items(cart.id, &book_ids).await?;

            ctx.users().purchased_books(user.id).await
        })?;

        tracing::info!(email = %principal.email, owned = purchased.len(), "Cart checked out");
        Ok(purchased)
    }
}
