//! In-memory persistence for integration tests.
//!
//! `MemoryUow` implements the Unit of Work over a single mutex-guarded
//! state. A transaction snapshots the state first and restores it when the
//! closure fails, which is enough to observe all-or-nothing behavior.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use books_api::domain::{Book, Cart, CartItem, CurrentUser, NewBook, NewUser, Password, User, UserRole};
use books_api::errors::{AppError, AppResult};
use books_api::infra::{
    BookRepository, CartRepository, TransactionContext, TransactionScope, TxFuture, UnitOfWork,
    UserRepository,
};

pub const PASSWORD: &str = "CorrectHorse1";

#[derive(Clone, Default)]
struct CartRow {
    user_id: i64,
    // (item id, book id)
    items: Vec<(i64, i64)>,
}

#[derive(Clone, Default)]
struct State {
    users: BTreeMap<i64, User>,
    books: BTreeMap<i64, Book>,
    carts: BTreeMap<i64, CartRow>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared in-memory tables, implementing every repository trait.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_cart_write: AtomicBool,
    fail_purchase: AtomicBool,
    hide_user_lookup: AtomicBool,
    // Book added by another request right after the next cart read
    add_after_read: Mutex<Option<i64>>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Make the next cart clear or removal fail, after any earlier writes in the same transaction
    pub fn fail_next_cart_write(&self) {
        self.fail_cart_write.store(true, Ordering::SeqCst);
    }

    /// Make the next purchase write fail
    pub fn fail_next_purchase(&self) {
        self.fail_purchase.store(true, Ordering::SeqCst);
    }

    /// The next email lookup misses, as if another registration had not committed yet
    pub fn hide_next_user_lookup(&self) {
        self.hide_user_lookup.store(true, Ordering::SeqCst);
    }

    /// Commit an add of `book_id` right after the next cart read returns
    pub fn add_after_next_cart_read(&self, book_id: i64) {
        *self.add_after_read.lock().unwrap() = Some(book_id);
    }

    pub fn user(&self, email: &str) -> Option<User> {
        self.lock().users.values().find(|u| u.email == email).cloned()
    }

    pub fn cart_book_ids(&self, user_id: i64) -> Vec<i64> {
        self.lock()
            .carts
            .values()
            .find(|c| c.user_id == user_id)
            .map(|c| c.items.iter().map(|(_, book_id)| *book_id).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        if self.hide_user_lookup.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.user(email))
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut state = self.lock();
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AppError::conflict("User already exists"));
        }

        let id = state.next_id();
        let created = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            firstname: user.firstname,
            lastname: user.lastname,
            role: user.role,
            purchased_books: BTreeSet::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.users.insert(id, created.clone());
        Ok(created)
    }

    async fn add_purchase(&self, user_id: i64, book_id: i64) -> AppResult<bool> {
        if self.fail_purchase.swap(false, Ordering::SeqCst) {
            return Err(AppError::internal("simulated write failure"));
        }
        let mut state = self.lock();
        if !state.books.contains_key(&book_id) {
            return Err(AppError::BookNotFound);
        }
        let user = state.users.get_mut(&user_id).ok_or(AppError::UserNotFound)?;
        Ok(user.purchased_books.insert(book_id))
    }

    async fn purchased_books(&self, user_id: i64) -> AppResult<Vec<Book>> {
        let state = self.lock();
        let user = state.users.get(&user_id).ok_or(AppError::UserNotFound)?;
        Ok(user
            .purchased_books
            .iter()
            .filter_map(|id| state.books.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Book>> {
        Ok(self.lock().books.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        Ok(self.lock().books.get(&id).cloned())
    }

    async fn create(&self, book: NewBook) -> AppResult<Book> {
        let mut state = self.lock();
        let id = state.next_id();
        let created = Book {
            id,
            title: book.title,
            author: book.author,
            publish_year: book.publish_year,
            page_count: book.page_count,
            price: book.price,
            description: book.description,
            file: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.books.insert(id, created.clone());
        Ok(created)
    }

    async fn save(&self, mut book: Book) -> AppResult<Book> {
        let mut state = self.lock();
        if !state.books.contains_key(&book.id) {
            return Err(AppError::BookNotFound);
        }
        let needs_id = book.file.as_ref().is_some_and(|f| f.id.is_none());
        if needs_id {
            let file_id = state.next_id();
            if let Some(file) = book.file.as_mut() {
                file.id = Some(file_id);
            }
        }
        state.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut state = self.lock();
        state.books.remove(&id).ok_or(AppError::BookNotFound)?;
        for user in state.users.values_mut() {
            user.purchased_books.remove(&id);
        }
        for cart in state.carts.values_mut() {
            cart.items.retain(|(_, book_id)| *book_id != id);
        }
        Ok(())
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Option<Cart>> {
        let mut state = self.lock();
        let Some((&id, row)) = state.carts.iter().find(|(_, c)| c.user_id == user_id) else {
            return Ok(None);
        };

        let items = row
            .items
            .iter()
            .filter_map(|(item_id, book_id)| {
                state.books.get(book_id).map(|book| CartItem {
                    id: *item_id,
                    book_id: book.id,
                    title: book.title.clone(),
                    author: book.author.clone(),
                    price: book.price,
                })
            })
            .collect();

        if let Some(book_id) = self.add_after_read.lock().unwrap().take() {
            let item_id = state.next_id();
            if let Some(row) = state.carts.get_mut(&id) {
                row.items.push((item_id, book_id));
            }
        }

        Ok(Some(Cart { id, user_id, items }))
    }

    async fn create_for_user(&self, user_id: i64) -> AppResult<Cart> {
        let mut state = self.lock();
        let id = state.next_id();
        state.carts.insert(
            id,
            CartRow {
                user_id,
                items: Vec::new(),
            },
        );
        Ok(Cart {
            id,
            user_id,
            items: Vec::new(),
        })
    }

    async fn add_item(&self, cart_id: i64, book_id: i64) -> AppResult<bool> {
        let mut state = self.lock();
        let item_id = state.next_id();
        let cart = state.carts.get_mut(&cart_id).ok_or(AppError::CartNotFound)?;
        if cart.items.iter().any(|(_, b)| *b == book_id) {
            return Ok(false);
        }
        cart.items.push((item_id, book_id));
        Ok(true)
    }

    async fn remove_item(&self, cart_id: i64, book_id: i64) -> AppResult<bool> {
        let mut state = self.lock();
        let cart = state.carts.get_mut(&cart_id).ok_or(AppError::CartNotFound)?;
        let before = cart.items.len();
        cart.items.retain(|(_, b)| *b != book_id);
        Ok(cart.items.len() < before)
    }

    async fn clear(&self, cart_id: i64) -> AppResult<u64> {
        if self.fail_cart_write.swap(false, Ordering::SeqCst) {
            return Err(AppError::internal("simulated write failure"));
        }
        let mut state = self.lock();
        let cart = state.carts.get_mut(&cart_id).ok_or(AppError::CartNotFound)?;
        let removed = cart.items.len() as u64;
        cart.items.clear();
        Ok(removed)
    }

    async fn remove_items(&self, cart_id: i64, book_ids: &[i64]) -> AppResult<u64> {
        if self.fail_cart_write.swap(false, Ordering::SeqCst) {
            return Err(AppError::internal("simulated write failure"));
        }
        let mut state = self.lock();
        let cart = state.carts.get_mut(&cart_id).ok_or(AppError::CartNotFound)?;
        let before = cart.items.len();
        cart.items.retain(|(_, b)| !book_ids.contains(b));
        Ok((before - cart.items.len()) as u64)
    }
}

impl TransactionScope for MemoryStore {
    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn carts(&self) -> &dyn CartRepository {
        self
    }
}

/// Unit of Work over `MemoryStore` with snapshot/restore transactions.
#[derive(Clone, Default)]
pub struct MemoryUow {
    pub store: Arc<MemoryStore>,
}

impl MemoryUow {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register an account with an empty cart
    pub async fn seed_user(&self, email: &str, role: UserRole) -> User {
        let user = UserRepository::create(
            self.store.as_ref(),
            NewUser {
                email: email.to_string(),
                password_hash: Password::new(PASSWORD).unwrap().into_string(),
                firstname: "Jane".to_string(),
                lastname: "Doe".to_string(),
                role,
            },
        )
        .await
        .unwrap();
        self.store.create_for_user(user.id).await.unwrap();
        user
    }

    pub async fn seed_book(&self, title: &str, price: Decimal) -> Book {
        BookRepository::create(
            self.store.as_ref(),
            NewBook {
                title: title.to_string(),
                author: "Frank Herbert".to_string(),
                publish_year: Some(1965),
                page_count: Some(412),
                price,
                description: None,
            },
        )
        .await
        .unwrap()
    }
}

#[async_trait]
impl UnitOfWork for MemoryUow {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.store.clone()
    }

    fn books(&self) -> Arc<dyn BookRepository> {
        self.store.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.store.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let snapshot = self.store.lock().clone();

        let result = f(TransactionContext::new(self.store.as_ref())).await;
        if result.is_err() {
            *self.store.lock() = snapshot;
        }
        result
    }
}

pub fn principal(user: &User) -> CurrentUser {
    CurrentUser::new(user.email.clone(), user.role)
}

pub fn price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
