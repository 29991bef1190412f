//! Shopping cart aggregate.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// A user's staging area of not-yet-purchased books. One per user.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    pub items: Vec<CartItem>,
}

/// A book placed in a cart, projected with the fields shown to the owner.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub id: i64,
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub price: Decimal,
}

impl Cart {
    pub fn contains(&self, book_id: i64) -> bool {
        self.items.iter().any(|item| item.book_id == book_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(|item| item.price).sum()
    }

    pub fn book_ids(&self) -> Vec<i64> {
        self.items.iter().map(|item| item.book_id).collect()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub book_id: i64,
    pub title: String,
    pub author: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
}

/// Cart contents with the summed price of every item
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartResponse {
    pub cart_id: i64,
    pub items: Vec<CartItemResponse>,
    #[schema(value_type = String, example = "59.97")]
    pub total_price: Decimal,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let total_price = cart.total_price();
        Self {
            cart_id: cart.id,
            items: cart
                .items
                .into_iter()
                .map(|item| CartItemResponse {
                    book_id: item.book_id,
                    title: item.title,
                    author: item.author,
                    price: item.price,
                })
                .collect(),
            total_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, book_id: i64, cents: i64) -> CartItem {
        CartItem {
            id,
            book_id,
            title: format!("Book {}", book_id),
            author: "Author".to_string(),
            price: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn test_total_price_sums_items() {
        let cart = Cart {
            id: 1,
            user_id: 1,
            items: vec![item(1, 10, 1999), item(2, 11, 501)],
        };

        assert_eq!(cart.total_price(), Decimal::new(2500, 2));
        assert!(cart.contains(11));
        assert!(!cart.contains(12));
        assert_eq!(cart.book_ids(), vec![10, 11]);
    }

    #[test]
    fn test_empty_cart_response() {
        let cart = Cart {
            id: 4,
            user_id: 1,
            items: vec![],
        };
        assert!(cart.is_empty());

        let response = CartResponse::from(cart);
        assert_eq!(response.cart_id, 4);
        assert!(response.items.is_empty());
        assert_eq!(response.total_price, Decimal::ZERO);
    }
}
