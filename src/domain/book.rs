//! Book domain entity and catalog request types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::file::FileRecord;

/// Book domain entity
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub publish_year: Option<i32>,
    pub page_count: Option<i32>,
    pub price: Decimal,
    pub description: Option<String>,
    /// Attached file, if one was uploaded
    pub file: Option<FileRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Apply a partial update; absent fields keep their current value.
    pub fn apply_update(&mut self, update: UpdateBook) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(author) = update.author {
            self.author = author;
        }
        if let Some(year) = update.publish_year {
            self.publish_year = Some(year);
        }
        if let Some(pages) = update.page_count {
            self.page_count = Some(pages);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        self.updated_at = Utc::now();
    }

    /// Create or overwrite the file record, returning the replaced one.
    pub fn attach_file(&mut self, mut record: FileRecord) -> Option<FileRecord> {
        let previous = self.file.take();
        // Keep the row identity so the upsert overwrites in place
        if let Some(prev) = &previous {
            record.id = prev.id;
        }
        self.file = Some(record);
        self.updated_at = Utc::now();
        previous
    }

    /// Storage path of the attached file, if any
    pub fn file_path(&self) -> Option<&str> {
        self.file.as_ref().and_then(FileRecord::stored_path)
    }
}

fn positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_positive() && !price.is_zero() {
        Ok(())
    } else {
        let mut err = ValidationError::new("positive");
        err.message = Some("Price must be greater than zero".into());
        Err(err)
    }
}

/// Book creation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewBook {
    #[validate(length(min = 2, max = 100, message = "Title must be between 2 and 100 characters"))]
    #[schema(example = "The Rust Programming Language")]
    pub title: String,
    #[validate(length(min = 2, max = 100, message = "Author must be between 2 and 100 characters"))]
    #[schema(example = "Steve Klabnik")]
    pub author: String,
    #[validate(range(min = 1500, max = 2100, message = "Publish year must be between 1500 and 2100"))]
    #[schema(example = 2019)]
    pub publish_year: Option<i32>,
    #[validate(range(min = 1, message = "Page count must be positive"))]
    #[schema(example = 560)]
    pub page_count: Option<i32>,
    #[validate(custom(function = "positive_price"))]
    #[schema(value_type = String, example = "39.99")]
    pub price: Decimal,
    pub description: Option<String>,
}

/// Partial book update request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 2, max = 100, message = "Title must be between 2 and 100 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 2, max = 100, message = "Author must be between 2 and 100 characters"))]
    pub author: Option<String>,
    #[validate(range(min = 1500, max = 2100, message = "Publish year must be between 1500 and 2100"))]
    pub publish_year: Option<i32>,
    #[validate(range(min = 1, message = "Page count must be positive"))]
    pub page_count: Option<i32>,
    #[validate(custom(function = "positive_price"))]
    #[schema(value_type = Option<String>, example = "29.99")]
    pub price: Option<Decimal>,
    pub description: Option<String>,
}

/// Book response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookResponse {
    #[schema(example = 1)]
    pub id: i64,
    pub title: String,
    pub author: String,
    pub publish_year: Option<i32>,
    pub page_count: Option<i32>,
    #[schema(value_type = String, example = "39.99")]
    pub price: Decimal,
    pub description: Option<String>,
    /// Name of the attached file, if any
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            publish_year: book.publish_year,
            page_count: book.page_count,
            price: book.price,
            description: book.description,
            file_name: book.file.map(|f| f.file_name),
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Book {
        Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            publish_year: Some(1965),
            page_count: Some(412),
            price: Decimal::new(1999, 2),
            description: None,
            file: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn valid_new_book() -> NewBook {
        NewBook {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            publish_year: Some(1965),
            page_count: Some(412),
            price: Decimal::new(1999, 2),
            description: None,
        }
    }

    #[test]
    fn test_apply_update_keeps_absent_fields() {
        let mut book = sample_book();
        book.apply_update(UpdateBook {
            title: Some("Dune Messiah".to_string()),
            ..Default::default()
        });

        assert_eq!(book.title, "Dune Messiah");
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.page_count, Some(412));
        assert_eq!(book.price, Decimal::new(1999, 2));
    }

    #[test]
    fn test_attach_file_keeps_record_identity() {
        let mut book = sample_book();
        let mut first = FileRecord::new("a.pdf", "1/a.pdf", "application/pdf");
        first.id = Some(10);
        assert!(book.attach_file(first).is_none());

        let replaced = book.attach_file(FileRecord::new("b.pdf", "1/b.pdf", "application/pdf"));

        assert_eq!(replaced.map(|r| r.file_name), Some("a.pdf".to_string()));
        let current = book.file.as_ref().unwrap();
        assert_eq!(current.id, Some(10));
        assert_eq!(book.file_path(), Some("1/b.pdf"));
    }

    #[test]
    fn test_new_book_validation() {
        assert!(valid_new_book().validate().is_ok());

        let mut short_title = valid_new_book();
        short_title.title = "D".to_string();
        let errors = short_title.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));

        let mut ancient = valid_new_book();
        ancient.publish_year = Some(1200);
        assert!(ancient.validate().is_err());

        let mut free = valid_new_book();
        free.price = Decimal::ZERO;
        let errors = free.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn test_update_book_validation_skips_absent_fields() {
        assert!(UpdateBook::default().validate().is_ok());

        let negative = UpdateBook {
            price: Some(Decimal::NEGATIVE_ONE),
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_response_exposes_file_name_only() {
        let mut book = sample_book();
        book.attach_file(FileRecord::new("dune.pdf", "1/dune.pdf", "application/pdf"));

        let json = serde_json::to_value(BookResponse::from(book)).unwrap();
        assert_eq!(json["file_name"], "dune.pdf");
        assert!(json.get("file_path").is_none());
    }
}
