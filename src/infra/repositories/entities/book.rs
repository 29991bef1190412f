//! Book database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Book;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub author: String,
    pub publish_year: Option<i32>,
    pub page_count: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::book_file::Entity")]
    BookFile,
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItem,
    #[sea_orm(has_many = "super::user_purchase::Entity")]
    UserPurchase,
}

impl Related<super::book_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookFile.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItem.def()
    }
}

impl Related<super::user_purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserPurchase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert a book row and its optional file row to the domain entity
impl From<(Model, Option<super::book_file::Model>)> for Book {
    fn from((model, file): (Model, Option<super::book_file::Model>)) -> Self {
        Book {
            id: model.id,
            title: model.title,
            author: model.author,
            publish_year: model.publish_year,
            page_count: model.page_count,
            price: model.price,
            description: model.description,
            file: file.map(Into::into),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
