//! User database entity for SeaORM.

use std::collections::BTreeSet;

use sea_orm::entity::prelude::*;

use crate::domain::{User, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub role: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::cart::Entity")]
    Cart,
    #[sea_orm(has_many = "super::user_purchase::Entity")]
    UserPurchase,
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cart.def()
    }
}

impl Related<super::user_purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserPurchase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain entity together with the user's purchased book ids
    pub fn into_user(self, purchased_books: BTreeSet<i64>) -> User {
        User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            firstname: self.firstname,
            lastname: self.lastname,
            role: UserRole::from(self.role.as_str()),
            purchased_books,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
