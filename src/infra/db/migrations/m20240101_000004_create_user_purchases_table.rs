//! Migration: Create user_purchases ownership table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240101_000002_create_books_table::Books;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserPurchases::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserPurchases::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserPurchases::BookId).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserPurchases::PurchasedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // A book is owned at most once per user
                    .primary_key(
                        Index::create()
                            .col(UserPurchases::UserId)
                            .col(UserPurchases::BookId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_purchases_user_id")
                            .from(UserPurchases::Table, UserPurchases::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_purchases_book_id")
                            .from(UserPurchases::Table, UserPurchases::BookId)
                            .to(Books::Table, Books::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserPurchases::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserPurchases {
    Table,
    UserId,
    BookId,
    PurchasedAt,
}
