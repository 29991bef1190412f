//! Migration: Create books and book_files tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Books::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Books::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Books::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Books::Author).string_len(100).not_null())
                    .col(ColumnDef::new(Books::PublishYear).integer().null())
                    .col(ColumnDef::new(Books::PageCount).integer().null())
                    .col(ColumnDef::new(Books::Price).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Books::Description).text().null())
                    .col(
                        ColumnDef::new(Books::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Books::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one file per book; removed together with the book
        manager
            .create_table(
                Table::create()
                    .table(BookFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookFiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BookFiles::BookId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(BookFiles::FileName).string().not_null())
                    .col(ColumnDef::new(BookFiles::FilePath).string().null())
                    .col(ColumnDef::new(BookFiles::ContentType).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_book_files_book_id")
                            .from(BookFiles::Table, BookFiles::BookId)
                            .to(Books::Table, Books::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookFiles::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Books {
    Table,
    Id,
    Title,
    Author,
    PublishYear,
    PageCount,
    Price,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BookFiles {
    Table,
    Id,
    BookId,
    FileName,
    FilePath,
    ContentType,
}
