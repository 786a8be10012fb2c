//! Create `setting` table: one row per portfolio section.
//!
//! `key` is the primary key, so the database enforces one value per key and
//! `INSERT ... ON CONFLICT (key)` gives an atomic upsert.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Setting::Table)
                    .if_not_exists()
                    .col(string_len(Setting::Key, 255).primary_key())
                    .col(json_binary(Setting::Value).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Setting::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Setting { Table, Key, Value }
