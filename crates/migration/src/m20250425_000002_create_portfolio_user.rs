//! Create `portfolio_user` table holding the admin login.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PortfolioUser::Table)
                    .if_not_exists()
                    .col(uuid(PortfolioUser::Id).primary_key())
                    .col(string_len(PortfolioUser::Username, 128).unique_key().not_null())
                    .col(string_len(PortfolioUser::Password, 255).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PortfolioUser::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PortfolioUser { Table, Id, Username, Password }
