//! Migrator registering the portfolio schema in dependency order.
pub use sea_orm_migration::prelude::*;

mod m20250425_000001_create_setting;
mod m20250425_000002_create_portfolio_user;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250425_000001_create_setting::Migration),
            Box::new(m20250425_000002_create_portfolio_user::Migration),
        ]
    }
}
