pub use sea_orm_migration::prelude::*;

mod m20251101_000000_bootstrap;
mod m20251101_000001_create_catalog;
mod m20251101_000002_seed_categories;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251101_000000_bootstrap::Migration),
            Box::new(m20251101_000001_create_catalog::Migration),
            Box::new(m20251101_000002_seed_categories::Migration),
        ]
    }
}
