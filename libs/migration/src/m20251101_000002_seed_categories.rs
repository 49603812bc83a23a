use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                INSERT INTO categories (id, name)
                VALUES
                    ('0192f0a0-0000-7000-8000-000000000001', 'Clothing'),
                    ('0192f0a0-0000-7000-8000-000000000002', 'Electronics'),
                    ('0192f0a0-0000-7000-8000-000000000003', 'Home & Kitchen'),
                    ('0192f0a0-0000-7000-8000-000000000004', 'Books')
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DELETE FROM categories
                WHERE id IN (
                    '0192f0a0-0000-7000-8000-000000000001',
                    '0192f0a0-0000-7000-8000-000000000002',
                    '0192f0a0-0000-7000-8000-000000000003',
                    '0192f0a0-0000-7000-8000-000000000004'
                )
                "#,
            )
            .await?;

        Ok(())
    }
}
