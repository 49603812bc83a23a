use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_uuid(Categories::Id))
                    .col(string(Categories::Name))
                    .col(
                        timestamp_with_time_zone(Categories::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // No foreign key on category_id: goods outlive their category and
        // fall back to a placeholder label when it is gone.
        manager
            .create_table(
                Table::create()
                    .table(Goods::Table)
                    .if_not_exists()
                    .col(pk_uuid(Goods::Id))
                    .col(string_len(Goods::Name, 50))
                    .col(string_len(Goods::Content, 255))
                    .col(double(Goods::Price))
                    .col(uuid(Goods::CategoryId))
                    .col(text_null(Goods::ImgUrls))
                    .col(
                        timestamp_with_time_zone(Goods::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Goods::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GoodReviews::Table)
                    .if_not_exists()
                    .col(pk_uuid(GoodReviews::Id))
                    .col(uuid(GoodReviews::GoodId))
                    .col(integer(GoodReviews::Stars))
                    .col(
                        timestamp_with_time_zone(GoodReviews::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_good_reviews_good_id")
                            .from(GoodReviews::Table, GoodReviews::GoodId)
                            .to(Goods::Table, Goods::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_goods_category_id")
                    .table(Goods::Table)
                    .col(Goods::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_good_reviews_good_id")
                    .table(GoodReviews::Table)
                    .col(GoodReviews::GoodId)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER goods_touch_updated_at
                    BEFORE UPDATE ON goods
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GoodReviews::Table).if_exists().to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Goods::Table).if_exists().to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Categories::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Goods {
    Table,
    Id,
    Name,
    Content,
    Price,
    CategoryId,
    ImgUrls,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GoodReviews {
    Table,
    Id,
    GoodId,
    Stars,
    CreatedAt,
}
