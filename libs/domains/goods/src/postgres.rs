use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::BaseRepository;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, Statement, Value,
};
use uuid::Uuid;

use crate::entity;
use crate::error::{GoodError, GoodResult};
use crate::models::{
    Good, GoodChanges, GoodView, NO_CATEGORY_LABEL, NewGood, Page, SearchTerm, decode_img_urls,
    encode_img_urls,
};
use crate::repository::GoodRepository;

const STAR_AVG: &str = "AVG(r.stars)::float8";

/// Two decimals, rounded half away from zero on the exact numeric mean.
const STAR_AVG_ROUNDED: &str = "ROUND(AVG(r.stars)::numeric, 2)::float8";

const VIEW_GROUP: &str = "GROUP BY g.id, c.name ORDER BY g.id";

/// Projection shared by every read query. `$1` is always the fallback
/// category label; filters start at `$2`.
fn view_select(star_avg: &str) -> String {
    format!(
        r#"
    SELECT g.id, g.name, g.content, g.price, g.category_id,
           COALESCE(c.name, $1) AS category_name,
           g.created_at, g.img_urls,
           COUNT(r.id) AS review_count,
           {star_avg} AS star_avg
    FROM goods g
    LEFT JOIN categories c ON c.id = g.category_id
    LEFT JOIN good_reviews r ON r.good_id = g.id
"#
    )
}

/// PostgreSQL implementation of GoodRepository
///
/// Writes go through the goods entity; the aggregate reads are plain SQL.
#[derive(Clone)]
pub struct PgGoodRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgGoodRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn views(&self, filter: &str, values: Vec<Value>) -> GoodResult<Vec<GoodView>> {
        let sql = format!("{} {filter} {VIEW_GROUP}", view_select(STAR_AVG));
        self.views_sql(&sql, values).await
    }

    async fn views_sql(&self, sql: &str, values: Vec<Value>) -> GoodResult<Vec<GoodView>> {
        let mut params: Vec<Value> = Vec::with_capacity(values.len() + 1);
        params.push(NO_CATEGORY_LABEL.into());
        params.extend(values);

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, params);
        let rows = GoodViewRow::find_by_statement(stmt)
            .all(self.base.db())
            .await
            .map_err(db_error)?;

        rows.into_iter().map(GoodView::try_from).collect()
    }
}

#[derive(Debug, FromQueryResult)]
struct GoodViewRow {
    id: Uuid,
    name: String,
    content: String,
    price: f64,
    category_id: Uuid,
    category_name: String,
    created_at: DateTime<Utc>,
    img_urls: Option<String>,
    review_count: i64,
    star_avg: Option<f64>,
}

impl TryFrom<GoodViewRow> for GoodView {
    type Error = GoodError;

    fn try_from(row: GoodViewRow) -> Result<Self, Self::Error> {
        let img_urls = decode_img_urls(row.img_urls.as_deref()).map_err(|e| {
            GoodError::Internal(format!("Corrupt img_urls for good {}: {}", row.id, e))
        })?;

        Ok(Self {
            img_urls,
            id: row.id,
            name: row.name,
            content: row.content,
            price: row.price,
            category_id: row.category_id,
            category_name: row.category_name,
            created_at: row.created_at,
            review_count: row.review_count,
            star_avg: row.star_avg,
        })
    }
}

fn encoded(urls: &[String]) -> GoodResult<String> {
    encode_img_urls(urls).map_err(|e| GoodError::Internal(format!("Encoding img_urls: {}", e)))
}

fn db_error(e: DbErr) -> GoodError {
    GoodError::Database(format!("Database error: {}", e))
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl GoodRepository for PgGoodRepository {
    async fn list_all(&self) -> GoodResult<Vec<GoodView>> {
        self.views("", vec![]).await
    }

    async fn get_by_id(&self, id: Uuid) -> GoodResult<GoodView> {
        self.views("WHERE g.id = $2", vec![id.into()])
            .await?
            .pop()
            .ok_or(GoodError::NotFound(id))
    }

    async fn list_by_category(
        &self,
        category_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> GoodResult<Page<GoodView>> {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        let sql = format!(
            "{} WHERE g.category_id = $2 {VIEW_GROUP} LIMIT $3 OFFSET $4",
            view_select(STAR_AVG_ROUNDED)
        );

        let data = self
            .views_sql(
                &sql,
                vec![
                    category_id.into(),
                    to_i64(per_page).into(),
                    to_i64(offset).into(),
                ],
            )
            .await?;

        if data.is_empty() {
            return Err(GoodError::EmptyCategory(category_id));
        }

        let total = entity::Entity::find()
            .filter(entity::Column::CategoryId.eq(category_id))
            .count(self.base.db())
            .await
            .map_err(db_error)?;

        Ok(Page::new(data, page, per_page, total))
    }

    async fn search(&self, term: &SearchTerm) -> GoodResult<Vec<GoodView>> {
        // backslash is the default LIKE escape, matching like_pattern()
        self.views(
            "WHERE g.name ILIKE $2 OR g.content ILIKE $2",
            vec![term.like_pattern().into()],
        )
        .await
    }

    async fn find(&self, id: Uuid) -> GoodResult<Option<Good>> {
        self.base
            .find_by_id(id)
            .await
            .map_err(db_error)?
            .map(Good::try_from)
            .transpose()
    }

    async fn create(&self, input: NewGood) -> GoodResult<Good> {
        let now = Utc::now();
        let active_model = entity::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            content: Set(input.content),
            price: Set(input.price),
            category_id: Set(input.category_id),
            img_urls: Set(Some(encoded(&input.img_urls)?)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = self.base.insert(active_model).await.map_err(db_error)?;

        tracing::info!(good_id = %model.id, "Created good");
        model.try_into()
    }

    async fn update(&self, id: Uuid, changes: GoodChanges) -> GoodResult<Good> {
        // updated_at is maintained by the goods_touch_updated_at trigger
        let active_model = entity::ActiveModel {
            id: Unchanged(id),
            name: Set(changes.name),
            content: Set(changes.content),
            price: Set(changes.price),
            category_id: Set(changes.category_id),
            img_urls: Set(Some(encoded(&changes.img_urls)?)),
            created_at: NotSet,
            updated_at: NotSet,
        };

        let model = self
            .base
            .update(active_model)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => GoodError::NotFound(id),
                other => db_error(other),
            })?;

        tracing::info!(good_id = %id, "Updated good");
        model.try_into()
    }

    async fn delete(&self, id: Uuid) -> GoodResult<bool> {
        let rows_affected = self.base.delete_by_id(id).await.map_err(db_error)?;

        if rows_affected > 0 {
            tracing::info!(good_id = %id, "Deleted good");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
