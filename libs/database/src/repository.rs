//! Generic CRUD over a SeaORM entity keyed by a UUID.

use sea_orm::prelude::Uuid;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PrimaryKeyTrait,
};
use std::marker::PhantomData;

/// Entities whose primary key is a single UUID column.
pub trait UuidEntity: EntityTrait {
    fn key(id: Uuid) -> <Self::PrimaryKey as PrimaryKeyTrait>::ValueType;
}

impl<E> UuidEntity for E
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    fn key(id: Uuid) -> <Self::PrimaryKey as PrimaryKeyTrait>::ValueType {
        id.into()
    }
}

/// Insert, lookup, update and delete for one entity; domain repositories
/// wrap it and add their own queries through [`BaseRepository::db`].
///
/// ```ignore
/// let base = BaseRepository::<goods::Entity>::new(db);
/// let model = base.insert(active_model).await?;
/// let found = base.find_by_id(model.id).await?;
/// ```
pub struct BaseRepository<E: UuidEntity> {
    db: DatabaseConnection,
    _entity: PhantomData<E>,
}

impl<E: UuidEntity> Clone for BaseRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> BaseRepository<E>
where
    E: UuidEntity,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelBehavior + Send,
{
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn insert(&self, model: E::ActiveModel) -> Result<E::Model, DbErr> {
        model.insert(&self.db).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<E::Model>, DbErr> {
        E::find_by_id(E::key(id)).one(&self.db).await
    }

    /// Writes the set columns; `DbErr::RecordNotUpdated` when no row matched.
    pub async fn update(&self, model: E::ActiveModel) -> Result<E::Model, DbErr> {
        model.update(&self.db).await
    }

    /// Returns the number of rows removed (0 or 1).
    pub async fn delete_by_id(&self, id: Uuid) -> Result<u64, DbErr> {
        let result = E::delete_by_id(E::key(id)).exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    mod widget {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "widgets")]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: Uuid,
            pub label: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    #[tokio::test]
    async fn test_find_by_id_returns_row() {
        let id = Uuid::from_u128(0x0193_0000_0000_7000_8000_0000_0000_0001);
        let row = widget::Model {
            id,
            label: "first".to_string(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();

        let repo = BaseRepository::<widget::Entity>::new(db);
        assert_eq!(repo.find_by_id(id).await.unwrap(), Some(row));
    }

    #[tokio::test]
    async fn test_delete_by_id_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let repo = BaseRepository::<widget::Entity>::new(db);
        let id = Uuid::from_u128(0x0193_0000_0000_7000_8000_0000_0000_0001);
        assert_eq!(repo.delete_by_id(id).await.unwrap(), 1);
        assert_eq!(repo.delete_by_id(id).await.unwrap(), 0);
    }
}
