use sea_orm::entity::prelude::*;

use crate::error::GoodError;
use crate::models::{Good, decode_img_urls};

/// Sea-ORM Entity for the goods table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub price: f64,
    pub category_id: Uuid,
    /// JSON array of URLs, kept as text
    #[sea_orm(column_type = "Text", nullable)]
    pub img_urls: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Good {
    type Error = GoodError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let img_urls = decode_img_urls(model.img_urls.as_deref()).map_err(|e| {
            GoodError::Internal(format!("Corrupt img_urls for good {}: {}", model.id, e))
        })?;

        Ok(Self {
            id: model.id,
            name: model.name,
            content: model.content,
            price: model.price,
            category_id: model.category_id,
            img_urls,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}
