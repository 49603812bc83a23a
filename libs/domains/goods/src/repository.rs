use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{GoodError, GoodResult};
use crate::models::{
    Good, GoodChanges, GoodView, NO_CATEGORY_LABEL, NewGood, Page, SearchTerm,
};

/// Repository trait for goods and their read projections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoodRepository: Send + Sync {
    /// Every good with its category name and review aggregates, ordered by id
    async fn list_all(&self) -> GoodResult<Vec<GoodView>>;

    /// One good's projection; `NotFound` when absent
    async fn get_by_id(&self, id: Uuid) -> GoodResult<GoodView>;

    /// A page of a category's goods with `starAvg` rounded to two decimals.
    /// `EmptyCategory` when the page holds no goods.
    async fn list_by_category(
        &self,
        category_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> GoodResult<Page<GoodView>>;

    /// Goods whose name or content contains the term, case-insensitively
    async fn search(&self, term: &SearchTerm) -> GoodResult<Vec<GoodView>>;

    /// The persisted good, without aggregates
    async fn find(&self, id: Uuid) -> GoodResult<Option<Good>>;

    async fn create(&self, input: NewGood) -> GoodResult<Good>;

    /// Overwrites the editable fields; `NotFound` when absent
    async fn update(&self, id: Uuid, changes: GoodChanges) -> GoodResult<Good>;

    /// Hard delete; `false` when nothing was deleted
    async fn delete(&self, id: Uuid) -> GoodResult<bool>;
}

/// In-memory implementation of GoodRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryGoodRepository {
    goods: Arc<RwLock<BTreeMap<Uuid, Good>>>,
    categories: Arc<RwLock<HashMap<Uuid, String>>>,
    reviews: Arc<RwLock<HashMap<Uuid, Vec<i32>>>>,
}

impl InMemoryGoodRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_category(&self, name: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.categories.write().await.insert(id, name.to_string());
        id
    }

    pub async fn remove_category(&self, id: Uuid) {
        self.categories.write().await.remove(&id);
    }

    pub async fn add_review(&self, good_id: Uuid, stars: i32) -> GoodResult<()> {
        if !self.goods.read().await.contains_key(&good_id) {
            return Err(GoodError::NotFound(good_id));
        }
        self.reviews
            .write()
            .await
            .entry(good_id)
            .or_default()
            .push(stars);
        Ok(())
    }

    async fn project<'a>(&self, goods: impl Iterator<Item = &'a Good>) -> Vec<GoodView> {
        let categories = self.categories.read().await;
        let reviews = self.reviews.read().await;

        goods
            .map(|good| {
                let stars = reviews.get(&good.id).map(Vec::as_slice).unwrap_or_default();
                let star_avg = (!stars.is_empty())
                    .then(|| stars.iter().map(|s| f64::from(*s)).sum::<f64>() / stars.len() as f64);

                GoodView {
                    id: good.id,
                    name: good.name.clone(),
                    content: good.content.clone(),
                    price: good.price,
                    category_id: good.category_id,
                    category_name: categories
                        .get(&good.category_id)
                        .cloned()
                        .unwrap_or_else(|| NO_CATEGORY_LABEL.to_string()),
                    created_at: good.created_at,
                    img_urls: good.img_urls.clone(),
                    review_count: stars.len() as i64,
                    star_avg,
                }
            })
            .collect()
    }
}

#[async_trait]
impl GoodRepository for InMemoryGoodRepository {
    async fn list_all(&self) -> GoodResult<Vec<GoodView>> {
        let goods = self.goods.read().await;
        Ok(self.project(goods.values()).await)
    }

    async fn get_by_id(&self, id: Uuid) -> GoodResult<GoodView> {
        let goods = self.goods.read().await;
        let good = goods.get(&id).ok_or(GoodError::NotFound(id))?;
        let mut views = self.project(std::iter::once(good)).await;
        views.pop().ok_or(GoodError::NotFound(id))
    }

    async fn list_by_category(
        &self,
        category_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> GoodResult<Page<GoodView>> {
        let goods = self.goods.read().await;
        let in_category: Vec<&Good> = goods
            .values()
            .filter(|g| g.category_id == category_id)
            .collect();
        let total = in_category.len() as u64;

        let offset = page.saturating_sub(1).saturating_mul(per_page);
        let slice = in_category
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(per_page).unwrap_or(usize::MAX));
        let data: Vec<GoodView> = self
            .project(slice)
            .await
            .into_iter()
            .map(GoodView::with_rounded_average)
            .collect();

        if data.is_empty() {
            return Err(GoodError::EmptyCategory(category_id));
        }

        Ok(Page::new(data, page, per_page, total))
    }

    async fn search(&self, term: &SearchTerm) -> GoodResult<Vec<GoodView>> {
        let goods = self.goods.read().await;
        let matching = goods
            .values()
            .filter(|g| term.matches(&g.name) || term.matches(&g.content));
        Ok(self.project(matching).await)
    }

    async fn find(&self, id: Uuid) -> GoodResult<Option<Good>> {
        Ok(self.goods.read().await.get(&id).cloned())
    }

    async fn create(&self, input: NewGood) -> GoodResult<Good> {
        let now = Utc::now();
        let good = Good {
            id: Uuid::now_v7(),
            name: input.name,
            content: input.content,
            price: input.price,
            category_id: input.category_id,
            img_urls: input.img_urls,
            created_at: now,
            updated_at: now,
        };

        self.goods.write().await.insert(good.id, good.clone());
        tracing::info!(good_id = %good.id, "Created good");
        Ok(good)
    }

    async fn update(&self, id: Uuid, changes: GoodChanges) -> GoodResult<Good> {
        let mut goods = self.goods.write().await;
        let good = goods.get_mut(&id).ok_or(GoodError::NotFound(id))?;

        good.name = changes.name;
        good.content = changes.content;
        good.price = changes.price;
        good.category_id = changes.category_id;
        good.img_urls = changes.img_urls;
        good.updated_at = Utc::now();

        tracing::info!(good_id = %id, "Updated good");
        Ok(good.clone())
    }

    async fn delete(&self, id: Uuid) -> GoodResult<bool> {
        if self.goods.write().await.remove(&id).is_none() {
            return Ok(false);
        }
        self.reviews.write().await.remove(&id);

        tracing::info!(good_id = %id, "Deleted good");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_good(name: &str, category_id: Uuid) -> NewGood {
        NewGood {
            name: name.to_string(),
            content: format!("{} description", name),
            price: 10.0,
            category_id,
            img_urls: vec![],
        }
    }

    #[tokio::test]
    async fn test_zero_reviews_have_null_average() {
        let repo = InMemoryGoodRepository::new();
        let category = repo.add_category("Books").await;
        let good = repo.create(new_good("Atlas", category)).await.unwrap();

        let view = repo.get_by_id(good.id).await.unwrap();
        assert_eq!(view.review_count, 0);
        assert_eq!(view.star_avg, None);
        assert_eq!(view.category_name, "Books");
    }

    #[tokio::test]
    async fn test_average_is_rounded_only_in_category_listing() {
        let repo = InMemoryGoodRepository::new();
        let category = repo.add_category("Books").await;
        let good = repo.create(new_good("Atlas", category)).await.unwrap();
        for stars in [5, 4, 4] {
            repo.add_review(good.id, stars).await.unwrap();
        }

        let view = repo.get_by_id(good.id).await.unwrap();
        assert_eq!(view.review_count, 3);
        assert!((view.star_avg.unwrap() - 13.0 / 3.0).abs() < 1e-9);

        let page = repo.list_by_category(category, 1, 10).await.unwrap();
        assert_eq!(page.data[0].star_avg, Some(4.33));
    }

    #[tokio::test]
    async fn test_missing_category_falls_back_to_label() {
        let repo = InMemoryGoodRepository::new();
        let category = repo.add_category("Temporary").await;
        let good = repo.create(new_good("Orphan", category)).await.unwrap();
        repo.remove_category(category).await;

        let view = repo.get_by_id(good.id).await.unwrap();
        assert_eq!(view.category_name, NO_CATEGORY_LABEL);
    }

    #[tokio::test]
    async fn test_empty_category_is_distinct_error() {
        let repo = InMemoryGoodRepository::new();
        let category = repo.add_category("Empty").await;

        let result = repo.list_by_category(category, 1, 10).await;
        assert!(matches!(result, Err(GoodError::EmptyCategory(id)) if id == category));
    }

    #[tokio::test]
    async fn test_category_pagination() {
        let repo = InMemoryGoodRepository::new();
        let category = repo.add_category("Clothing").await;
        let other = repo.add_category("Books").await;
        for i in 0..12 {
            repo.create(new_good(&format!("shirt-{i}"), category))
                .await
                .unwrap();
        }
        repo.create(new_good("novel", other)).await.unwrap();

        let second = repo.list_by_category(category, 2, 10).await.unwrap();
        assert_eq!(second.data.len(), 2);
        assert_eq!(second.total, 12);
        assert_eq!(second.last_page, 2);
        assert_eq!(second.from, Some(11));

        let beyond = repo.list_by_category(category, 3, 10).await;
        assert!(matches!(beyond, Err(GoodError::EmptyCategory(_))));
    }

    #[tokio::test]
    async fn test_search_matches_name_or_content_once() {
        let repo = InMemoryGoodRepository::new();
        let category = repo.add_category("Clothing").await;
        let shirt = repo.create(new_good("Cotton shirt", category)).await.unwrap();
        for stars in [3, 5] {
            repo.add_review(shirt.id, stars).await.unwrap();
        }
        let mut scarf = new_good("Scarf", category);
        scarf.content = "Soft COTTON blend".to_string();
        repo.create(scarf).await.unwrap();
        repo.create(new_good("Wool hat", category)).await.unwrap();

        let term = SearchTerm::parse(Some("cotton")).unwrap();
        let results = repo.search(&term).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|v| v.id == shirt.id).count(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = InMemoryGoodRepository::new();
        let category = repo.add_category("Clothing").await;
        let good = repo.create(new_good("Shirt", category)).await.unwrap();

        let updated = repo
            .update(
                good.id,
                GoodChanges {
                    name: "Shirt v2".to_string(),
                    content: "Better".to_string(),
                    price: 12.5,
                    category_id: category,
                    img_urls: vec!["/storage/goods/a.png".to_string()],
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Shirt v2");
        assert_eq!(updated.created_at, good.created_at);

        assert!(repo.delete(good.id).await.unwrap());
        assert!(!repo.delete(good.id).await.unwrap());
        assert!(repo.find(good.id).await.unwrap().is_none());
    }
}
