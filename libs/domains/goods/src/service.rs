use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::coordinator::GoodImageCoordinator;
use crate::error::{GoodError, GoodResult};
use crate::forms::GoodForm;
use crate::images::ImageStore;
use crate::models::{
    CATEGORY_PAGE_SIZE, Good, GoodChanges, GoodView, IMAGE_NAMESPACE, NewGood, Page, SearchTerm,
};
use crate::repository::GoodRepository;

/// Service layer for good business logic
pub struct GoodService<R: GoodRepository, S: ImageStore> {
    repository: Arc<R>,
    images: GoodImageCoordinator<S>,
}

impl<R: GoodRepository, S: ImageStore> Clone for GoodService<R, S> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            images: self.images.clone(),
        }
    }
}

impl<R: GoodRepository, S: ImageStore> GoodService<R, S> {
    pub fn new(repository: R, store: Arc<S>) -> Self {
        Self {
            repository: Arc::new(repository),
            images: GoodImageCoordinator::new(store),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_goods(&self) -> GoodResult<Vec<GoodView>> {
        self.repository.list_all().await
    }

    #[instrument(skip(self))]
    pub async fn get_good(&self, id: Uuid) -> GoodResult<GoodView> {
        self.repository.get_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn list_by_category(
        &self,
        category_id: Uuid,
        page: u64,
    ) -> GoodResult<Page<GoodView>> {
        self.repository
            .list_by_category(category_id, page.max(1), CATEGORY_PAGE_SIZE)
            .await
    }

    /// Rejects a blank term before touching the repository.
    #[instrument(skip(self))]
    pub async fn search_goods(&self, term: Option<&str>) -> GoodResult<Vec<GoodView>> {
        let term = SearchTerm::parse(term)?;
        self.repository.search(&term).await
    }

    /// Validates, uploads the images, then persists.
    #[instrument(skip(self, form))]
    pub async fn create_good(&self, form: GoodForm) -> GoodResult<Good> {
        let submission = form.into_submission()?;
        let img_urls = self
            .images
            .create(submission.images, IMAGE_NAMESPACE)
            .await?;

        self.repository
            .create(NewGood {
                name: submission.name,
                content: submission.content,
                price: submission.price,
                category_id: submission.category_id,
                img_urls,
            })
            .await
    }

    /// Validates, reconciles images against the stored list, then overwrites the good.
    ///
    /// Failures other than validation, a missing good, a rejected image list or
    /// a failed image deletion surface as [`GoodError::UpdateFailed`] with the cause.
    #[instrument(skip(self, form))]
    pub async fn update_good(&self, id: Uuid, form: GoodForm) -> GoodResult<Good> {
        let submission = form.into_submission()?;

        let current = self
            .repository
            .find(id)
            .await
            .map_err(into_update_failure)?
            .ok_or(GoodError::NotFound(id))?;

        let img_urls = self
            .images
            .reconcile(&current.img_urls, submission.images, IMAGE_NAMESPACE)
            .await
            .map_err(into_update_failure)?;

        self.repository
            .update(
                id,
                GoodChanges {
                    name: submission.name,
                    content: submission.content,
                    price: submission.price,
                    category_id: submission.category_id,
                    img_urls,
                },
            )
            .await
            .map_err(into_update_failure)
    }

    #[instrument(skip(self))]
    pub async fn delete_good(&self, id: Uuid) -> GoodResult<()> {
        if !self.repository.delete(id).await? {
            return Err(GoodError::NotFound(id));
        }
        Ok(())
    }
}

fn into_update_failure(err: GoodError) -> GoodError {
    match err {
        GoodError::NotFound(_)
        | GoodError::Validation(_)
        | GoodError::InvalidInput(_)
        | GoodError::ImageDeleteFailed(_)
        | GoodError::UpdateFailed(_) => err,
        other => {
            tracing::error!(error = %other, "Good update failed");
            GoodError::UpdateFailed(other.to_string())
        }
    }
}
