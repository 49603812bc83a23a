use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{GoodError, GoodResult};
use crate::images::{ImageStore, ImageUpload};

/// One entry of a submitted `img_urls` list.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageInput {
    /// URL of an image the good already has, kept as is
    Existing(String),
    /// New file to upload
    Upload(ImageUpload),
}

/// Keeps a good's stored image URLs in step with what a form submits.
pub struct GoodImageCoordinator<S: ImageStore> {
    store: Arc<S>,
}

impl<S: ImageStore> Clone for GoodImageCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ImageStore> GoodImageCoordinator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Uploads the images of a good that does not exist yet.
    pub async fn create(
        &self,
        submitted: Vec<ImageInput>,
        namespace: &str,
    ) -> GoodResult<Vec<String>> {
        self.reconcile(&[], submitted, namespace).await
    }

    /// Returns the new `img_urls` for a good currently holding `existing`.
    ///
    /// An empty submission leaves the stored list alone. Otherwise stored URLs
    /// missing from the submission are deleted first, and nothing is uploaded
    /// if that fails. The result follows submission order.
    pub async fn reconcile(
        &self,
        existing: &[String],
        submitted: Vec<ImageInput>,
        namespace: &str,
    ) -> GoodResult<Vec<String>> {
        if submitted.is_empty() {
            return Ok(existing.to_vec());
        }

        let kept: HashSet<&str> = submitted
            .iter()
            .filter_map(|input| match input {
                ImageInput::Existing(url) => Some(url.as_str()),
                ImageInput::Upload(_) => None,
            })
            .collect();

        let stored: HashSet<&str> = existing.iter().map(String::as_str).collect();
        if let Some(foreign) = kept.iter().find(|url| !stored.contains(*url)) {
            return Err(GoodError::InvalidInput(format!(
                "img_urls contains an image that does not belong to this good: {}",
                foreign
            )));
        }

        let to_delete: Vec<String> = existing
            .iter()
            .filter(|url| !kept.contains(url.as_str()))
            .cloned()
            .collect();

        if !to_delete.is_empty() {
            tracing::debug!(count = to_delete.len(), "Deleting replaced images");
            self.store
                .delete(to_delete)
                .await
                .map_err(|e| GoodError::ImageDeleteFailed(e.to_string()))?;
        }

        let uploads: Vec<ImageUpload> = submitted
            .iter()
            .filter_map(|input| match input {
                ImageInput::Upload(upload) => Some(upload.clone()),
                ImageInput::Existing(_) => None,
            })
            .collect();
        let expected = uploads.len();

        let mut uploaded = if uploads.is_empty() {
            Vec::new().into_iter()
        } else {
            self.store.upload(uploads, namespace).await?.into_iter()
        };
        if uploaded.len() != expected {
            return Err(GoodError::Internal(format!(
                "image store returned {} URLs for {} files",
                uploaded.len(),
                expected
            )));
        }

        // a kept URL listed twice is stored once, at its first position
        let mut seen = HashSet::new();
        let mut urls = Vec::with_capacity(submitted.len());
        for input in submitted {
            match input {
                ImageInput::Existing(url) => {
                    if seen.insert(url.clone()) {
                        urls.push(url);
                    }
                }
                ImageInput::Upload(_) => {
                    if let Some(url) = uploaded.next() {
                        urls.push(url);
                    }
                }
            }
        }

        Ok(urls)
    }
}
