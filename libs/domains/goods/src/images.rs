//! Image storage behind the `upload` / `delete` contract used by the goods service.
//!
//! [`LocalImageStore`] writes files under a root directory and hands out URLs
//! below a public prefix, the way the API binary serves them with `ServeDir`.

use async_trait::async_trait;
use axum::body::Bytes;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Largest accepted image, 2048 KiB.
pub const MAX_IMAGE_BYTES: usize = 2048 * 1024;

/// A raw file submitted with a form.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: None,
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// Format sniffed from the file's leading bytes; the client's content type is not trusted.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::detect(&self.bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL is not managed by this store: {0}")]
    UnknownUrl(String),

    #[error("Unsupported image format")]
    UnsupportedFormat,
}

/// Storage for good images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores every file under `namespace` and returns their public URLs in input order.
    async fn upload(
        &self,
        files: Vec<ImageUpload>,
        namespace: &str,
    ) -> Result<Vec<String>, ImageStoreError>;

    /// Removes the files behind `urls`. Files that are already gone are not an error.
    async fn delete(&self, urls: Vec<String>) -> Result<(), ImageStoreError>;
}

/// Filesystem-backed [`ImageStore`].
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    base_url: String,
}

impl LocalImageStore {
    /// `base_url` is the prefix the `root` directory is served under, e.g. `/storage`.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a public URL back to the file it was written to.
    fn resolve(&self, url: &str) -> Result<PathBuf, ImageStoreError> {
        let relative = url
            .strip_prefix(&self.base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| ImageStoreError::UnknownUrl(url.to_string()))?;

        let relative = Path::new(relative);
        let only_normal = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !only_normal || relative.as_os_str().is_empty() {
            return Err(ImageStoreError::UnknownUrl(url.to_string()));
        }

        Ok(self.root.join(relative))
    }

    async fn remove_all(paths: &[PathBuf]) {
        for path in paths {
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), error = %e, "Failed to clean up image");
            }
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(
        &self,
        files: Vec<ImageUpload>,
        namespace: &str,
    ) -> Result<Vec<String>, ImageStoreError> {
        let dir = self.root.join(namespace);
        tokio::fs::create_dir_all(&dir).await?;

        let mut written = Vec::with_capacity(files.len());
        let mut urls = Vec::with_capacity(files.len());

        for file in files {
            let Some(format) = file.format() else {
                Self::remove_all(&written).await;
                return Err(ImageStoreError::UnsupportedFormat);
            };

            let file_name = format!("{}.{}", Uuid::now_v7(), format.extension());
            let path = dir.join(&file_name);

            if let Err(e) = tokio::fs::write(&path, &file.bytes).await {
                Self::remove_all(&written).await;
                return Err(e.into());
            }

            tracing::debug!(path = %path.display(), size = file.bytes.len(), "Stored image");
            written.push(path);
            urls.push(format!("{}/{}/{}", self.base_url, namespace, file_name));
        }

        Ok(urls)
    }

    async fn delete(&self, urls: Vec<String>) -> Result<(), ImageStoreError> {
        let paths = urls
            .iter()
            .map(|url| self.resolve(url))
            .collect::<Result<Vec<_>, _>>()?;

        for path in paths {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Deleted image"),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "Image already gone");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Smallest byte strings that sniff as each supported format.
    pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    pub const GIF: &[u8] = b"GIF89a\x01\0\x01\0";
}
