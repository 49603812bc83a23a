//! Goods Domain
//!
//! Catalog goods with their category name and review statistics, plus the
//! image handling that create and update need.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, multipart forms
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌───────────────────┐
//! │   Service   │ ──▶ │ Image coordinator │ ──▶ ImageStore
//! └──────┬──────┘     └───────────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Aggregate queries (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Good, GoodView, Page
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_goods::{
//!     handlers, InMemoryGoodRepository, GoodService, LocalImageStore,
//! };
//!
//! let repository = InMemoryGoodRepository::new();
//! let store = Arc::new(LocalImageStore::new("./storage", "/storage"));
//! let service = GoodService::new(repository, store);
//!
//! let router = handlers::router(service);
//! ```

pub mod coordinator;
pub mod entity;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod images;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use coordinator::{GoodImageCoordinator, ImageInput};
pub use error::{GoodError, GoodResult};
pub use forms::{GoodForm, GoodSubmission};
pub use handlers::ApiDoc;
pub use images::{ImageStore, ImageStoreError, ImageUpload, LocalImageStore};
pub use models::{
    Good, GoodChanges, GoodView, NO_CATEGORY_LABEL, NewGood, Page, PageQuery, SearchQuery,
    SearchTerm,
};
pub use postgres::PgGoodRepository;
pub use repository::{GoodRepository, InMemoryGoodRepository};
pub use service::GoodService;
