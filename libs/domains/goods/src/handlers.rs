use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State, multipart::MultipartRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, UuidPath,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse, ProcessingFailedResponse,
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::GoodResult;
use crate::forms::GoodForm;
use crate::images::ImageStore;
use crate::models::{Good, GoodView, Page, PageQuery, SearchQuery};
use crate::repository::GoodRepository;
use crate::service::GoodService;

const TAG: &str = "goods";

/// Upper bound for a whole create/update form, several 2 MiB images included.
pub const MAX_FORM_BYTES: usize = 32 * 1024 * 1024;

/// OpenAPI documentation for the goods API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_goods,
        create_good,
        search_goods,
        list_by_category,
        get_good,
        update_good,
        patch_good,
        delete_good,
    ),
    components(
        schemas(Good, GoodView, GoodFormSchema, MessageResponse),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ProcessingFailedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Catalog goods with category and review statistics")
    )
)]
pub struct ApiDoc;

/// Multipart body accepted by create and update
#[derive(ToSchema)]
#[allow(dead_code)]
struct GoodFormSchema {
    /// At most 50 characters
    name: String,
    /// At most 255 characters
    content: String,
    price: f64,
    category_id: Uuid,
    /// Image files (jpeg, png, gif, at most 2048 KiB each) and, on update,
    /// URLs of images the good already has. Send as `img_urls[]`.
    img_urls: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

type SharedService<R, S> = State<Arc<GoodService<R, S>>>;

/// Create the goods router with all HTTP endpoints
pub fn router<R, S>(service: GoodService<R, S>) -> Router
where
    R: GoodRepository + 'static,
    S: ImageStore + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_goods).post(create_good))
        .route("/search", get(search_goods))
        .route("/category/{category_id}", get(list_by_category))
        .route(
            "/{id}",
            get(get_good)
                .put(update_good)
                .patch(patch_good)
                .delete(delete_good),
        )
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
        .with_state(shared_service)
}

/// List every good with category name and review statistics
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "All goods", body = Vec<GoodView>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_goods<R: GoodRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
) -> GoodResult<Json<Vec<GoodView>>> {
    Ok(Json(service.list_goods().await?))
}

/// Create a good from a multipart form
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body(content = GoodFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Good created", body = Good),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_good<R: GoodRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let form = GoodForm::from_multipart(multipart?).await?;
    let good = service.create_good(form).await?;
    Ok((StatusCode::CREATED, Json(good)))
}

/// Search goods by name or content
#[utoipa::path(
    get,
    path = "/search",
    tag = TAG,
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching goods", body = Vec<GoodView>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_goods<R: GoodRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
    Query(query): Query<SearchQuery>,
) -> GoodResult<Json<Vec<GoodView>>> {
    Ok(Json(service.search_goods(query.search.as_deref()).await?))
}

/// List a category's goods, ten per page
#[utoipa::path(
    get,
    path = "/category/{category_id}",
    tag = TAG,
    params(
        ("category_id" = Uuid, Path, description = "Category ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of goods", body = Page<GoodView>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_by_category<R: GoodRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
    UuidPath(category_id): UuidPath,
    Query(query): Query<PageQuery>,
) -> GoodResult<Json<Page<GoodView>>> {
    Ok(Json(service.list_by_category(category_id, query.page()).await?))
}

/// Get a good by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Good ID")
    ),
    responses(
        (status = 200, description = "Good found", body = GoodView),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_good<R: GoodRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
    UuidPath(id): UuidPath,
) -> GoodResult<Json<GoodView>> {
    Ok(Json(service.get_good(id).await?))
}

/// Replace a good's fields and reconcile its images
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Good ID")
    ),
    request_body(content = GoodFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Good updated", body = Good),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = ProcessingFailedResponse)
    )
)]
async fn update_good<R: GoodRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
    UuidPath(id): UuidPath,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Good>, AppError> {
    let form = GoodForm::from_multipart(multipart?).await?;
    Ok(Json(service.update_good(id, form).await?))
}

/// Same as PUT
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Good ID")
    ),
    request_body(content = GoodFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Good updated", body = Good),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = ProcessingFailedResponse)
    )
)]
async fn patch_good<R: GoodRepository, S: ImageStore>(
    state: SharedService<R, S>,
    id: UuidPath,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Good>, AppError> {
    update_good(state, id, multipart).await
}

/// Delete a good
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Good ID")
    ),
    responses(
        (status = 200, description = "Good deleted", body = MessageResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_good<R: GoodRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
    UuidPath(id): UuidPath,
) -> GoodResult<Json<MessageResponse>> {
    service.delete_good(id).await?;
    Ok(Json(MessageResponse {
        message: "Good registration has been cancelled".to_string(),
    }))
}
