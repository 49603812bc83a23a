//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for Goods API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Goods API",
        version = "0.1.0",
        description = "Catalog goods with images, categories and review statistics",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/goods", api = domain_goods::ApiDoc)
    ),
    tags(
        (name = "goods", description = "Goods management endpoints")
    )
)]
pub struct ApiDoc;
