//! OpenAPI documentation for the JSON API.

use utoipa::OpenApi;

use crate::api::models::assets::{
    CategoryResponse, DeleteImageRequest, DeleteImageResponse, ImageResponse,
};
use crate::registry::ResizePolicy;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "imgctl",
        description = "Category-driven image asset manager"
    ),
    paths(
        crate::api::handlers::categories::list_categories,
        crate::api::handlers::assets::list_images,
        crate::api::handlers::assets::upload_image,
        crate::api::handlers::assets::replace_image,
        crate::api::handlers::assets::delete_image,
    ),
    components(schemas(
        CategoryResponse,
        ImageResponse,
        DeleteImageRequest,
        DeleteImageResponse,
        ResizePolicy
    )),
    tags(
        (name = "categories", description = "The configured category table"),
        (name = "images", description = "Stored image management")
    )
)]
pub struct ApiDoc;
