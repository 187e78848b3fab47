use axum::{Json, extract::State};

use crate::AppState;
use crate::api::models::assets::CategoryResponse;
use crate::errors::Result;

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    summary = "List categories",
    description = "Categories in configuration order, each with its resize policy.",
    responses(
        (status = 200, description = "Category table", body = Vec<CategoryResponse>)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryResponse>>> {
    let categories = state
        .service
        .registry()
        .entries()
        .map(|(name, policy)| CategoryResponse {
            name: name.to_string(),
            resize: policy.cloned(),
        })
        .collect();
    Ok(Json(categories))
}
