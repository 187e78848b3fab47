//! Form endpoints the management pages post to.
//!
//! These mirror the JSON API but speak the browser's language: multipart
//! forms in, redirects back to the gallery page out. Not part of the client
//! API docs.

use axum::{
    Json,
    extract::{Multipart, State},
    response::Redirect,
};

use crate::AppState;
use crate::api::handlers::assets::{require_file, split_form};
use crate::api::models::assets::{DeleteImageRequest, DeleteImageResponse};
use crate::errors::{Error, Result};

fn require_text(texts: &std::collections::HashMap<String, String>, name: &str) -> Result<String> {
    texts.get(name).cloned().ok_or_else(|| Error::BadRequest {
        message: format!("Missing form field '{name}'"),
    })
}

/// Upload form behind the gallery page's "add image" modal.
#[tracing::instrument(skip_all)]
pub async fn upload_form(State(state): State<AppState>, multipart: Multipart) -> Result<Redirect> {
    let (texts, file) = split_form(multipart).await?;
    let category = require_text(&texts, "category")?;
    let file = require_file(file)?;

    let upload = state.service.spool(&file.filename, &file.bytes).await?;
    state.service.add_asset(&category, upload).await?;

    Ok(Redirect::to(&format!("/category?category={category}")))
}

/// Replace form behind the gallery page's "modify image" modal.
#[tracing::instrument(skip_all)]
pub async fn modify_form(State(state): State<AppState>, multipart: Multipart) -> Result<Redirect> {
    let (texts, file) = split_form(multipart).await?;
    let category = require_text(&texts, "category")?;
    let old_image = require_text(&texts, "oldImage")?;
    let file = require_file(file)?;

    let upload = state.service.spool(&file.filename, &file.bytes).await?;
    state.service.replace_asset(&category, &old_image, upload).await?;

    Ok(Redirect::to(&format!("/category?category={category}")))
}

/// Delete endpoint the gallery page calls via fetch.
#[tracing::instrument(skip_all)]
pub async fn delete_form(
    State(state): State<AppState>,
    Json(request): Json<DeleteImageRequest>,
) -> Result<Json<DeleteImageResponse>> {
    state.service.delete_asset(&request.category, &request.image).await?;
    Ok(Json(DeleteImageResponse {
        message: format!("Deleted '{}'", request.image),
    }))
}
