use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use crate::AppState;
use crate::api::models::assets::ImageResponse;
use crate::errors::{Error, Result};

/// The file part of a multipart form, buffered in memory. Body size is
/// bounded by `limits.max_upload_bytes` at the router level.
pub(crate) struct UploadField {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Split a multipart form into its text fields and the first file field.
pub(crate) async fn split_form(
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, Option<UploadField>)> {
    let mut texts = HashMap::new();
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        let name = field.name().unwrap_or("").to_string();
        let filename = field.file_name().map(|s| s.to_string());

        match filename {
            Some(filename) => {
                let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
                    message: format!("Failed to read uploaded file: {e}"),
                })?;
                if file.is_none() {
                    file = Some(UploadField {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            None => {
                let value = field.text().await.map_err(|e| Error::BadRequest {
                    message: format!("Failed to read field '{name}': {e}"),
                })?;
                texts.insert(name, value);
            }
        }
    }

    Ok((texts, file))
}

pub(crate) fn require_file(file: Option<UploadField>) -> Result<UploadField> {
    file.ok_or_else(|| Error::BadRequest {
        message: "No file uploaded".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/images/{category}",
    tag = "images",
    summary = "List images",
    responses(
        (status = 200, description = "Stored images in directory order", body = Vec<ImageResponse>),
        (status = 404, description = "Category directory does not exist")
    ),
    params(
        ("category" = String, Path, description = "Category identifier"),
    )
)]
#[tracing::instrument(skip_all, fields(category = %category))]
pub async fn list_images(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<ImageResponse>>> {
    let assets = state.service.list_assets(&category).await?;
    Ok(Json(assets.into_iter().map(ImageResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/images/{category}",
    tag = "images",
    summary = "Upload image",
    description = "Store an uploaded image under its original filename. Categories with a resize \
                   policy normalize the image to the configured dimensions; others store it \
                   byte-for-byte. Re-uploading a filename replaces the stored image.",
    request_body(content_type = "multipart/form-data", description = "Image file upload"),
    responses(
        (status = 201, description = "Image stored", body = ImageResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown category"),
        (status = 422, description = "Upload is not a decodable image")
    ),
    params(
        ("category" = String, Path, description = "Category identifier"),
    )
)]
#[tracing::instrument(skip_all, fields(category = %category))]
pub async fn upload_image(
    State(state): State<AppState>,
    Path(category): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ImageResponse>)> {
    let (_, file) = split_form(multipart).await?;
    let file = require_file(file)?;

    let upload = state.service.spool(&file.filename, &file.bytes).await?;
    let asset = state.service.add_asset(&category, upload).await?;
    Ok((StatusCode::CREATED, Json(asset.into())))
}

#[utoipa::path(
    put,
    path = "/api/images/{category}/{filename}",
    tag = "images",
    summary = "Replace image",
    description = "Replace a stored image with a new upload. The new file is written before the \
                   old one is removed; when the uploaded filename matches the old one this is a \
                   plain overwrite.",
    request_body(content_type = "multipart/form-data", description = "Replacement image file"),
    responses(
        (status = 200, description = "Image replaced", body = ImageResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown category or prior image missing"),
        (status = 422, description = "Upload is not a decodable image")
    ),
    params(
        ("category" = String, Path, description = "Category identifier"),
        ("filename" = String, Path, description = "Filename of the image being replaced"),
    )
)]
#[tracing::instrument(skip_all, fields(category = %category, filename = %filename))]
pub async fn replace_image(
    State(state): State<AppState>,
    Path((category, filename)): Path<(String, String)>,
    multipart: Multipart,
) -> Result<Json<ImageResponse>> {
    let (_, file) = split_form(multipart).await?;
    let file = require_file(file)?;

    let upload = state.service.spool(&file.filename, &file.bytes).await?;
    let asset = state.service.replace_asset(&category, &filename, upload).await?;
    Ok(Json(asset.into()))
}

#[utoipa::path(
    delete,
    path = "/api/images/{category}/{filename}",
    tag = "images",
    summary = "Delete image",
    responses(
        (status = 204, description = "Image deleted"),
        (status = 404, description = "Image not found")
    ),
    params(
        ("category" = String, Path, description = "Category identifier"),
        ("filename" = String, Path, description = "Filename to delete"),
    )
)]
#[tracing::instrument(skip_all, fields(category = %category, filename = %filename))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path((category, filename)): Path<(String, String)>,
) -> Result<StatusCode> {
    state.service.delete_asset(&category, &filename).await?;
    Ok(StatusCode::NO_CONTENT)
}
