//! Serving stored image bytes.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Response, header},
    response::IntoResponse,
};

use crate::AppState;
use crate::errors::Result;

/// Serve one stored asset.
///
/// Stored content is mutable under a fixed name (uploads and replaces reuse
/// filenames), so responses are marked `no-cache`.
#[tracing::instrument(skip_all, fields(category = %category, filename = %filename))]
pub async fn serve_image(
    State(state): State<AppState>,
    Path((category, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let bytes = state.service.read_asset(&category, &filename).await?;
    let mime = mime_guess::from_path(&filename).first_or_octet_stream();

    Ok(Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(bytes))
        .unwrap())
}
