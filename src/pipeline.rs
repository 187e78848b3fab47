//! Ingestion: one ephemeral upload becomes one durable asset.

use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, imageops::FilterType};

use crate::errors::{Error, Result};
use crate::registry::{CategoryRegistry, ResizePolicy};
use crate::store::{AssetStore, validate_name};
use crate::types::AssetRef;
use crate::upload::EphemeralUpload;

/// Applies a category's resize policy to uploads and writes the result
/// through the store.
pub struct IngestionPipeline {
    registry: Arc<CategoryRegistry>,
    store: Arc<AssetStore>,
}

impl IngestionPipeline {
    pub fn new(registry: Arc<CategoryRegistry>, store: Arc<AssetStore>) -> Self {
        Self { registry, store }
    }

    /// Turn one spooled upload into one stored asset.
    ///
    /// The destination name is the uploaded filename verbatim - no collision
    /// renaming - so a second upload under the same name replaces the first.
    /// The spool file is removed on every exit path when `upload` drops,
    /// including the early `UnknownCategory` rejection.
    pub async fn ingest(&self, category: &str, upload: EphemeralUpload) -> Result<AssetRef> {
        let policy = self.registry.lookup(category)?.cloned();
        let filename = upload.original_filename().to_string();
        validate_name(&filename)?;

        let bytes = upload.read().await?;
        let resized = policy.is_some();
        let stored = match policy {
            Some(policy) => {
                let source_name = filename.clone();
                tokio::task::spawn_blocking(move || render_cover(&bytes, &source_name, &policy))
                    .await
                    .map_err(|e| Error::Other(anyhow::anyhow!("image processing task failed: {e}")))??
            }
            None => bytes,
        };

        self.store.write(category, &filename, &stored).await?;

        tracing::info!(category, filename = %filename, resized, "Stored image");
        Ok(AssetRef::new(category, filename))
    }
}

/// Decode, cover-fit to the policy's exact dimensions, and re-encode.
///
/// The output format follows the destination filename's extension (falling
/// back to the detected source format), matching what the stored name
/// promises to consumers.
fn render_cover(bytes: &[u8], filename: &str, policy: &ResizePolicy) -> Result<Vec<u8>> {
    let format = match ImageFormat::from_path(filename) {
        Ok(format) => format,
        Err(_) => image::guess_format(bytes).map_err(|e| Error::ImageDecode {
            reason: e.to_string(),
        })?,
    };

    let img = image::load_from_memory(bytes).map_err(|e| Error::ImageDecode {
        reason: e.to_string(),
    })?;
    let resized = img.resize_to_fill(policy.width, policy.height, FilterType::Lanczos3);

    let mut out = Cursor::new(Vec::new());
    resized.write_to(&mut out, format).map_err(|e| Error::ImageDecode {
        reason: e.to_string(),
    })?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryConfig, ResizeConfig};

    fn pipeline(root: &std::path::Path) -> IngestionPipeline {
        let registry = CategoryRegistry::new(&[
            CategoryConfig {
                name: "clients".to_string(),
                resize: Some(ResizeConfig {
                    width: 200,
                    height: 200,
                }),
            },
            CategoryConfig {
                name: "logos".to_string(),
                resize: None,
            },
        ])
        .unwrap();
        IngestionPipeline::new(
            Arc::new(registry),
            Arc::new(AssetStore::new(root.to_path_buf())),
        )
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([120, 30, 200]),
        ));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    async fn spool(dir: &std::path::Path, name: &str, bytes: &[u8]) -> EphemeralUpload {
        EphemeralUpload::spool(&dir.join("spool"), name, bytes).await.unwrap()
    }

    #[tokio::test]
    async fn resize_category_produces_exact_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());

        // Wide landscape input, nothing like the 200x200 target
        let upload = spool(dir.path(), "logo.png", &png_bytes(800, 600)).await;
        let asset = pipeline.ingest("clients", upload).await.unwrap();
        assert_eq!(asset, AssetRef::new("clients", "logo.png"));

        let stored = std::fs::read(dir.path().join("clients/logo.png")).unwrap();
        let decoded = image::load_from_memory(&stored).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 200));
    }

    #[tokio::test]
    async fn portrait_input_also_fills_target_box() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());

        let upload = spool(dir.path(), "tall.png", &png_bytes(90, 700)).await;
        pipeline.ingest("clients", upload).await.unwrap();

        let stored = std::fs::read(dir.path().join("clients/tall.png")).unwrap();
        let decoded = image::load_from_memory(&stored).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 200));
    }

    #[tokio::test]
    async fn passthrough_category_keeps_bytes_identical() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());

        let bytes = png_bytes(37, 41);
        let upload = spool(dir.path(), "mark.png", &bytes).await;
        pipeline.ingest("logos", upload).await.unwrap();

        let stored = std::fs::read(dir.path().join("logos/mark.png")).unwrap();
        assert_eq!(stored, bytes);
    }

    #[tokio::test]
    async fn unknown_category_cleans_spool_file() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());

        let upload = spool(dir.path(), "logo.png", &png_bytes(10, 10)).await;
        let spool_path = upload.path().to_path_buf();

        let result = pipeline.ingest("nope", upload).await;
        assert!(matches!(result, Err(Error::UnknownCategory { .. })));
        assert!(!spool_path.exists());
    }

    #[tokio::test]
    async fn corrupt_image_fails_without_writing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());

        let upload = spool(dir.path(), "broken.png", b"this is not a png").await;
        let spool_path = upload.path().to_path_buf();

        let result = pipeline.ingest("clients", upload).await;
        assert!(matches!(result, Err(Error::ImageDecode { .. })));
        assert!(!dir.path().join("clients/broken.png").exists());
        assert!(!spool_path.exists());
    }

    #[tokio::test]
    async fn corrupt_image_is_accepted_verbatim_by_passthrough() {
        // Pass-through categories never decode, so arbitrary bytes survive
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());

        let upload = spool(dir.path(), "anything.bin", b"not an image").await;
        pipeline.ingest("logos", upload).await.unwrap();

        let stored = std::fs::read(dir.path().join("logos/anything.bin")).unwrap();
        assert_eq!(stored, b"not an image");
    }
}
