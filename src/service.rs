//! Asset service: the composition root the HTTP layer calls.
//!
//! Owns the category registry, the store and the ingestion pipeline, and
//! exposes the list/add/replace/delete surface. The registry is injected at
//! construction, so tests run against their own category tables.

use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::{Error, Result};
use crate::pipeline::IngestionPipeline;
use crate::registry::CategoryRegistry;
use crate::store::{AssetStore, validate_name};
use crate::types::AssetRef;
use crate::upload::EphemeralUpload;

pub struct AssetService {
    registry: Arc<CategoryRegistry>,
    store: Arc<AssetStore>,
    pipeline: IngestionPipeline,
    spool_dir: PathBuf,
}

impl AssetService {
    pub fn new(registry: CategoryRegistry, data_dir: PathBuf, spool_dir: PathBuf) -> Self {
        let registry = Arc::new(registry);
        let store = Arc::new(AssetStore::new(data_dir));
        let pipeline = IngestionPipeline::new(registry.clone(), store.clone());
        Self {
            registry,
            store,
            pipeline,
            spool_dir,
        }
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Spool an upload's bytes so they can be handed to ingestion.
    pub async fn spool(&self, original_filename: &str, bytes: &[u8]) -> Result<EphemeralUpload> {
        EphemeralUpload::spool(&self.spool_dir, original_filename, bytes).await
    }

    /// List stored assets. A category whose directory was never created is
    /// reported as missing, never coerced to an empty listing.
    pub async fn list_assets(&self, category: &str) -> Result<Vec<AssetRef>> {
        let filenames = self.store.list(category).await?;
        Ok(filenames
            .into_iter()
            .map(|filename| AssetRef::new(category, filename))
            .collect())
    }

    pub async fn add_asset(&self, category: &str, upload: EphemeralUpload) -> Result<AssetRef> {
        self.pipeline.ingest(category, upload).await
    }

    /// Replace a stored asset with a new upload.
    ///
    /// The new file is fully written before the old one is removed, so there
    /// is never a window with zero copies present. When the names match this
    /// degenerates to a plain overwrite.
    pub async fn replace_asset(
        &self,
        category: &str,
        old_filename: &str,
        upload: EphemeralUpload,
    ) -> Result<AssetRef> {
        self.registry.lookup(category)?;
        validate_name(old_filename)?;
        if !self.store.contains(category, old_filename).await {
            return Err(Error::AssetNotFound {
                category: category.to_string(),
                filename: old_filename.to_string(),
            });
        }

        let asset = self.pipeline.ingest(category, upload).await?;

        if asset.filename != old_filename {
            match self.store.delete(category, old_filename).await {
                // Already gone: a concurrent writer won the race
                Ok(()) | Err(Error::AssetNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(asset)
    }

    pub async fn delete_asset(&self, category: &str, filename: &str) -> Result<()> {
        self.store.delete(category, filename).await
    }

    /// Raw stored bytes, for the media-serving handler.
    pub async fn read_asset(&self, category: &str, filename: &str) -> Result<Vec<u8>> {
        self.store.read(category, filename).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryConfig, ResizeConfig};
    use std::io::Cursor;

    fn test_service(root: &std::path::Path) -> AssetService {
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
        AssetService::new(
            registry,
            root.to_path_buf(),
            root.join(".uploads"),
        )
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([40, 90, 160]),
        ));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    async fn stored_dimensions(service: &AssetService, category: &str, filename: &str) -> (u32, u32) {
        let bytes = service.read_asset(category, filename).await.unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        (decoded.width(), decoded.height())
    }

    #[tokio::test]
    async fn upload_replace_delete_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());

        // Upload a 800x600 logo into the 200x200 category
        let upload = service.spool("logo.png", &png_bytes(800, 600)).await.unwrap();
        let asset = service.add_asset("clients", upload).await.unwrap();
        assert_eq!(asset.url(), "/img/clients/logo.png");
        assert_eq!(stored_dimensions(&service, "clients", "logo.png").await, (200, 200));

        // Replace under a new name: new file appears resized, old one is gone
        let upload = service.spool("logo2.png", &png_bytes(640, 480)).await.unwrap();
        let replaced = service.replace_asset("clients", "logo.png", upload).await.unwrap();
        assert_eq!(replaced.filename, "logo2.png");
        assert_eq!(stored_dimensions(&service, "clients", "logo2.png").await, (200, 200));
        let listed = service.list_assets("clients").await.unwrap();
        assert_eq!(listed, vec![AssetRef::new("clients", "logo2.png")]);

        // Delete drains the category
        service.delete_asset("clients", "logo2.png").await.unwrap();
        assert!(service.list_assets("clients").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn passthrough_category_stores_bytes_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());

        let bytes = png_bytes(37, 41);
        let upload = service.spool("mark.png", &bytes).await.unwrap();
        service.add_asset("logos", upload).await.unwrap();

        assert_eq!(service.read_asset("logos", "mark.png").await.unwrap(), bytes);
    }

    #[tokio::test]
    async fn same_name_upload_replaces_prior_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());

        let first = png_bytes(10, 10);
        let second = png_bytes(20, 20);

        let upload = service.spool("mark.png", &first).await.unwrap();
        service.add_asset("logos", upload).await.unwrap();
        let upload = service.spool("mark.png", &second).await.unwrap();
        service.add_asset("logos", upload).await.unwrap();

        assert_eq!(service.list_assets("logos").await.unwrap().len(), 1);
        assert_eq!(service.read_asset("logos", "mark.png").await.unwrap(), second);
    }

    #[tokio::test]
    async fn replace_with_same_name_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());

        let upload = service.spool("logo.png", &png_bytes(300, 300)).await.unwrap();
        service.add_asset("clients", upload).await.unwrap();

        let upload = service.spool("logo.png", &png_bytes(500, 100)).await.unwrap();
        let replaced = service.replace_asset("clients", "logo.png", upload).await.unwrap();

        assert_eq!(replaced.filename, "logo.png");
        assert_eq!(service.list_assets("clients").await.unwrap().len(), 1);
        assert_eq!(stored_dimensions(&service, "clients", "logo.png").await, (200, 200));
    }

    #[tokio::test]
    async fn replace_requires_existing_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());

        let upload = service.spool("new.png", &png_bytes(10, 10)).await.unwrap();
        let spool_path = upload.path().to_path_buf();

        let result = service.replace_asset("clients", "absent.png", upload).await;
        assert!(matches!(result, Err(Error::AssetNotFound { .. })));
        // Spool file cleaned even though ingestion never ran
        assert!(!spool_path.exists());
    }

    #[tokio::test]
    async fn replace_checks_category_before_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());

        let upload = service.spool("new.png", &png_bytes(10, 10)).await.unwrap();
        let result = service.replace_asset("nope", "absent.png", upload).await;
        assert!(matches!(result, Err(Error::UnknownCategory { .. })));
    }

    #[tokio::test]
    async fn listing_never_created_category_fails_until_first_upload() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());

        let result = service.list_assets("clients").await;
        assert!(matches!(result, Err(Error::CategoryNotFound { .. })));

        let upload = service.spool("logo.png", &png_bytes(50, 50)).await.unwrap();
        service.add_asset("clients", upload).await.unwrap();

        let listed = service.list_assets("clients").await.unwrap();
        assert_eq!(listed, vec![AssetRef::new("clients", "logo.png")]);
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());

        let upload = service.spool("mark.png", &png_bytes(10, 10)).await.unwrap();
        service.add_asset("logos", upload).await.unwrap();

        service.delete_asset("logos", "mark.png").await.unwrap();
        let second = service.delete_asset("logos", "mark.png").await;
        assert!(matches!(second, Err(Error::AssetNotFound { .. })));
    }

    #[tokio::test]
    async fn upload_to_unknown_category_cleans_spool() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());

        let upload = service.spool("logo.png", &png_bytes(10, 10)).await.unwrap();
        let spool_path = upload.path().to_path_buf();

        let result = service.add_asset("nope", upload).await;
        assert!(matches!(result, Err(Error::UnknownCategory { .. })));
        assert!(!spool_path.exists());
    }
}
