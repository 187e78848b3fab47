//! # imgctl: Category-Driven Image Asset Manager
//!
//! `imgctl` is a small web service for managing a site's image assets. Images are uploaded into a
//! fixed set of named categories; each category either normalizes its images to a configured
//! target resolution or stores them untouched, and every stored image is addressable at a stable
//! URL derived from its category and original filename.
//!
//! ## Overview
//!
//! Sites that render fixed-size image slots (team portraits, client logos, slider backdrops) need
//! every asset in a slot to have exactly the slot's dimensions, regardless of what editors upload.
//! `imgctl` solves this at ingestion time: the category an image is uploaded into decides whether
//! and how it is resized, so everything served from a category is already the right size.
//!
//! ### What It Does
//!
//! At its core, `imgctl` receives a multipart upload, validates the target category against an
//! immutable table fixed at startup, applies the category's cover-fit resize policy (scale to
//! fill the target box, crop centered overflow) or passes the bytes through verbatim, and writes
//! the result into a directory-per-category tree. The filesystem is the only source of truth:
//! listings are fresh directory scans, and a stored image is served at
//! `/img/<category>/<filename>`. Uploaded filenames are kept verbatim - re-uploading a name
//! replaces the stored image at the same URL, which is the intended editorial workflow.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer. The
//! request path is: handler → [`service::AssetService`] → [`pipeline::IngestionPipeline`] →
//! [`store::AssetStore`]. Uploads are spooled to disk as [`upload::EphemeralUpload`] values whose
//! spool files are removed on every exit path. Asset writes go through a temp-file-and-rename
//! sequence so a concurrent reader never observes a torn file. Image decoding and resizing run on
//! the blocking thread pool.
//!
//! A small server-rendered UI (category overview and per-category galleries) sits on top of the
//! same service, and the JSON API is documented with OpenAPI at `/docs`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use imgctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = imgctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Initialize telemetry (structured logging)
//!     imgctl::telemetry::init_telemetry()?;
//!
//!     // Create and start the application
//!     let app = Application::new(config).await?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod errors;
mod openapi;
pub mod pipeline;
pub mod registry;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod upload;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    Json, Router,
    routing::{delete, get, post, put},
};
use bon::Builder;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, instrument, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
use config::CorsOrigin;
use openapi::ApiDoc;
use registry::CategoryRegistry;
use service::AssetService;

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `config`: Application configuration loaded from file/environment
/// - `service`: The asset service every handler delegates to
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub service: Arc<AssetService>,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - The JSON image API (list/upload/replace/delete per category)
/// - Stored image serving at `/img/{category}/{filename}`
/// - The server-rendered management UI and its form endpoints
/// - OpenAPI documentation at `/docs`
/// - CORS configuration and tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let upload_limit = state.config.limits.max_upload_bytes as usize;

    let api_routes = Router::new()
        .route("/api/categories", get(api::handlers::categories::list_categories))
        .route("/api/images/{category}", get(api::handlers::assets::list_images))
        .route("/api/images/{category}", post(api::handlers::assets::upload_image))
        .route(
            "/api/images/{category}/{filename}",
            put(api::handlers::assets::replace_image),
        )
        .route(
            "/api/images/{category}/{filename}",
            delete(api::handlers::assets::delete_image),
        );

    // Form endpoints the management pages post to (not part of the API docs)
    let form_routes = Router::new()
        .route("/upload", post(api::handlers::forms::upload_form))
        .route("/modify", post(api::handlers::forms::modify_form))
        .route("/delete", post(api::handlers::forms::delete_form));

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/", get(api::handlers::pages::home))
        .route("/add-images", get(api::handlers::pages::categories_page))
        .route("/category", get(api::handlers::pages::category_page))
        .route("/img/{category}/{filename}", get(api::handlers::media::serve_image))
        .merge(api_routes)
        .merge(form_routes)
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state.clone())
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Remove spool files left behind by a previous run that stopped mid-upload.
async fn sweep_spool_dir(spool_dir: &std::path::Path) -> anyhow::Result<()> {
    let mut entries = match tokio::fs::read_dir(spool_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0usize;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }
    if removed > 0 {
        debug!(removed, "Swept stale spool files");
    }
    Ok(())
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] builds the category registry, prepares the
///    data and spool directories, and assembles the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests drain and the
///    server stops
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting image manager with configuration: {:#?}", config);

        let registry = CategoryRegistry::new(&config.categories)?;

        // The data root and spool directory exist before the first request
        tokio::fs::create_dir_all(&config.data_dir).await?;
        tokio::fs::create_dir_all(config.spool_dir()).await?;
        sweep_spool_dir(&config.spool_dir()).await?;

        let service = Arc::new(AssetService::new(
            registry,
            config.data_dir.clone(),
            config.spool_dir(),
        ));

        let state = AppState::builder()
            .config(config.clone())
            .service(service)
            .build();
        let router = build_router(&state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Image manager listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
