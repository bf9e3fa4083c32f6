//! R-Inventory
//!
//! Product inventory web application using Rust + Actix-Web.
//! Products are kept in a DynamoDB table and their images in a public S3 bucket.

use actix_files::Files;
use actix_web::{web, App, HttpServer, middleware};
use anyhow::Context;
use tracing::info;
use tracing_actix_web::TracingLogger;
use std::sync::Arc;

mod api;
mod config;
mod domain;
mod storage;
mod views;

use crate::api::middleware::UploadPolicy;
use crate::config::{Settings, StorageBackend};
use crate::storage::{
    DynamoProductTable, ImageStore, MemoryImageStore, MemoryProductTable, ProductTable, S3ImageStore,
};
use crate::views::ViewRenderer;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Settings,
    pub products: Arc<dyn ProductTable>,
    pub images: Arc<dyn ImageStore>,
    /// The in-memory bucket, when active, so `/images` can serve from it
    pub local_images: Option<Arc<MemoryImageStore>>,
    pub views: ViewRenderer,
}

/// Storage clients selected by configuration
struct Backends {
    products: Arc<dyn ProductTable>,
    images: Arc<dyn ImageStore>,
    local_images: Option<Arc<MemoryImageStore>>,
}

/// Build the table and bucket clients selected by configuration
async fn build_backends(settings: &Settings) -> Backends {
    let storage_settings = &settings.storage;

    match storage_settings.backend {
        StorageBackend::Aws => {
            let sdk_config = storage::load_sdk_config(&settings.aws).await;
            let table = DynamoProductTable::new(&sdk_config, &storage_settings.table_name);
            let images = S3ImageStore::new(&sdk_config, &settings.aws, storage_settings);

            info!(
                region = %settings.aws.region,
                table = %table.table_name(),
                bucket = %images.bucket(),
                "AWS clients initialized"
            );

            Backends {
                products: Arc::new(table),
                images: Arc::new(images),
                local_images: None,
            }
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            let url_base = storage_settings
                .public_url_prefix
                .as_deref()
                .unwrap_or(api::handlers::images::IMAGE_ROUTE);
            let images = Arc::new(MemoryImageStore::new(url_base));

            Backends {
                products: Arc::new(MemoryProductTable::new()),
                images: images.clone(),
                local_images: Some(images),
            }
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("r_inventory=info".parse()?)
                .add_directive("actix_web=info".parse()?)
        )
        .json()
        .init();

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;
    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);

    info!(
        "Starting R-Inventory v{} on {}",
        env!("CARGO_PKG_VERSION"),
        bind_addr
    );

    let views = ViewRenderer::new(&settings.views.path).context("Failed to load views")?;
    let backends = build_backends(&settings).await;

    let upload_policy = web::Data::new(UploadPolicy::from(&settings.upload));
    let static_dir = settings.assets.static_dir.clone();
    let serve_static = static_dir.is_dir();
    if serve_static {
        info!("Serving static assets from {}", static_dir.display());
    }
    let workers = settings.server.workers.unwrap_or_else(|| num_cpus::get() * 2);

    // Create shared application state
    let app_state = web::Data::new(AppState {
        settings,
        products: backends.products,
        images: backends.images,
        local_images: backends.local_images,
        views,
    });

    // Configure and start HTTP server
    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(app_state.clone())
            .app_data(upload_policy.clone())
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "r-inventory"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION")))
            );

        if serve_static {
            app = app.service(Files::new("/static", static_dir.clone()));
        }

        app.configure(api::configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
