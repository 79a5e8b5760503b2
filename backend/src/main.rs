use std::sync::Arc;

use portfolio_backend::{
    cache::GalleryCache,
    content_store::{ContentStore, PostgresContentStore},
    gallery::GalleryService,
    media_provider::CloudinaryClient,
    server,
    types::Environment,
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    // JSON logs for staging/production, human-readable output for development
    if environment.json_logs() {
        fmt().json().with_env_filter(env_filter).init();
    } else {
        fmt().with_env_filter(env_filter).init();
    }

    info!("Starting Portfolio Backend in {environment} environment");

    let media_provider = CloudinaryClient::new(
        &environment.cloudinary_base_url(),
        environment.cloudinary_credentials(),
        environment.media_provider_timeout(),
    )?;

    let cache = Arc::new(GalleryCache::with_system_clock());
    let gallery = Arc::new(GalleryService::new(
        Arc::new(media_provider),
        cache.clone(),
        environment.gallery_config(),
    ));

    info!(
        root_folder = %gallery.config().root_folder,
        "✅ Initialized gallery"
    );

    let content_store: Arc<dyn ContentStore> =
        Arc::new(PostgresContentStore::connect(&environment.database_url()).await?);

    info!("✅ Connected to database");

    // Single shutdown token for the server and the cache sweeper
    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        server::shutdown_signal().await;
        info!("Shutting down Portfolio Backend...");
        signal_token.cancel();
    });

    let sweeper_handle = environment
        .cache_sweep_interval()
        .map(|every| cache.spawn_sweeper(every, shutdown_token.clone()));

    let server_result = server::start(
        environment,
        gallery,
        content_store,
        shutdown_token.clone(),
    )
    .await;

    shutdown_token.cancel();
    if let Some(handle) = sweeper_handle {
        handle.await.ok();
    }

    info!("✅ Portfolio Backend shutdown complete");

    server_result
}
