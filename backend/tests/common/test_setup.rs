use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, response::Response, Router};
use portfolio_backend::{
    cache::{GalleryCache, ManualClock},
    content_store::{memory::InMemoryContentStore, ContentStore},
    gallery::{GalleryConfig, GalleryService},
    media_provider::mock::MockMediaProvider,
    server,
    types::Environment,
};
use tower::ServiceExt;

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    dotenvy::from_path(".env.example").ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Router wired to a scripted media provider and an in-memory content store
pub struct TestContext {
    pub router: Router,
    pub provider: Arc<MockMediaProvider>,
    pub cache: Arc<GalleryCache>,
    pub clock: Arc<ManualClock>,
}

impl TestContext {
    pub fn new(provider: MockMediaProvider, store: InMemoryContentStore) -> Self {
        setup_test_env();

        let provider = Arc::new(provider);
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(GalleryCache::new(clock.clone()));
        let gallery = Arc::new(GalleryService::new(
            provider.clone(),
            cache.clone(),
            GalleryConfig::default(),
        ));
        let store: Arc<dyn ContentStore> = Arc::new(store);

        let router = server::router(Environment::Development, gallery, store);

        Self {
            router,
            provider,
            cache,
            clock,
        }
    }

    /// Context with a media provider only
    pub fn with_provider(provider: MockMediaProvider) -> Self {
        Self::new(provider, InMemoryContentStore::new())
    }

    /// Context with a content store only
    pub fn with_store(store: InMemoryContentStore) -> Self {
        Self::new(MockMediaProvider::new(), store)
    }

    /// Moves the cache clock forward
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }
}
