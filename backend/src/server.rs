use std::sync::Arc;

use aide::openapi::OpenApi;
use axum::{error_handling::HandleErrorLayer, http::StatusCode, Extension, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::{BoxError, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::routes;
use crate::{
    content_store::ContentStore,
    gallery::GalleryService,
    types::{AppError, Environment},
};

/// Renders a failure of the outer middleware stack as an API error
#[allow(clippy::unused_async)]
async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return AppError::new(
            StatusCode::REQUEST_TIMEOUT,
            "request_timeout",
            "Request timed out",
            true,
        );
    }

    tracing::error!("Unhandled middleware error: {err}");
    AppError::internal()
}

/// Builds the application router with all dependencies attached
pub fn router(
    environment: Environment,
    gallery: Arc<GalleryService>,
    content_store: Arc<dyn ContentStore>,
) -> Router {
    let mut openapi = OpenApi::default();
    let request_timeout = environment.request_timeout();

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(gallery))
        .layer(Extension(content_store))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
}

/// Starts the server with the given environment and dependencies
///
/// Runs until `shutdown` is cancelled, then drains in-flight requests.
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    gallery: Arc<GalleryService>,
    content_store: Arc<dyn ContentStore>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], environment.port()));
    let router = router(environment, gallery, content_store);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Portfolio Backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(anyhow::Error::from)
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
///
/// # Panics
///
/// Panics if the signal handlers cannot be installed
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
