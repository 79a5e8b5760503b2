use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use common_types::{GalleryResponse, RandomImagesResponse};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{instrument, Instrument};

use crate::{
    gallery::{GalleryResult, GalleryService},
    types::AppError,
};

/// Header carrying the next page cursor on the bare-array folder listing
pub const NEXT_CURSOR_HEADER: HeaderName = HeaderName::from_static("x-next-cursor");

/// Runs a gallery query on its own task
///
/// Provider calls and the cache write complete even when the request is
/// dropped, e.g. by the request timeout, so the next request finds the cache
/// warm.
async fn detached<F, T>(query: F) -> Result<T, AppError>
where
    F: std::future::Future<Output = GalleryResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(query.in_current_span())
        .await
        .map_err(|e| {
            tracing::error!("Gallery task failed: {e}");
            AppError::internal()
        })?
        .map_err(AppError::from)
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FolderImagesQuery {
    /// Subfolder of the gallery root, e.g. `japan`
    pub folder: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CursorQuery {
    /// Cursor returned by the previous page
    pub cursor: Option<String>,
}

/// List the images of one gallery folder
///
/// Returns the first page of images under `<root>/<folder>/`. Responses are
/// cached for the configured TTL.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - `folder` is missing, blank or not a single segment
/// - `500 INTERNAL_SERVER_ERROR` - Media provider failure
#[instrument(skip(gallery))]
pub async fn list_folder_images(
    Extension(gallery): Extension<Arc<GalleryService>>,
    Query(query): Query<FolderImagesQuery>,
) -> Result<Json<GalleryResponse>, AppError> {
    let folder = query.folder.unwrap_or_default();
    let response = detached(async move { gallery.folder_images(&folder, None).await }).await?;

    Ok(Json(response))
}

/// Random travel mix
///
/// Samples a bounded number of images from each of the first gallery
/// subfolders. Folders that fail to load are left out of the mix.
///
/// # Errors
///
/// - `500 INTERNAL_SERVER_ERROR` - Subfolder discovery or the root fallback failed
#[instrument(skip(gallery))]
pub async fn random_images(
    Extension(gallery): Extension<Arc<GalleryService>>,
) -> Result<Json<RandomImagesResponse>, AppError> {
    let response = detached(async move { gallery.random_images().await }).await?;

    Ok(Json(response.into()))
}

/// Folder listing in the legacy shape: a bare image array
///
/// The pagination cursor is passed through to the provider and the next one
/// is returned in the `x-next-cursor` header.
#[instrument(skip(gallery))]
pub async fn legacy_folder_images(
    Extension(gallery): Extension<Arc<GalleryService>>,
    Path(folder): Path<String>,
    Query(query): Query<CursorQuery>,
) -> Result<Response, AppError> {
    let page = detached(async move {
        gallery
            .folder_images(&folder, query.cursor.as_deref())
            .await
    })
    .await?;

    let mut response = Json(page.images).into_response();
    if let Some(cursor) = page.next_cursor {
        match HeaderValue::from_str(&cursor) {
            Ok(value) => {
                response.headers_mut().insert(NEXT_CURSOR_HEADER, value);
            }
            Err(e) => tracing::warn!("Dropping unrepresentable cursor: {e}"),
        }
    }

    Ok(response)
}
