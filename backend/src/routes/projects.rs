use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use common_types::Project;
use tracing::instrument;

use crate::{
    content_store::{ContentStore, ContentStoreError},
    types::AppError,
};

/// List portfolio projects
///
/// # Errors
///
/// - `500 INTERNAL_SERVER_ERROR` - Database failure
#[instrument(skip(store))]
pub async fn list_projects(
    Extension(store): Extension<Arc<dyn ContentStore>>,
) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(store.list_projects().await?))
}

/// Get a project by ID
///
/// # Errors
///
/// - `404 NOT_FOUND` - No project with this ID
/// - `500 INTERNAL_SERVER_ERROR` - Database failure
#[instrument(skip(store))]
pub async fn get_project(
    Extension(store): Extension<Arc<dyn ContentStore>>,
    Path(id): Path<String>,
) -> Result<Json<Project>, AppError> {
    let project = store
        .get_project(&id)
        .await?
        .ok_or_else(|| ContentStoreError::NotFound(format!("project {id}")))?;

    Ok(Json(project))
}
