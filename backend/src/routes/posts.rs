use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    Extension, Json,
};
use common_types::{CreatePostResponse, Post};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::instrument;
use validator::{Validate, ValidationError};

use crate::{
    content_store::{ContentStore, ContentStoreError, NewPost, PostFilter},
    types::{AppError, ValidatedJson, ValidatedQuery},
};

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Query parameters of the post listing
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct ListPostsQuery {
    /// Case-insensitive text to look for in titles and contents
    #[validate(length(max = 200))]
    pub search: Option<String>,
    /// Only posts carrying this tag
    #[validate(length(max = 64))]
    pub tag: Option<String>,
}

/// Request to publish a post
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CreatePostRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub title: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub content: String,

    /// Tag names; unknown tags are created
    #[serde(default)]
    #[validate(length(max = 20))]
    pub tags: Vec<String>,
}

/// List posts, newest first
///
/// Each post carries the names of its tags.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - `search` or `tag` too long
/// - `500 INTERNAL_SERVER_ERROR` - Database failure
#[instrument(skip(store))]
pub async fn list_posts(
    Extension(store): Extension<Arc<dyn ContentStore>>,
    ValidatedQuery(query): ValidatedQuery<ListPostsQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    let filter = PostFilter {
        search: query.search,
        tag: query.tag,
    }
    .normalized();

    Ok(Json(store.list_posts(&filter).await?))
}

/// Distinct tag names
///
/// # Errors
///
/// - `500 INTERNAL_SERVER_ERROR` - Database failure
#[instrument(skip(store))]
pub async fn list_tags(
    Extension(store): Extension<Arc<dyn ContentStore>>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(store.list_tags().await?))
}

/// Get a post by ID
///
/// # Errors
///
/// - `400 BAD_REQUEST` - ID is not an integer
/// - `404 NOT_FOUND` - No post with this ID
/// - `500 INTERNAL_SERVER_ERROR` - Database failure
#[instrument(skip(store))]
pub async fn get_post(
    Extension(store): Extension<Arc<dyn ContentStore>>,
    Path(id): Path<String>,
) -> Result<Json<Post>, AppError> {
    let id: i32 = id.parse().map_err(|_| {
        AppError::new(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "Post ID must be an integer",
            false,
        )
    })?;

    let post = store
        .get_post(id)
        .await?
        .ok_or_else(|| ContentStoreError::NotFound(format!("post {id}")))?;

    Ok(Json(post))
}

/// Publish a post
///
/// # Returns
///
/// Returns `201 CREATED` with the new post ID
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Missing or blank title/content, invalid JSON
/// - `500 INTERNAL_SERVER_ERROR` - Database failure
#[instrument(skip(store, payload))]
pub async fn create_post(
    Extension(store): Extension<Arc<dyn ContentStore>>,
    ValidatedJson(payload): ValidatedJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<CreatePostResponse>), AppError> {
    let tags = payload
        .tags
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    let post_id = store
        .create_post(NewPost {
            title: payload.title.trim().to_string(),
            content: payload.content,
            tags,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            message: "Post created successfully".to_string(),
            post_id,
        }),
    ))
}
