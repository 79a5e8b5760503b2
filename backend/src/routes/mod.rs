mod docs;
pub mod health;
pub mod images;
pub mod posts;
pub mod projects;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .api_route("/api/images", get(images::list_folder_images))
        .api_route("/api/images/random", get(images::random_images))
        // Bare-array shape, kept out of the OpenAPI document
        .route(
            "/api/folders/{folder}/images",
            axum::routing::get(images::legacy_folder_images),
        )
        .api_route(
            "/api/posts",
            get(posts::list_posts).post(posts::create_post),
        )
        .api_route("/api/posts/tags", get(posts::list_tags))
        .api_route("/api/posts/{id}", get(posts::get_post))
        .api_route("/api/projects", get(projects::list_projects))
        .api_route("/api/projects/{id}", get(projects::get_project))
}
