mod common;

use common::*;

use http::StatusCode;
use portfolio_backend::content_store::memory::InMemoryContentStore;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_list_projects_uses_client_field_names() {
    let store = InMemoryContentStore::new()
        .with_projects(vec![sample_project("atlas"), sample_project("beacon")]);
    let context = TestContext::with_store(store);

    let response = context
        .send_get_request("/api/projects")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["ghLink"], "https://github.com/example/atlas");
    assert_eq!(body[0]["type"], "web");
    assert!(body[0].get("imgstyle").is_none());
}

#[tokio::test]
async fn test_get_project() {
    let store = InMemoryContentStore::new().with_projects(vec![sample_project("atlas")]);
    let context = TestContext::with_store(store);

    let response = context
        .send_get_request("/api/projects/atlas")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["title"], "ATLAS");
}

#[tokio::test]
async fn test_get_project_not_found() {
    let context = TestContext::with_store(InMemoryContentStore::new());

    let response = context
        .send_get_request("/api/projects/missing")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
