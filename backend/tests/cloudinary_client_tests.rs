use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use portfolio_backend::media_provider::{
    CloudinaryClient, CloudinaryCredentials, MediaProvider, MediaProviderError, SubfolderListing,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::net::TcpListener;

/// Requests seen by the fake Admin API
#[derive(Debug, Clone, Default)]
struct Recorded {
    queries: Vec<HashMap<String, String>>,
    authorizations: Vec<String>,
}

type Log = Arc<Mutex<Recorded>>;

async fn resources(
    Extension(log): Extension<Log>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let prefix = query.get("prefix").cloned().unwrap_or_default();
    {
        let mut log = log.lock().unwrap();
        log.queries.push(query);
        log.authorizations.push(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string(),
        );
    }

    match prefix.as_str() {
        "travel/busy/" => StatusCode::TOO_MANY_REQUESTS.into_response(),
        "travel/calm/" => StatusCode::from_u16(420).unwrap().into_response(),
        "travel/broken/" => (StatusCode::BAD_GATEWAY, "upstream exploded").into_response(),
        _ => Json(json!({
            "resources": [{
                "public_id": format!("{prefix}kyoto"),
                "secure_url": "https://res.example.com/kyoto.jpg",
                "width": 1200,
                "height": 800,
                "format": "jpg",
                "bytes": 1024
            }],
            "next_cursor": "cursor-2"
        }))
        .into_response(),
    }
}

async fn folders(Path(root): Path<String>) -> impl IntoResponse {
    match root.as_str() {
        "travel" => Json(json!({
            "folders": [
                { "name": "japan", "path": "travel/japan" },
                { "name": "peru", "path": "travel/peru" }
            ],
            "next_cursor": null,
            "total_count": 2
        }))
        .into_response(),
        "empty" => Json(json!({ "folders": [] })).into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "message": "Can't find folder with path" } })),
        )
            .into_response(),
    }
}

/// Starts a fake Admin API for the `portfolio` cloud and returns its origin
async fn spawn_fake_api() -> (String, Log) {
    let log = Log::default();
    let app = Router::new()
        .route(
            "/v1_1/portfolio/resources/image/upload",
            get(resources),
        )
        .route("/v1_1/portfolio/folders/{root}", get(folders))
        .layer(Extension(log.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), log)
}

fn client(base_url: &str) -> CloudinaryClient {
    CloudinaryClient::new(
        base_url,
        CloudinaryCredentials {
            cloud_name: "portfolio".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        },
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_list_resources_decodes_page() {
    let (base_url, log) = spawn_fake_api().await;

    let page = client(&base_url)
        .list_resources("travel/japan/", 50, None)
        .await
        .unwrap();

    assert_eq!(page.next_cursor.as_deref(), Some("cursor-2"));
    assert_eq!(page.resources.len(), 1);
    assert_eq!(page.resources[0].public_id, "travel/japan/kyoto");
    assert_eq!(page.resources[0].width, 1200);
    assert_eq!(page.resources[0].extra["format"], "jpg");

    let recorded = log.lock().unwrap().clone();
    assert_eq!(recorded.queries[0]["prefix"], "travel/japan/");
    assert_eq!(recorded.queries[0]["max_results"], "50");
    assert!(!recorded.queries[0].contains_key("next_cursor"));
    // base64("key:secret")
    assert_eq!(recorded.authorizations[0], "Basic a2V5OnNlY3JldA==");
}

#[tokio::test]
async fn test_list_resources_forwards_cursor() {
    let (base_url, log) = spawn_fake_api().await;

    client(&base_url)
        .list_resources("travel/japan/", 20, Some("abc"))
        .await
        .unwrap();

    let recorded = log.lock().unwrap().clone();
    assert_eq!(recorded.queries[0]["next_cursor"], "abc");
    assert_eq!(recorded.queries[0]["max_results"], "20");
}

#[tokio::test]
async fn test_rate_limit_statuses() {
    let (base_url, _log) = spawn_fake_api().await;
    let client = client(&base_url);

    for prefix in ["travel/busy/", "travel/calm/"] {
        let err = client.list_resources(prefix, 20, None).await.unwrap_err();
        assert!(
            matches!(err, MediaProviderError::RateLimited),
            "prefix {prefix}: {err:?}"
        );
    }
}

#[tokio::test]
async fn test_unexpected_status_keeps_body() {
    let (base_url, _log) = spawn_fake_api().await;

    let err = client(&base_url)
        .list_resources("travel/broken/", 20, None)
        .await
        .unwrap_err();

    match err {
        MediaProviderError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_list_subfolders() {
    let (base_url, _log) = spawn_fake_api().await;
    let client = client(&base_url);

    let SubfolderListing::Folders(found) = client.list_subfolders("travel").await.unwrap() else {
        panic!("expected folders");
    };
    let names: Vec<&str> = found.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["japan", "peru"]);

    assert_eq!(
        client.list_subfolders("empty").await.unwrap(),
        SubfolderListing::Folders(Vec::new())
    );
}

#[tokio::test]
async fn test_missing_root_is_not_an_error() {
    let (base_url, _log) = spawn_fake_api().await;

    assert_eq!(
        client(&base_url).list_subfolders("nowhere").await.unwrap(),
        SubfolderListing::RootMissing
    );
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .list_resources("travel/japan/", 20, None)
        .await
        .unwrap_err();

    assert!(matches!(err, MediaProviderError::Transport(_)), "{err:?}");
}
