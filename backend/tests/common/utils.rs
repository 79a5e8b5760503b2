use axum::response::Response;
use common_types::Project;
use http_body_util::BodyExt;
use serde_json::json;

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// A project card with a recognizable id
pub fn sample_project(id: &str) -> Project {
    Project {
        id: id.to_string(),
        gh_link: format!("https://github.com/example/{id}"),
        imgsrc: format!("/img/{id}.png"),
        imgalt: format!("{id} screenshot"),
        imgstyle: None,
        title: id.to_uppercase(),
        kind: "web".to_string(),
        description: format!("The {id} project"),
        role: "Developer".to_string(),
        tech: json!({ "frontend": ["react"], "backend": ["rust"] }),
    }
}
