//! Wire types shared between the portfolio backend and its clients

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A gallery image in the stable shape exposed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Provider-side identifier, including the folder path
    pub public_id: String,
    /// Secure delivery URL
    pub url: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Subfolder the image was sampled from (aggregated responses only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

/// A page of gallery images
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryResponse {
    pub images: Vec<ImageRecord>,
    /// Cursor for the next page of a single-folder listing
    pub next_cursor: Option<String>,
}

/// Random travel mix, which is never paginated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RandomImagesResponse {
    pub images: Vec<ImageRecord>,
}

impl From<GalleryResponse> for RandomImagesResponse {
    fn from(response: GalleryResponse) -> Self {
        Self {
            images: response.images,
        }
    }
}

/// An article with its aggregated tag names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    pub tags: Vec<String>,
}

/// Body of `POST /api/posts`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreatePostResponse {
    pub message: String,
    #[serde(rename = "postId")]
    pub post_id: i32,
}

/// A portfolio project card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Project {
    pub id: String,
    #[serde(rename = "ghLink")]
    pub gh_link: String,
    pub imgsrc: String,
    pub imgalt: String,
    /// Inline style overrides for the project image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imgstyle: Option<serde_json::Value>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub role: String,
    /// Free-form technology breakdown
    pub tech: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_image_record_omits_missing_folder() {
        let record = ImageRecord {
            public_id: "travel/japan/kyoto".to_string(),
            url: "https://res.example.com/kyoto.jpg".to_string(),
            width: 1200,
            height: 800,
            folder: None,
        };

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "publicId": "travel/japan/kyoto",
                "url": "https://res.example.com/kyoto.jpg",
                "width": 1200,
                "height": 800
            })
        );
    }

    #[test]
    fn test_gallery_response_always_carries_cursor() {
        let response = GalleryResponse::default();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "images": [], "nextCursor": null })
        );
    }

    #[test]
    fn test_project_uses_client_field_names() {
        let value = json!({
            "id": "raytracer",
            "ghLink": "https://github.com/example/raytracer",
            "imgsrc": "/img/raytracer.png",
            "imgalt": "Rendered spheres",
            "title": "Raytracer",
            "type": "personal",
            "description": "A weekend raytracer",
            "role": "Author",
            "tech": { "languages": ["Rust"] }
        });

        let project: Project = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(project.kind, "personal");
        assert_eq!(project.imgstyle, None);
        assert_eq!(serde_json::to_value(&project).unwrap(), value);
    }
}
