use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::Deserialize;

use super::{
    FolderDescriptor, MediaProvider, MediaProviderError, MediaProviderResult, ResourcePage,
    SubfolderListing,
};

/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

/// Cloudinary signals rate limiting with the non-standard 420 as well as 429
const STATUS_ENHANCE_YOUR_CALM: u16 = 420;

/// Admin API credentials for one Cloudinary product environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Deserialize)]
struct FoldersResponse {
    #[serde(default)]
    folders: Vec<FolderDescriptor>,
}

/// HTTP client for the Cloudinary Admin API
pub struct CloudinaryClient {
    base_url: Url,
    credentials: CloudinaryCredentials,
    http_client: ClientWithMiddleware,
}

impl CloudinaryClient {
    /// Creates a new Cloudinary client
    ///
    /// # Arguments
    ///
    /// * `base_url` - API origin, `https://api.cloudinary.com` outside of tests
    /// * `credentials` - Cloud name and Admin API key pair
    /// * `timeout` - Per-request timeout applied to every provider call
    ///
    /// # Errors
    ///
    /// Returns `MediaProviderError::ConfigError` if the base URL is invalid or
    /// the HTTP client cannot be built
    pub fn new(
        base_url: &str,
        credentials: CloudinaryCredentials,
        timeout: Duration,
    ) -> MediaProviderResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| MediaProviderError::ConfigError(format!("Invalid base URL: {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(MediaProviderError::ConfigError(format!(
                "Base URL cannot carry a path: {base_url}"
            )));
        }

        let reqwest_client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .build()
            .map_err(|e| {
                MediaProviderError::ConfigError(format!("Failed to create HTTP client: {e}"))
            })?;

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            base_url,
            credentials,
            http_client,
        })
    }

    /// Builds `{base}/v1_1/{cloud}/{segments...}`, percent-encoding each segment
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("v1_1")
                .push(&self.credentials.cloud_name)
                .extend(segments);
        }
        url
    }

    async fn get(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> MediaProviderResult<reqwest::Response> {
        let response = self
            .http_client
            .get(url)
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
            .query(query)
            .send()
            .await?;

        Ok(response)
    }
}

async fn ensure_success(response: reqwest::Response) -> MediaProviderResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == STATUS_ENHANCE_YOUR_CALM {
        return Err(MediaProviderError::RateLimited);
    }

    let body = response.text().await.unwrap_or_default();
    Err(MediaProviderError::UnexpectedStatus {
        status: status.as_u16(),
        body,
    })
}

#[async_trait::async_trait]
impl MediaProvider for CloudinaryClient {
    async fn list_resources(
        &self,
        prefix: &str,
        max_results: u32,
        cursor: Option<&str>,
    ) -> MediaProviderResult<ResourcePage> {
        tracing::debug!(prefix, max_results, "Listing media resources");

        let url = self.endpoint(["resources", "image", "upload"]);
        let max_results = max_results.to_string();

        let mut query = vec![("prefix", prefix), ("max_results", max_results.as_str())];
        if let Some(cursor) = cursor {
            query.push(("next_cursor", cursor));
        }

        let response = ensure_success(self.get(url, &query).await?).await?;
        Ok(response.json::<ResourcePage>().await?)
    }

    async fn list_subfolders(&self, root: &str) -> MediaProviderResult<SubfolderListing> {
        let url = self.endpoint(
            std::iter::once("folders").chain(root.split('/').filter(|s| !s.is_empty())),
        );

        tracing::debug!(root, "Listing media subfolders");

        let response = self.get(url, &[]).await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!(root, "Root folder not registered with media provider");
            return Ok(SubfolderListing::RootMissing);
        }

        let response = ensure_success(response).await?;
        let body = response.json::<FoldersResponse>().await?;
        Ok(SubfolderListing::Folders(body.folders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

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

    #[test]
    fn test_endpoint_layout() {
        let client = client("https://api.cloudinary.com");
        assert_eq!(
            client.endpoint(["resources", "image", "upload"]).as_str(),
            "https://api.cloudinary.com/v1_1/portfolio/resources/image/upload"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client("http://127.0.0.1:9000/");
        assert_eq!(
            client.endpoint(["folders", "road trips"]).as_str(),
            "http://127.0.0.1:9000/v1_1/portfolio/folders/road%20trips"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = CloudinaryClient::new(
            "not a url",
            CloudinaryCredentials {
                cloud_name: "portfolio".to_string(),
                api_key: String::new(),
                api_secret: String::new(),
            },
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(MediaProviderError::ConfigError(_))));
    }
}
