//! Travel gallery: per-folder listings and the random multi-folder mix
//!
//! Both operations sit behind the [`GalleryCache`]. A single-folder listing is
//! cached under `gallery_<folder>`; the random mix under a fixed key.
//!
//! The random mix walks the subfolders of the root folder one at a time and
//! samples a bounded number of images from each. Sampling is sequential to
//! stay under the provider's rate limit, and a failing folder is skipped
//! rather than failing the whole mix. When the provider does not know the root
//! as a folder, images directly under the root prefix are served instead and
//! that degraded answer is not cached.

mod error;

use std::sync::Arc;
use std::time::Duration;

use common_types::{GalleryResponse, ImageRecord};
use futures::stream::{self, StreamExt};

use crate::cache::GalleryCache;
use crate::media_provider::{
    FolderDescriptor, MediaProvider, MediaProviderError, MediaProviderResult, RawResource,
    ResourcePage, SubfolderListing,
};

pub use error::{GalleryError, GalleryResult};

/// Cache key of the random travel mix
pub const RANDOM_IMAGES_CACHE_KEY: &str = "random_images_cache";

/// Cache key of the first page of a folder listing
#[must_use]
pub fn folder_cache_key(folder: &str) -> String {
    format!("gallery_{folder}")
}

/// Tunables for gallery queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryConfig {
    /// Provider folder all gallery images live under
    pub root_folder: String,
    /// Lifetime of cached responses
    pub cache_ttl: Duration,
    /// Page size of a single-folder listing
    pub folder_max_results: u32,
    /// Images sampled from each subfolder for the random mix
    pub random_max_results_per_folder: u32,
    /// Images listed directly under the root when it has no folder entity
    pub fallback_max_results: u32,
    /// Maximum number of subfolders sampled for the random mix
    pub folder_fan_out: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            root_folder: "travel".to_string(),
            cache_ttl: Duration::from_secs(3600),
            folder_max_results: 50,
            random_max_results_per_folder: 20,
            fallback_max_results: 30,
            folder_fan_out: 6,
        }
    }
}

/// A subfolder whose sampling failed during a random mix
#[derive(Debug)]
pub struct FolderFailure {
    pub folder: String,
    pub error: MediaProviderError,
}

/// Accumulator of the per-folder sampling fold
#[derive(Debug, Default)]
pub struct FolderSample {
    pub images: Vec<ImageRecord>,
    pub failures: Vec<FolderFailure>,
}

impl FolderSample {
    /// Folds one folder's listing outcome into the sample
    #[must_use]
    pub fn absorb(mut self, folder: &str, outcome: MediaProviderResult<ResourcePage>) -> Self {
        match outcome {
            Ok(page) => self.images.extend(
                page.resources
                    .into_iter()
                    .map(|raw| to_image_record(raw, Some(folder))),
            ),
            Err(error) => self.failures.push(FolderFailure {
                folder: folder.to_string(),
                error,
            }),
        }
        self
    }
}

/// Maps a provider record onto the stable client shape
#[must_use]
pub fn to_image_record(raw: RawResource, folder: Option<&str>) -> ImageRecord {
    ImageRecord {
        public_id: raw.public_id,
        url: raw.secure_url,
        width: raw.width,
        height: raw.height,
        folder: folder.map(ToString::to_string),
    }
}

/// Gallery queries over a media provider, fronted by a TTL cache
pub struct GalleryService {
    provider: Arc<dyn MediaProvider>,
    cache: Arc<GalleryCache>,
    config: GalleryConfig,
}

impl GalleryService {
    #[must_use]
    pub fn new(
        provider: Arc<dyn MediaProvider>,
        cache: Arc<GalleryCache>,
        config: GalleryConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Lists the images of one subfolder of the root folder
    ///
    /// The first page is served from the cache when present. Requests with a
    /// `cursor` go straight to the provider and are not cached.
    ///
    /// # Errors
    ///
    /// - `GalleryError::InvalidArgument` if `folder` is blank or contains `/`
    /// - `GalleryError::UpstreamError` if the provider call fails
    pub async fn folder_images(
        &self,
        folder: &str,
        cursor: Option<&str>,
    ) -> GalleryResult<GalleryResponse> {
        let folder = validate_folder(folder)?;
        let cursor = cursor.filter(|c| !c.is_empty());
        let cache_key = folder_cache_key(folder);

        if cursor.is_none() {
            if let Some(cached) = self.cache.get(&cache_key) {
                tracing::debug!(folder, "Gallery cache hit");
                return Ok(cached);
            }
        }

        let prefix = format!("{}/{folder}/", self.config.root_folder);
        let page = self
            .provider
            .list_resources(&prefix, self.config.folder_max_results, cursor)
            .await?;

        let response = GalleryResponse {
            images: page
                .resources
                .into_iter()
                .map(|raw| to_image_record(raw, None))
                .collect(),
            next_cursor: page.next_cursor,
        };

        if cursor.is_none() {
            self.cache
                .set(cache_key, response.clone(), self.config.cache_ttl);
        }

        Ok(response)
    }

    /// Builds the random travel mix from a bounded sample of every subfolder
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::UpstreamError` if subfolder discovery fails for a
    /// reason other than a missing root, or if the root fallback listing fails.
    /// Failures of individual subfolders are logged and skipped.
    pub async fn random_images(&self) -> GalleryResult<GalleryResponse> {
        if let Some(cached) = self.cache.get(RANDOM_IMAGES_CACHE_KEY) {
            tracing::debug!("Random gallery cache hit");
            return Ok(cached);
        }

        let root = self.config.root_folder.as_str();
        let folders = match self.provider.list_subfolders(root).await? {
            SubfolderListing::Folders(folders) => folders,
            SubfolderListing::RootMissing => return self.root_fallback().await,
        };

        if folders.is_empty() {
            tracing::info!(root, "No gallery subfolders found");
            return Ok(GalleryResponse::default());
        }

        let selected = &folders[..folders.len().min(self.config.folder_fan_out)];
        let sample = self.sample_folders(selected).await;

        for failure in &sample.failures {
            tracing::warn!(
                folder = %failure.folder,
                error = %failure.error,
                "Skipping gallery folder"
            );
        }

        tracing::info!(
            folders = selected.len(),
            failed = sample.failures.len(),
            images = sample.images.len(),
            "Built random gallery mix"
        );

        let response = GalleryResponse {
            images: sample.images,
            next_cursor: None,
        };

        self.cache
            .set(RANDOM_IMAGES_CACHE_KEY, response.clone(), self.config.cache_ttl);

        Ok(response)
    }

    /// Samples `folders` one after another, never stopping on a failure
    async fn sample_folders(&self, folders: &[FolderDescriptor]) -> FolderSample {
        let root = self.config.root_folder.as_str();
        let limit = self.config.random_max_results_per_folder;

        stream::iter(folders)
            .fold(FolderSample::default(), |sample, folder| async move {
                let prefix = format!("{root}/{}/", folder.name);
                let outcome = self.provider.list_resources(&prefix, limit, None).await;
                sample.absorb(&folder.name, outcome)
            })
            .await
    }

    /// Lists images directly under the root, tagged with the root name
    async fn root_fallback(&self) -> GalleryResult<GalleryResponse> {
        let root = self.config.root_folder.as_str();
        tracing::info!(root, "Falling back to root folder listing");

        let page = self
            .provider
            .list_resources(&format!("{root}/"), self.config.fallback_max_results, None)
            .await?;

        Ok(GalleryResponse {
            images: page
                .resources
                .into_iter()
                .map(|raw| to_image_record(raw, Some(root)))
                .collect(),
            next_cursor: None,
        })
    }
}

fn validate_folder(folder: &str) -> GalleryResult<&str> {
    let folder = folder.trim();

    if folder.is_empty() {
        return Err(GalleryError::InvalidArgument(
            "folder must not be empty".to_string(),
        ));
    }

    if folder.contains('/') {
        return Err(GalleryError::InvalidArgument(format!(
            "folder must be a single path segment: {folder}"
        )));
    }

    Ok(folder)
}
