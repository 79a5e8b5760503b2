//! Boundary adapter for the cloud media host
//!
//! The gallery only needs two calls from the provider: a paginated listing of
//! the image resources under a prefix, and the list of subfolders of a folder.
//! Neither call is retried here.

mod cloudinary;
mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use serde::Deserialize;

pub use cloudinary::{CloudinaryClient, CloudinaryCredentials};
pub use error::{MediaProviderError, MediaProviderResult};

/// Resource record as returned by the provider
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawResource {
    pub public_id: String,
    pub secure_url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Everything else the provider sends (format, bytes, tags, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One page of a resource listing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResourcePage {
    #[serde(default)]
    pub resources: Vec<RawResource>,
    pub next_cursor: Option<String>,
}

/// A folder nested under the root
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FolderDescriptor {
    pub name: String,
    #[serde(default)]
    pub path: String,
}

/// Outcome of a subfolder listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubfolderListing {
    /// The root exists; its direct subfolders in provider order
    Folders(Vec<FolderDescriptor>),
    /// The provider does not know the root as a folder entity. Images may
    /// still live directly under its prefix.
    RootMissing,
}

/// Operations the gallery needs from the media host
#[async_trait::async_trait]
pub trait MediaProvider: Send + Sync {
    /// Lists image resources whose public id starts with `prefix`
    async fn list_resources(
        &self,
        prefix: &str,
        max_results: u32,
        cursor: Option<&str>,
    ) -> MediaProviderResult<ResourcePage>;

    /// Lists the direct subfolders of `root`
    async fn list_subfolders(&self, root: &str) -> MediaProviderResult<SubfolderListing>;
}
