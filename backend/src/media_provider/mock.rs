//! Scriptable in-memory media provider for tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::json;

use super::{
    FolderDescriptor, MediaProvider, MediaProviderError, MediaProviderResult, RawResource,
    ResourcePage, SubfolderListing,
};

/// A recorded `list_resources` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCall {
    pub prefix: String,
    pub max_results: u32,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone)]
enum SubfolderScript {
    Folders(Vec<String>),
    RootMissing,
    Fail,
}

/// Builds a provider record carrying extra fields the gallery must drop
#[must_use]
pub fn raw_resource(public_id: &str) -> RawResource {
    let extra = json!({
        "format": "jpg",
        "bytes": 204_800,
        "created_at": "2024-05-01T10:00:00Z",
        "url": format!("http://res.example.com/{public_id}.jpg"),
    });

    RawResource {
        public_id: public_id.to_string(),
        secure_url: format!("https://res.example.com/{public_id}.jpg"),
        width: 1600,
        height: 1067,
        extra: extra.as_object().cloned().unwrap_or_default(),
    }
}

/// Media provider whose answers are set up front and whose calls are recorded
pub struct MockMediaProvider {
    subfolders: SubfolderScript,
    pages: HashMap<String, ResourcePage>,
    failing_prefixes: HashSet<String>,
    latency: Duration,
    resource_calls: Mutex<Vec<ResourceCall>>,
    subfolder_calls: AtomicUsize,
}

impl Default for MockMediaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaProvider {
    /// Provider with no subfolders and no resources
    #[must_use]
    pub fn new() -> Self {
        Self {
            subfolders: SubfolderScript::Folders(Vec::new()),
            pages: HashMap::new(),
            failing_prefixes: HashSet::new(),
            latency: Duration::ZERO,
            resource_calls: Mutex::new(Vec::new()),
            subfolder_calls: AtomicUsize::new(0),
        }
    }

    /// Subfolders reported for any root, in this order
    #[must_use]
    pub fn with_subfolders<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subfolders = SubfolderScript::Folders(names.into_iter().map(Into::into).collect());
        self
    }

    /// Subfolder listing reports the root as missing
    #[must_use]
    pub fn with_missing_root(mut self) -> Self {
        self.subfolders = SubfolderScript::RootMissing;
        self
    }

    /// Subfolder listing fails with a provider error
    #[must_use]
    pub fn with_failing_subfolders(mut self) -> Self {
        self.subfolders = SubfolderScript::Fail;
        self
    }

    /// `count` images under `prefix`, named `{prefix}img{n}`
    #[must_use]
    pub fn with_images(self, prefix: &str, count: usize) -> Self {
        let resources = (1..=count)
            .map(|n| raw_resource(&format!("{prefix}img{n}")))
            .collect();
        self.with_page(prefix, resources, None)
    }

    /// Exact page returned for `prefix`
    #[must_use]
    pub fn with_page(
        mut self,
        prefix: &str,
        resources: Vec<RawResource>,
        next_cursor: Option<&str>,
    ) -> Self {
        self.pages.insert(
            prefix.to_string(),
            ResourcePage {
                resources,
                next_cursor: next_cursor.map(ToString::to_string),
            },
        );
        self
    }

    /// `list_resources` fails for `prefix`
    #[must_use]
    pub fn failing_prefix(mut self, prefix: &str) -> Self {
        self.failing_prefixes.insert(prefix.to_string());
        self
    }

    /// Every `list_resources` call takes `latency` before answering
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Every `list_resources` call so far, in order
    ///
    /// # Panics
    ///
    /// Panics if the call log lock is poisoned
    #[must_use]
    pub fn resource_calls(&self) -> Vec<ResourceCall> {
        self.resource_calls.lock().unwrap().clone()
    }

    /// Number of `list_subfolders` calls so far
    #[must_use]
    pub fn subfolder_calls(&self) -> usize {
        self.subfolder_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MediaProvider for MockMediaProvider {
    async fn list_resources(
        &self,
        prefix: &str,
        max_results: u32,
        cursor: Option<&str>,
    ) -> MediaProviderResult<ResourcePage> {
        self.resource_calls
            .lock()
            .map_err(|e| MediaProviderError::Transport(e.to_string()))?
            .push(ResourceCall {
                prefix: prefix.to_string(),
                max_results,
                cursor: cursor.map(ToString::to_string),
            });

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.failing_prefixes.contains(prefix) {
            return Err(MediaProviderError::UnexpectedStatus {
                status: 500,
                body: format!("scripted failure for {prefix}"),
            });
        }

        let mut page = self.pages.get(prefix).cloned().unwrap_or_default();
        page.resources
            .truncate(usize::try_from(max_results).unwrap_or(usize::MAX));
        Ok(page)
    }

    async fn list_subfolders(&self, root: &str) -> MediaProviderResult<SubfolderListing> {
        self.subfolder_calls.fetch_add(1, Ordering::SeqCst);

        match &self.subfolders {
            SubfolderScript::Folders(names) => Ok(SubfolderListing::Folders(
                names
                    .iter()
                    .map(|name| FolderDescriptor {
                        name: name.clone(),
                        path: format!("{root}/{name}"),
                    })
                    .collect(),
            )),
            SubfolderScript::RootMissing => Ok(SubfolderListing::RootMissing),
            SubfolderScript::Fail => Err(MediaProviderError::RateLimited),
        }
    }
}
