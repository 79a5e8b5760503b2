//! In-memory content store for tests

use std::sync::RwLock;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use common_types::{Post, Project};

use super::{ContentStore, ContentStoreResult, NewPost, PostFilter};

/// Content store holding everything in process memory
///
/// Filtering follows the SQL store: case-insensitive substring search over
/// title and content, exact tag match, newest post first.
#[derive(Default)]
pub struct InMemoryContentStore {
    posts: RwLock<Vec<Post>>,
    projects: Vec<Project>,
}

impl InMemoryContentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds projects, returned in the given order
    #[must_use]
    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = projects;
        self
    }

    /// Seeds a post; later seeds are newer
    ///
    /// # Panics
    ///
    /// Panics if the posts lock is poisoned
    #[must_use]
    pub fn with_post(self, title: &str, content: &str, tags: &[&str]) -> Self {
        {
            let mut posts = self.posts.write().unwrap();
            let id = next_id(&posts);
            posts.push(Post {
                id,
                title: title.to_string(),
                content: content.to_string(),
                created_at: timestamp(id),
                tags: sorted_tags(tags.iter().map(ToString::to_string).collect()),
            });
        }
        self
    }
}

fn next_id(posts: &[Post]) -> i32 {
    posts.iter().map(|p| p.id).max().unwrap_or(0) + 1
}

fn timestamp(id: i32) -> String {
    let base = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default();
    (base + Duration::minutes(i64::from(id))).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn sorted_tags(mut tags: Vec<String>) -> Vec<String> {
    tags.sort();
    tags.dedup();
    tags
}

fn matches(post: &Post, filter: &PostFilter) -> bool {
    let search_ok = filter.search.as_ref().is_none_or(|needle| {
        let needle = needle.to_lowercase();
        post.title.to_lowercase().contains(&needle) || post.content.to_lowercase().contains(&needle)
    });
    let tag_ok = filter
        .tag
        .as_ref()
        .is_none_or(|tag| post.tags.iter().any(|t| t == tag));

    search_ok && tag_ok
}

#[async_trait::async_trait]
impl ContentStore for InMemoryContentStore {
    async fn list_posts(&self, filter: &PostFilter) -> ContentStoreResult<Vec<Post>> {
        let posts = self.posts.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut found: Vec<Post> = posts.iter().filter(|p| matches(p, filter)).cloned().collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn get_post(&self, id: i32) -> ContentStoreResult<Option<Post>> {
        let posts = self.posts.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create_post(&self, post: NewPost) -> ContentStoreResult<i32> {
        let mut posts = self
            .posts
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = next_id(&posts);
        posts.push(Post {
            id,
            title: post.title,
            content: post.content,
            created_at: timestamp(id),
            tags: sorted_tags(post.tags),
        });
        Ok(id)
    }

    async fn list_tags(&self) -> ContentStoreResult<Vec<String>> {
        let posts = self.posts.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(sorted_tags(
            posts.iter().flat_map(|p| p.tags.iter().cloned()).collect(),
        ))
    }

    async fn list_projects(&self) -> ContentStoreResult<Vec<Project>> {
        Ok(self.projects.clone())
    }

    async fn get_project(&self, id: &str) -> ContentStoreResult<Option<Project>> {
        Ok(self.projects.iter().find(|p| p.id == id).cloned())
    }
}
