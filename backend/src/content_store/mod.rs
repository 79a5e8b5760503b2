//! Posts, tags and projects
//!
//! Content lives in PostgreSQL. Handlers only see the [`ContentStore`] trait so
//! the router can be exercised against the in-memory store in tests.

mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
mod postgres;

use common_types::{Post, Project};

pub use error::{ContentStoreError, ContentStoreResult};
pub use postgres::PostgresContentStore;

/// Optional filters of a post listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Case-insensitive substring of the title or content
    pub search: Option<String>,
    /// Exact tag name
    pub tag: Option<String>,
}

impl PostFilter {
    /// Drops blank filter values
    #[must_use]
    pub fn normalized(self) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            search: clean(self.search),
            tag: clean(self.tag),
        }
    }
}

/// A post to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Read and write access to portfolio content
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Posts matching `filter`, newest first
    async fn list_posts(&self, filter: &PostFilter) -> ContentStoreResult<Vec<Post>>;

    async fn get_post(&self, id: i32) -> ContentStoreResult<Option<Post>>;

    /// Inserts a post, creating unknown tags, and returns its id
    async fn create_post(&self, post: NewPost) -> ContentStoreResult<i32>;

    /// Distinct tag names in alphabetical order
    async fn list_tags(&self) -> ContentStoreResult<Vec<String>>;

    async fn list_projects(&self) -> ContentStoreResult<Vec<Project>>;

    async fn get_project(&self, id: &str) -> ContentStoreResult<Option<Project>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_normalization_drops_blanks() {
        let filter = PostFilter {
            search: Some("  rust ".to_string()),
            tag: Some("   ".to_string()),
        }
        .normalized();

        assert_eq!(filter.search.as_deref(), Some("rust"));
        assert_eq!(filter.tag, None);
    }
}
