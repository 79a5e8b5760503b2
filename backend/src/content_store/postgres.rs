use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use common_types::{Post, Project};
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{ContentStore, ContentStoreResult, NewPost, PostFilter};

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const POST_COLUMNS: &str = r"
    SELECT p.id, p.title, p.content, p.created_at,
           COALESCE(
               array_agg(t.name::text ORDER BY t.name) FILTER (WHERE t.name IS NOT NULL),
               '{}'::text[]
           ) AS tags
    FROM posts p
    LEFT JOIN post_tags pt ON pt.post_id = p.id
    LEFT JOIN tags t ON t.id = pt.tag_id
";

const PROJECT_COLUMNS: &str = r"
    SELECT id::text AS id, gh_link, imgsrc, imgalt, imgstyle, title, type AS kind,
           description, role, tech
    FROM projects
";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i32,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    tags: Vec<String>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            created_at: row.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            tags: row.tags,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: String,
    gh_link: String,
    imgsrc: String,
    imgalt: String,
    imgstyle: Option<serde_json::Value>,
    title: String,
    kind: String,
    description: String,
    role: String,
    tech: serde_json::Value,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            gh_link: row.gh_link,
            imgsrc: row.imgsrc,
            imgalt: row.imgalt,
            imgstyle: row.imgstyle,
            title: row.title,
            kind: row.kind,
            description: row.description,
            role: row.role,
            tech: row.tech,
        }
    }
}

/// Projects in id order; the selected `id` is text, so sort on the column
fn list_projects_query() -> String {
    format!("{PROJECT_COLUMNS} ORDER BY projects.id")
}

/// `ILIKE` pattern matching `term` anywhere, with wildcards in `term` taken literally
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Content store backed by a PostgreSQL connection pool
pub struct PostgresContentStore {
    pool: PgPool,
}

impl PostgresContentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool to `database_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached
    pub async fn connect(database_url: &str) -> ContentStoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }
}

#[async_trait::async_trait]
impl ContentStore for PostgresContentStore {
    async fn list_posts(&self, filter: &PostFilter) -> ContentStoreResult<Vec<Post>> {
        let query = format!(
            "{POST_COLUMNS}
            WHERE ($1::text IS NULL
                   OR p.title ILIKE $1 ESCAPE '\\'
                   OR p.content ILIKE $1 ESCAPE '\\')
              AND ($2::text IS NULL OR EXISTS (
                   SELECT 1 FROM post_tags fpt
                   JOIN tags ft ON ft.id = fpt.tag_id
                   WHERE fpt.post_id = p.id AND ft.name = $2))
            GROUP BY p.id
            ORDER BY p.created_at DESC"
        );

        let rows = sqlx::query_as::<_, PostRow>(&query)
            .bind(filter.search.as_deref().map(contains_pattern))
            .bind(filter.tag.as_deref())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get_post(&self, id: i32) -> ContentStoreResult<Option<Post>> {
        let query = format!("{POST_COLUMNS} WHERE p.id = $1 GROUP BY p.id");

        let row = sqlx::query_as::<_, PostRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Post::from))
    }

    async fn create_post(&self, post: NewPost) -> ContentStoreResult<i32> {
        let mut tx = self.pool.begin().await?;

        let (post_id,): (i32,) =
            sqlx::query_as("INSERT INTO posts (title, content) VALUES ($1, $2) RETURNING id")
                .bind(&post.title)
                .bind(&post.content)
                .fetch_one(&mut *tx)
                .await?;

        for tag in &post.tags {
            let (tag_id,): (i32,) = sqlx::query_as(
                "INSERT INTO tags (name) VALUES ($1)
                 ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                 RETURNING id",
            )
            .bind(tag)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(post_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(post_id, tags = post.tags.len(), "Created post");

        Ok(post_id)
    }

    async fn list_tags(&self) -> ContentStoreResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT name::text FROM tags ORDER BY 1")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn list_projects(&self) -> ContentStoreResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&list_projects_query())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn get_project(&self, id: &str) -> ContentStoreResult<Option<Project>> {
        let query = format!("{PROJECT_COLUMNS} WHERE id::text = $1");

        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Project::from))
    }
}
