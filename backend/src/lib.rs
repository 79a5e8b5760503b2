//! Portfolio website backend
//!
//! Serves posts and projects from PostgreSQL and a travel gallery from
//! Cloudinary, with an in-process TTL cache in front of the media provider.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

/// In-process TTL cache for gallery responses
pub mod cache;

/// Posts, tags and projects
pub mod content_store;

/// Gallery listings and the random travel mix
pub mod gallery;

/// Cloud media host adapter
pub mod media_provider;

/// HTTP routes
pub mod routes;

/// HTTP server setup
pub mod server;

/// Configuration and error types
pub mod types;
