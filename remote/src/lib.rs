//! Read-only client for the hosted blog API
//!
//! - [`BlogSource`]: the three reads the importer needs (posts page, categories, tag)
//! - [`HostedBlogClient`]: the HTTP implementation, authenticated with an API key
//! - [`Client`]: thin reqwest wrapper shared by API calls and media downloads

use async_trait::async_trait;

pub mod api;
mod client;
mod error;
mod hosted;
pub mod traffic_log;

pub use api::*;
pub use client::Client;
pub use error::RemoteError;
pub use hosted::HostedBlogClient;

/// Source of remote blog content.
///
/// Each call issues a single authenticated read. There is no retry and no
/// automatic page traversal; callers loop over pages themselves.
#[async_trait]
pub trait BlogSource: Send + Sync {
    /// Fetch one page of posts
    async fn fetch_posts(&self, query: &PostsQuery) -> Result<PostsPage, RemoteError>;

    /// Fetch every category
    async fn fetch_categories(&self) -> Result<Vec<RemoteCategory>, RemoteError>;

    /// Fetch a single tag by id
    async fn fetch_tag(&self, tag_id: &str) -> Result<RemoteTag, RemoteError>;
}

#[async_trait]
impl<T: BlogSource + ?Sized> BlogSource for std::sync::Arc<T> {
    async fn fetch_posts(&self, query: &PostsQuery) -> Result<PostsPage, RemoteError> {
        (**self).fetch_posts(query).await
    }

    async fn fetch_categories(&self) -> Result<Vec<RemoteCategory>, RemoteError> {
        (**self).fetch_categories().await
    }

    async fn fetch_tag(&self, tag_id: &str) -> Result<RemoteTag, RemoteError> {
        (**self).fetch_tag(tag_id).await
    }
}
