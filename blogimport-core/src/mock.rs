//! Scripted collaborators for tests and examples

use async_trait::async_trait;
use bytes::Bytes;
use remote::{
    BlogSource, PageMeta, PostsPage, PostsQuery, RemoteCategory, RemoteError, RemotePost,
    RemoteTag,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::assets::Downloader;
use crate::error::DownloadError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn server_error(resource: &str) -> RemoteError {
    RemoteError::Status {
        url: format!("mock://{resource}"),
        status: 500,
        body: "scripted failure".to_string(),
    }
}

#[derive(Debug, Default)]
struct SourceCalls {
    posts: Vec<PostsQuery>,
    categories: usize,
    tags: Vec<String>,
}

/// In-memory [`BlogSource`] serving posts page by page
#[derive(Debug, Default)]
pub struct MockBlogSource {
    posts: Vec<RemotePost>,
    categories: Vec<RemoteCategory>,
    tags: HashMap<String, RemoteTag>,
    fail_categories: bool,
    fail_posts_from: Option<u32>,
    page_meta: bool,
    calls: Mutex<SourceCalls>,
}

impl MockBlogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(mut self, posts: Vec<RemotePost>) -> Self {
        self.posts = posts;
        self
    }

    pub fn with_categories(mut self, categories: Vec<RemoteCategory>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_tag(mut self, id: &str, label: &str) -> Self {
        self.tags.insert(
            id.to_string(),
            RemoteTag {
                id: id.to_string(),
                label: label.to_string(),
                slug: None,
            },
        );
        self
    }

    pub fn failing_categories(mut self) -> Self {
        self.fail_categories = true;
        self
    }

    /// Fail every posts page fetch
    pub fn failing_posts(self) -> Self {
        self.failing_posts_from(0)
    }

    /// Fail posts page fetches whose offset is at least `offset`
    pub fn failing_posts_from(mut self, offset: u32) -> Self {
        self.fail_posts_from = Some(offset);
        self
    }

    /// Attach `metaData` paging info to every page
    pub fn with_page_meta(mut self) -> Self {
        self.page_meta = true;
        self
    }

    pub fn posts_calls(&self) -> Vec<PostsQuery> {
        lock(&self.calls).posts.clone()
    }

    pub fn categories_calls(&self) -> usize {
        lock(&self.calls).categories
    }

    pub fn tag_calls(&self, tag_id: &str) -> usize {
        lock(&self.calls).tags.iter().filter(|t| *t == tag_id).count()
    }
}

#[async_trait]
impl BlogSource for MockBlogSource {
    async fn fetch_posts(&self, query: &PostsQuery) -> Result<PostsPage, RemoteError> {
        lock(&self.calls).posts.push(query.clone());

        let offset = query.paging.offset;
        if self.fail_posts_from.is_some_and(|from| offset >= from) {
            return Err(server_error("posts"));
        }

        let start = (offset as usize).min(self.posts.len());
        let end = start
            .saturating_add(query.paging.limit as usize)
            .min(self.posts.len());
        let posts = self.posts[start..end].to_vec();
        let meta_data = self.page_meta.then(|| PageMeta {
            count: posts.len() as u32,
            offset,
            total: self.posts.len() as u32,
        });

        Ok(PostsPage { posts, meta_data })
    }

    async fn fetch_categories(&self) -> Result<Vec<RemoteCategory>, RemoteError> {
        lock(&self.calls).categories += 1;
        if self.fail_categories {
            return Err(server_error("categories"));
        }
        Ok(self.categories.clone())
    }

    async fn fetch_tag(&self, tag_id: &str) -> Result<RemoteTag, RemoteError> {
        lock(&self.calls).tags.push(tag_id.to_string());
        self.tags
            .get(tag_id)
            .cloned()
            .ok_or_else(|| RemoteError::Status {
                url: format!("mock://tags/{tag_id}"),
                status: 404,
                body: "tag not found".to_string(),
            })
    }
}

/// [`Downloader`] serving fixed bodies; unknown URLs answer 404
#[derive(Debug, Default)]
pub struct MockDownloader {
    files: Mutex<HashMap<String, Bytes>>,
    calls: Mutex<Vec<String>>,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, url: &str, data: Vec<u8>) -> Self {
        self.insert(url, data);
        self
    }

    pub fn insert(&self, url: &str, data: Vec<u8>) {
        lock(&self.files).insert(url.to_string(), Bytes::from(data));
    }

    pub fn download_count(&self, url: &str) -> usize {
        lock(&self.calls).iter().filter(|u| *u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    async fn download(&self, url: &str) -> Result<Bytes, DownloadError> {
        lock(&self.calls).push(url.to_string());
        lock(&self.files)
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
