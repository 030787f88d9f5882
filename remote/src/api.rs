//! Wire types for the hosted blog API (v3)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Post fieldsets the API can be asked to include
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldsToInclude {
    /// Serialized rich-text body
    #[default]
    Content,
    /// Plain-text body
    ContentText,
    Url,
    Seo,
}

impl FieldsToInclude {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldsToInclude::Content => "CONTENT",
            FieldsToInclude::ContentText => "CONTENT_TEXT",
            FieldsToInclude::Url => "URL",
            FieldsToInclude::Seo => "SEO",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub limit: u32,
    pub offset: u32,
}

impl Paging {
    pub const DEFAULT_LIMIT: u32 = 100;

    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// The page that follows this one
    pub fn next(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, 0)
    }
}

/// Filter and paging parameters for `GET /posts`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostsQuery {
    pub fields_to_include: FieldsToInclude,
    pub paging: Paging,
}

impl PostsQuery {
    pub fn with_paging(mut self, limit: u32, offset: u32) -> Self {
        self.paging = Paging::new(limit, offset);
        self
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("fieldsToInclude", self.fields_to_include.as_str().to_string()),
            ("paging.limit", self.paging.limit.to_string()),
            ("paging.offset", self.paging.offset.to_string()),
        ]
    }
}

/// Cover image of a post
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverMedia {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub image: Option<CoverImage>,
}

/// A blog post as returned by `GET /posts`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// RFC 3339 timestamp
    #[serde(default)]
    pub first_published_date: Option<String>,
    /// Rich-text document, either serialized as a JSON string or inline
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub category_ids: Vec<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    #[serde(default)]
    pub cover_media: Option<CoverMedia>,
    /// Fields not modelled above, kept for hooks
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemotePost {
    /// Cover image URL, if the post has a non-empty one
    pub fn cover_image_url(&self) -> Option<&str> {
        self.cover_media
            .as_ref()
            .and_then(|media| media.image.as_ref())
            .and_then(|image| image.url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }
}

/// Paging metadata attached to a posts page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsPage {
    #[serde(default)]
    pub posts: Vec<RemotePost>,
    #[serde(default)]
    pub meta_data: Option<PageMeta>,
}

impl PostsPage {
    /// Whether a page after this one may exist
    pub fn has_more(&self, paging: &Paging) -> bool {
        match self.meta_data {
            Some(meta) if meta.total > 0 => {
                !self.posts.is_empty()
                    && (paging.offset as u64 + self.posts.len() as u64) < meta.total as u64
            }
            _ => !self.posts.is_empty() && self.posts.len() as u32 >= paging.limit,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCategory {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Vec<RemoteCategory>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTag {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagResponse {
    pub tag: RemoteTag,
}
