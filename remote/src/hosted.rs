use async_trait::async_trait;
use tracing::debug;

use crate::api::{
    CategoriesResponse, PostsPage, PostsQuery, RemoteCategory, RemoteTag, TagResponse,
};
use crate::client::Client;
use crate::error::RemoteError;
use crate::{BlogSource, traffic_log};

/// HTTP implementation of [`BlogSource`]
pub struct HostedBlogClient {
    client: Client,
    base_url: String,
}

impl HostedBlogClient {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, RemoteError> {
        Ok(Self::with_client(Client::with_api_key(api_key)?, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        HostedBlogClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T>(&self, endpoint: &str, path: &str, query: &[(&str, String)]) -> Result<T, RemoteError>
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let url = format!("{}{}", self.base_url, path);
        traffic_log::log_request(endpoint, &url);

        match self.client.get::<T>(&url, query).await {
            Ok(response) => {
                traffic_log::log_response(endpoint, &response);
                Ok(response)
            }
            Err(e) => {
                traffic_log::log_error(endpoint, &e.to_string());
                Err(e)
            }
        }
    }
}

#[async_trait]
impl BlogSource for HostedBlogClient {
    async fn fetch_posts(&self, query: &PostsQuery) -> Result<PostsPage, RemoteError> {
        let page: PostsPage = self.get("posts", "/posts", &query.query_pairs()).await?;
        debug!(
            count = page.posts.len(),
            offset = query.paging.offset,
            "Fetched posts page"
        );
        Ok(page)
    }

    async fn fetch_categories(&self) -> Result<Vec<RemoteCategory>, RemoteError> {
        let response: CategoriesResponse = self.get("categories", "/categories", &[]).await?;
        Ok(response.categories)
    }

    async fn fetch_tag(&self, tag_id: &str) -> Result<RemoteTag, RemoteError> {
        let path = format!("/tags/{}", tag_id);
        let response: TagResponse = self.get("tag", &path, &[]).await?;
        Ok(response.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> HostedBlogClient {
        HostedBlogClient::new("secret-key", &server.url()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_posts_sends_default_query_and_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/posts")
            .match_header("authorization", "secret-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("fieldsToInclude".into(), "CONTENT".into()),
                Matcher::UrlEncoded("paging.limit".into(), "100".into()),
                Matcher::UrlEncoded("paging.offset".into(), "0".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"posts": [{"id": "p1", "title": "First", "categoryIds": ["c1"], "tagIds": []}],
                    "metaData": {"count": 1, "offset": 0, "total": 1}}"#,
            )
            .create_async()
            .await;

        let page = client_for(&server)
            .fetch_posts(&PostsQuery::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].category_ids, vec!["c1".to_string()]);
        assert_eq!(page.meta_data.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_fetch_posts_passes_custom_paging() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/posts")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("paging.limit".into(), "10".into()),
                Matcher::UrlEncoded("paging.offset".into(), "20".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"posts": []}"#)
            .create_async()
            .await;

        let page = client_for(&server)
            .fetch_posts(&PostsQuery::default().with_paging(10, 20))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(page.posts.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_categories() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/categories")
            .with_status(200)
            .with_body(r#"{"categories": [{"id": "c1", "label": "News", "slug": "news", "postCount": 3}]}"#)
            .create_async()
            .await;

        let categories = client_for(&server).fetch_categories().await.unwrap();
        assert_eq!(
            categories,
            vec![RemoteCategory {
                id: "c1".to_string(),
                label: "News".to_string(),
                slug: "news".to_string(),
                description: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_fetch_tag() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tags/t1")
            .with_status(200)
            .with_body(r#"{"tag": {"id": "t1", "label": "rust"}}"#)
            .create_async()
            .await;

        let tag = client_for(&server).fetch_tag("t1").await.unwrap();
        assert_eq!(tag.label, "rust");
    }

    #[tokio::test]
    async fn test_fetch_tag_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tags/missing")
            .with_status(404)
            .with_body(r#"{"message": "not found"}"#)
            .create_async()
            .await;

        let err = client_for(&server).fetch_tag("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_server_error_on_posts() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/posts")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_posts(&PostsQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HostedBlogClient::with_client(Client::new(), "https://api.example.com/blog/v3/");
        assert_eq!(client.base_url(), "https://api.example.com/blog/v3");
    }
}
