use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{Level, event, instrument};

use crate::error::RemoteError;

/// Maximum characters of an error body kept in `RemoteError::Status`
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Clone, Debug)]
pub struct Client {
    client: reqwest::Client,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Client {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_headers(headers: HeaderMap) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(RemoteError::Build)?;
        Ok(Client { client })
    }

    /// Client sending the API key verbatim in the `Authorization` header
    pub fn with_api_key(api_key: &str) -> Result<Self, RemoteError> {
        let mut value = HeaderValue::from_str(api_key)
            .map_err(|_| RemoteError::InvalidHeader("Authorization".to_string()))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Self::with_headers(headers)
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn get<T>(&self, url: &str, query: &[(&str, String)]) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(url, query).await?;
        let text = response.text().await.map_err(|source| RemoteError::Transport {
            url: url.to_string(),
            source,
        })?;
        event!(Level::TRACE, response = text);

        serde_json::from_str::<T>(&text).map_err(|source| RemoteError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Fetch a full response body as raw bytes
    #[instrument(level = "trace", skip(self))]
    pub async fn get_bytes(&self, url: &str) -> Result<Bytes, RemoteError> {
        let response = self.send(url, &[]).await?;
        response.bytes().await.map_err(|source| RemoteError::Transport {
            url: url.to_string(),
            source,
        })
    }

    async fn send(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, RemoteError> {
        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|source| RemoteError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(RemoteError::Status {
                url: url.to_string(),
                status,
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: u32,
    }

    #[tokio::test]
    async fn test_get_decodes_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/thing")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 7}"#)
            .create_async()
            .await;

        let client = Client::new();
        let thing: Thing = client
            .get(&format!("{}/thing", server.url()), &[])
            .await
            .unwrap();

        assert_eq!(thing, Thing { id: 7 });
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/thing")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let err = Client::new()
            .get::<Thing>(&format!("{}/thing", server.url()), &[])
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains("forbidden"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/thing")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = Client::new()
            .get::<Thing>(&format!("{}/thing", server.url()), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_get_bytes_returns_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/media/a.png")
            .with_status(200)
            .with_body(vec![1u8, 2, 3])
            .create_async()
            .await;

        let bytes = Client::new()
            .get_bytes(&format!("{}/media/a.png", server.url()))
            .await
            .unwrap();
        assert_eq!(&bytes[..], &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let err = Client::new()
            .get_bytes("http://127.0.0.1:1/nothing")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Transport { .. }));
    }

    #[test]
    fn test_api_key_rejects_invalid_header() {
        let err = Client::with_api_key("bad\nkey").unwrap_err();
        assert!(matches!(err, RemoteError::InvalidHeader(_)));
    }
}
