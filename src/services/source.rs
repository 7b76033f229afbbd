// src/services/source.rs

//! Remote item source.
//!
//! Thin boundary over the remote API. No retries happen here; callers decide
//! how to react to failures.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Item, SourceConfig, parse_index};
use crate::utils::http::fetch_text;

/// Source of the ranked id list and per-item details.
#[async_trait]
pub trait RemoteItemSource: Send + Sync {
    /// Fetch the current ranked id list.
    async fn fetch_index(&self) -> Result<Vec<String>>;

    /// Fetch a single item. Fails with [`AppError::NotFound`] when the remote
    /// reports the id as absent.
    async fn fetch_details(&self, id: &str) -> Result<Item>;
}

/// Hacker News Firebase API.
pub struct HackerNewsSource {
    client: Client,
    index_url: Url,
    item_base_url: Url,
}

impl HackerNewsSource {
    /// Create a source sharing the given client.
    pub fn new(client: Client, config: &SourceConfig) -> Result<Self> {
        let index_url = Url::parse(&config.index_url)?;
        let mut item_base_url = Url::parse(&config.item_base_url)?;
        if !item_base_url.path().ends_with('/') {
            let path = format!("{}/", item_base_url.path());
            item_base_url.set_path(&path);
        }

        Ok(Self {
            client,
            index_url,
            item_base_url,
        })
    }

    /// URL of a single item.
    pub fn item_url(&self, id: &str) -> Result<Url> {
        Ok(self.item_base_url.join(&format!("{id}.json"))?)
    }
}

#[async_trait]
impl RemoteItemSource for HackerNewsSource {
    async fn fetch_index(&self) -> Result<Vec<String>> {
        log::debug!("Requesting index from {}", self.index_url);
        let body = fetch_text(&self.client, self.index_url.clone())
            .await?
            .ok_or_else(|| AppError::fetch(self.index_url.as_str(), "index not found"))?;
        parse_index(&body)
    }

    async fn fetch_details(&self, id: &str) -> Result<Item> {
        let body = fetch_text(&self.client, self.item_url(id)?)
            .await?
            .ok_or_else(|| AppError::not_found(id))?;
        Item::parse(&body)?.ok_or_else(|| AppError::not_found(id))
    }
}


#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::models::ClientConfig;
    use crate::utils::http::create_async_client;

    fn source(item_base_url: &str) -> HackerNewsSource {
        let client = create_async_client(&ClientConfig::default()).unwrap();
        let config = SourceConfig {
            item_base_url: item_base_url.to_string(),
            ..SourceConfig::default()
        };
        HackerNewsSource::new(client, &config).unwrap()
    }

    #[test]
    fn test_item_url() {
        let source = source("https://hacker-news.firebaseio.com/v0/item/");
        assert_eq!(
            source.item_url("8863").unwrap().as_str(),
            "https://hacker-news.firebaseio.com/v0/item/8863.json"
        );
    }

    #[test]
    fn test_item_url_without_trailing_slash() {
        let source = source("http://localhost:8080/v0/item");
        assert_eq!(
            source.item_url("1").unwrap().as_str(),
            "http://localhost:8080/v0/item/1.json"
        );
    }

    #[test]
    fn test_rejects_invalid_url() {
        let client = create_async_client(&ClientConfig::default()).unwrap();
        let config = SourceConfig {
            index_url: "::".to_string(),
            ..SourceConfig::default()
        };
        assert!(HackerNewsSource::new(client, &config).is_err());
    }

    /// Serves canned `(path, status, body)` answers; unknown paths get a 404.
    async fn stub_server(routes: Vec<(&'static str, u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let request = String::from_utf8_lossy(&request);
                    let path = request.split_whitespace().nth(1).unwrap_or("/");
                    let (status, body) = routes
                        .iter()
                        .find(|(route, _, _)| *route == path)
                        .map(|(_, status, body)| (*status, *body))
                        .unwrap_or((404, ""));
                    let response = format!(
                        "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\n\
                         content-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    fn stub_source(base: &str) -> HackerNewsSource {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let config = SourceConfig {
            index_url: format!("{base}/v0/beststories.json"),
            item_base_url: format!("{base}/v0/item/"),
        };
        HackerNewsSource::new(client, &config).unwrap()
    }

    #[tokio::test]
    async fn test_fetches_index_and_item() {
        let base = stub_server(vec![
            ("/v0/beststories.json", 200, r#"[8863, "42"]"#),
            (
                "/v0/item/8863.json",
                200,
                r#"{"id": 8863, "title": "My YC app", "score": 104, "by": "dhouston"}"#,
            ),
        ])
        .await;
        let source = stub_source(&base);

        assert_eq!(source.fetch_index().await.unwrap(), vec!["8863", "42"]);

        let item = source.fetch_details("8863").await.unwrap();
        assert_eq!(item.title, "My YC app");
        assert_eq!(item.score, 104);
        assert_eq!(item.author.as_deref(), Some("dhouston"));
    }

    #[tokio::test]
    async fn test_missing_index_is_fetch_error() {
        let base = stub_server(Vec::new()).await;

        let err = stub_source(&base).fetch_index().await.unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
        assert!(err.is_fetch_error());
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_index_server_error_is_fetch_error() {
        let base = stub_server(vec![("/v0/beststories.json", 500, "oops")]).await;

        let err = stub_source(&base).fetch_index().await.unwrap_err();
        assert!(err.is_fetch_error());
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_unknown_item_is_not_found() {
        let base = stub_server(Vec::new()).await;

        let err = stub_source(&base).fetch_details("1").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!err.is_fetch_error());
    }

    #[tokio::test]
    async fn test_null_item_is_not_found() {
        let base = stub_server(vec![("/v0/item/7.json", 200, "null")]).await;

        let err = stub_source(&base).fetch_details("7").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_item_server_error_is_fetch_error() {
        let base = stub_server(vec![("/v0/item/7.json", 503, "")]).await;

        let err = stub_source(&base).fetch_details("7").await.unwrap_err();
        assert!(err.is_fetch_error());
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_item_is_fetch_error() {
        let base = stub_server(vec![("/v0/item/7.json", 200, "{\"id\": ")]).await;

        let err = stub_source(&base).fetch_details("7").await.unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
        assert!(err.is_fetch_error());
    }
}
