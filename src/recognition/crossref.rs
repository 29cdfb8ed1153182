//! Cross-reference lookup: resolve the video-platform link for a match.
//!
//! The recognition response only carries a link to an auxiliary endpoint;
//! one more GET turns it into the actual video URL. This dependency is less
//! reliable than recognition itself, so every failure here (bad status,
//! broken body, network error) just means "no video link".

use async_trait::async_trait;

use crate::recognition::domain::CrossReferenceLink;
use crate::recognition::shazam::{dto, to_video_link};
use crate::recognition::traits::CrossReferenceApi;

/// HTTP client for the auxiliary video endpoint
pub struct CrossReferenceClient {
    http_client: reqwest::Client,
}

impl CrossReferenceClient {
    /// Create a new client
    ///
    /// The client is configured to:
    /// - Accept gzip-compressed responses
    /// - Send User-Agent header identifying the application
    pub fn new() -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { http_client })
    }

    /// Resolve the video link behind `hint`
    pub async fn resolve(&self, hint: &str) -> Option<CrossReferenceLink> {
        let response = match self.http_client.get(hint).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Cross-reference request failed: {}", e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(
                "Cross-reference endpoint returned HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            );
            return None;
        }

        match response.json::<dto::VideoResponse>().await {
            Ok(body) => to_video_link(body).map(CrossReferenceLink),
            Err(e) => {
                tracing::debug!("Unreadable cross-reference body: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl CrossReferenceApi for CrossReferenceClient {
    async fn resolve(&self, hint: &str) -> Option<CrossReferenceLink> {
        self.resolve(hint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on a local port
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}/video/v3/-/GB/web/1/youtube/video", addr)
    }

    #[tokio::test]
    async fn test_resolves_first_action_uri() {
        let url = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"caption":"Song A","actions":[{"name":"video:youtube","type":"webview","uri":"https://youtu.be/abc"}]}"#,
        )
        .await;

        let client = CrossReferenceClient::new().unwrap();
        assert_eq!(
            client.resolve(&url).await,
            Some(CrossReferenceLink("https://youtu.be/abc".to_string()))
        );
    }

    #[tokio::test]
    async fn test_error_status_is_none() {
        let url = serve_once("HTTP/1.1 404 Not Found", "{}").await;
        let client = CrossReferenceClient::new().unwrap();
        assert_eq!(client.resolve(&url).await, None);
    }

    #[tokio::test]
    async fn test_malformed_body_is_none() {
        let url = serve_once("HTTP/1.1 200 OK", "<html>oops</html>").await;
        let client = CrossReferenceClient::new().unwrap();
        assert_eq!(client.resolve(&url).await, None);
    }

    #[tokio::test]
    async fn test_no_actions_is_none() {
        let url = serve_once("HTTP/1.1 200 OK", r#"{"caption":"x","actions":[]}"#).await;
        let client = CrossReferenceClient::new().unwrap();
        assert_eq!(client.resolve(&url).await, None);
    }

    #[tokio::test]
    async fn test_unreachable_is_none() {
        let client = CrossReferenceClient::new().unwrap();
        assert_eq!(client.resolve("http://127.0.0.1:1/nothing").await, None);
    }

    #[tokio::test]
    async fn test_invalid_url_is_none() {
        let client = CrossReferenceClient::new().unwrap();
        assert_eq!(client.resolve("not a url").await, None);
    }
}
