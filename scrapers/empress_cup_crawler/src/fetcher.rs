use std::time::Duration;
use tracing::{debug, info};

use crate::{
    config::ScrapingConfig,
    error::{CrawlError, Result},
};

pub struct ScheduleFetcher {
    client: reqwest::Client,
}

impl ScheduleFetcher {
    pub fn new(config: &ScrapingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|source| CrawlError::Transport {
                url: config.schedule_url.clone(),
                source,
            })?;

        Ok(Self { client })
    }

    /// Fetches a page once. No retries: any failure ends the crawl.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        info!("Fetching schedule page {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| CrawlError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        // Decode as UTF-8 regardless of the declared charset.
        let bytes = response
            .bytes()
            .await
            .map_err(|source| CrawlError::ResponseBody {
                url: url.to_string(),
                source,
            })?;
        debug!("Received {} bytes from {}", bytes.len(), url);

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> ScheduleFetcher {
        let config = ScrapingConfig {
            request_timeout_secs: 5,
            ..ScrapingConfig::default()
        };
        ScheduleFetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent_and_decodes_utf8() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/schedule_result/")
            .match_header("user-agent", mockito::Matcher::Regex("Mozilla/5.0".to_string()))
            .with_status(200)
            .with_header("content-type", "text/html; charset=Shift_JIS")
            .with_body("<p>決勝</p>")
            .create_async()
            .await;

        let body = fetcher()
            .fetch(&format!("{}/schedule_result/", server.url()))
            .await
            .unwrap();

        assert_eq!(body, "<p>決勝</p>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(503)
            .create_async()
            .await;

        let err = fetcher().fetch(&format!("{}/", server.url())).await.unwrap_err();
        match err {
            CrawlError::HttpStatus { status, .. } => assert_eq!(status.as_u16(), 503),
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Port 1 is reserved and nothing listens there.
        let err = fetcher().fetch("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, CrawlError::Transport { .. }));
    }
}
