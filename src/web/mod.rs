use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::images::looks_like_image;
use crate::thumbnailer::{ThumbnailError, ThumbnailResult};

/// Outcome of following redirects for a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectedHeaders {
    pub status: u16,
    // Status line first, then "Name: value" lines of the final response
    pub headers: Vec<String>,
    pub final_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebContent {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl WebContent {
    pub fn new(data: Vec<u8>, content_type: Option<String>) -> Self {
        Self { data, content_type }
    }

    pub fn is_image(&self) -> bool {
        let declared = self
            .content_type
            .as_deref()
            .map(|ct| ct.trim().to_lowercase().starts_with("image/"))
            .unwrap_or(false);

        declared || looks_like_image(&self.data)
    }
}

#[async_trait]
pub trait WebAccess: Send + Sync {
    /// Follow redirects for `url` and report the final status and URL.
    async fn get_redirected_headers(
        &self,
        url: &str,
        timeout: Duration,
    ) -> ThumbnailResult<RedirectedHeaders>;

    /// Download `url`, failing when the body is larger than `max_size` bytes.
    async fn get_web_content(
        &self,
        url: &str,
        max_size: u64,
        timeout: Duration,
    ) -> ThumbnailResult<WebContent>;
}

pub struct HttpWebAccess {
    client: Client,
}

impl HttpWebAccess {
    pub fn new(user_agent: &str) -> ThumbnailResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }

    fn request(&self, url: &str, timeout: Duration) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .timeout(timeout)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
    }
}

#[async_trait]
impl WebAccess for HttpWebAccess {
    async fn get_redirected_headers(
        &self,
        url: &str,
        timeout: Duration,
    ) -> ThumbnailResult<RedirectedHeaders> {
        let response = self.request(url, timeout).send().await?;

        let status = response.status();
        let final_url = response.url().to_string();

        let mut headers = vec![format!("{:?} {}", response.version(), status)];
        for (name, value) in response.headers() {
            headers.push(format!(
                "{}: {}",
                name,
                value.to_str().unwrap_or("<binary>")
            ));
        }

        log::debug!("Resolved {} to {} (HTTP {})", url, final_url, status);

        // The body is not needed here
        Ok(RedirectedHeaders {
            status: status.as_u16(),
            headers,
            final_url,
        })
    }

    async fn get_web_content(
        &self,
        url: &str,
        max_size: u64,
        timeout: Duration,
    ) -> ThumbnailResult<WebContent> {
        let mut response = self.request(url, timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            log::error!("Request to {} failed with status: {}", url, status);
            return Err(ThumbnailError::DownloadFailed {
                url: url.to_string(),
                reason: format!("HTTP status {}", status),
            });
        }

        if let Some(length) = response.content_length() {
            if length > max_size {
                return Err(ThumbnailError::DownloadFailed {
                    url: url.to_string(),
                    reason: format!("Content length {} exceeds {} bytes", length, max_size),
                });
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        // The cap applies to received bytes, not only the declared length
        let mut data = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if data.len() as u64 + chunk.len() as u64 > max_size {
                return Err(ThumbnailError::DownloadFailed {
                    url: url.to_string(),
                    reason: format!("Download exceeds {} bytes", max_size),
                });
            }
            data.extend_from_slice(&chunk);
        }

        log::debug!("Downloaded {} bytes from {}", data.len(), url);
        Ok(WebContent::new(data, content_type))
    }
}
