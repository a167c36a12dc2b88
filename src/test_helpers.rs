//! Fakes shared by the unit tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};

use crate::finders::Finder;
use crate::thumbnailer::{ThumbnailError, ThumbnailResult};
use crate::web::{RedirectedHeaders, WebAccess, WebContent};

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    bytes
}

/// In-memory web: pages and redirects keyed by URL, with call counters.
#[derive(Default)]
pub struct FakeWebAccess {
    pages: HashMap<String, WebContent>,
    redirects: HashMap<String, (u16, String)>,
    header_calls: AtomicUsize,
    content_calls: AtomicUsize,
}

impl FakeWebAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, content_type: &str, data: impl Into<Vec<u8>>) -> Self {
        self.pages.insert(
            url.to_string(),
            WebContent::new(data.into(), Some(content_type.to_string())),
        );
        self
    }

    pub fn with_redirect(mut self, url: &str, status: u16, final_url: &str) -> Self {
        self.redirects
            .insert(url.to_string(), (status, final_url.to_string()));
        self
    }

    pub fn header_calls(&self) -> usize {
        self.header_calls.load(Ordering::SeqCst)
    }

    pub fn content_calls(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.header_calls() + self.content_calls()
    }
}

#[async_trait]
impl WebAccess for FakeWebAccess {
    async fn get_redirected_headers(
        &self,
        url: &str,
        _timeout: Duration,
    ) -> ThumbnailResult<RedirectedHeaders> {
        self.header_calls.fetch_add(1, Ordering::SeqCst);

        let (status, final_url) = match self.redirects.get(url) {
            Some((status, final_url)) => (*status, final_url.clone()),
            None if self.pages.contains_key(url) => (200, url.to_string()),
            None => (404, url.to_string()),
        };

        Ok(RedirectedHeaders {
            status,
            headers: vec![format!("HTTP/1.1 {}", status)],
            final_url,
        })
    }

    async fn get_web_content(
        &self,
        url: &str,
        max_size: u64,
        _timeout: Duration,
    ) -> ThumbnailResult<WebContent> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);

        let content = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| ThumbnailError::DownloadFailed {
                url: url.to_string(),
                reason: "HTTP status 404 Not Found".to_string(),
            })?;

        if content.data.len() as u64 > max_size {
            return Err(ThumbnailError::DownloadFailed {
                url: url.to_string(),
                reason: format!("Download exceeds {} bytes", max_size),
            });
        }

        Ok(content)
    }
}

/// Finder returning a fixed URL with a fixed hotlink policy.
pub struct StaticFinder {
    pub url: String,
    pub hotlink: bool,
    pub domain: String,
}

impl StaticFinder {
    pub fn new(url: &str, hotlink: bool) -> Self {
        Self {
            url: url.to_string(),
            hotlink,
            domain: crate::utils::get_domain(url),
        }
    }
}

#[async_trait]
impl Finder for StaticFinder {
    async fn find(&self) -> ThumbnailResult<String> {
        Ok(self.url.clone())
    }

    fn is_hotlink_allowed(&self) -> bool {
        self.hotlink
    }

    fn domains(&self) -> Vec<String> {
        vec![self.domain.clone()]
    }

    fn name(&self) -> &str {
        "static"
    }
}
