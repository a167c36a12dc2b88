use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::{Finder, FinderContext};
use crate::images::has_image_extension;
use crate::options::ResolvedOptions;
use crate::thumbnailer::{ThumbnailError, ThumbnailResult};
use crate::utils::get_url_file_extension;
use crate::web::{WebAccess, WebContent};

lazy_static! {
    // <meta property=og:image ... content=URL>
    //
    // The property value may be quoted with ' or " or not at all, and must be
    // followed by a quote or whitespace. Any attributes may sit between it and
    // `content=`, with at least one character after that quote or whitespace.
    // The URL runs until the first quote, whitespace or `>`.
    static ref OG_IMAGE_REGEX: Regex =
        Regex::new(r#"<meta property=["']?og:image["'\s][^>]+content=["']?(.*?)["'\s>]"#).unwrap();
}

/// First OpenGraph image URL declared in `content`, if any.
pub fn extract_og_image(content: &str) -> Option<&str> {
    OG_IMAGE_REGEX
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|url| !url.is_empty())
}

/// Finder used when no domain specific finder is registered.
///
/// Returns the URL itself when it points to an image (by extension, then by
/// content), otherwise the page's OpenGraph image.
pub struct DefaultFinder {
    domain: String,
    url: String,
    options: ResolvedOptions,
    web_access: Arc<dyn WebAccess>,
}

impl DefaultFinder {
    pub fn new(context: FinderContext) -> Self {
        Self {
            domain: context.domain,
            url: context.url,
            options: context.options,
            web_access: context.web_access,
        }
    }

    async fn fetch_content(&self) -> WebContent {
        match self
            .web_access
            .get_web_content(
                &self.url,
                self.options.download_max_size,
                self.options.timeout(),
            )
            .await
        {
            Ok(content) => content,
            Err(e) => {
                log::debug!("Couldn't fetch {}: {}", self.url, e);
                WebContent::default()
            }
        }
    }
}

#[async_trait]
impl Finder for DefaultFinder {
    async fn find(&self) -> ThumbnailResult<String> {
        if has_image_extension(&get_url_file_extension(&self.url)) {
            return Ok(self.url.clone());
        }

        let content = self.fetch_content().await;
        if content.is_image() {
            return Ok(self.url.clone());
        }

        let text = String::from_utf8_lossy(&content.data);
        if let Some(og_image) = extract_og_image(&text) {
            if has_image_extension(&get_url_file_extension(og_image)) {
                return Ok(og_image.to_string());
            }
            log::debug!("Rejected OpenGraph image {} for {}", og_image, self.url);
        }

        Err(ThumbnailError::NotFound {
            finder: self.name().to_string(),
        })
    }

    fn is_hotlink_allowed(&self) -> bool {
        true
    }

    fn domains(&self) -> Vec<String> {
        vec![self.domain.clone()]
    }

    fn name(&self) -> &str {
        "default"
    }
}
