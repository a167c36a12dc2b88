mod error;

use std::sync::Arc;

use log::{debug, info, warn};

use crate::cache::{CacheManager, CacheType};
use crate::finders::Finder;
use crate::images;
use crate::options::{DownloadMode, ResolvedOptions};
use crate::utils::{generate_relative_url_from_path, ServerContext};
use crate::web::WebAccess;

pub use error::{ErrorPolicy, ThumbnailError, ThumbnailResult};

/// Retrieves the thumbnail of one URL according to the download mode:
///
/// - `HotlinkStrict`: the finder's URL, or an error when hotlinking isn't allowed.
/// - `Hotlink`: the finder's URL when hotlinking is allowed, download otherwise.
/// - `Download`: download, resize and cache the image, and return its
///   path relative to the serving root.
///
/// Concurrent requests for the same cache entry are not coalesced; each one
/// may fetch and render, and the last complete file wins.
pub struct Thumbnailer<'a> {
    url: String,
    finder: Box<dyn Finder>,
    options: ResolvedOptions,
    server: &'a ServerContext,
    cache: &'a CacheManager,
    web_access: Arc<dyn WebAccess>,
}

impl<'a> Thumbnailer<'a> {
    pub fn new(
        url: &str,
        finder: Box<dyn Finder>,
        options: ResolvedOptions,
        server: &'a ServerContext,
        cache: &'a CacheManager,
        web_access: Arc<dyn WebAccess>,
    ) -> Self {
        Self {
            url: url.to_string(),
            finder,
            options,
            server,
            cache,
            web_access,
        }
    }

    pub async fn get_thumbnail(&self) -> ThumbnailResult<String> {
        let thumb_url = self.finder.find().await?;
        if thumb_url.trim().is_empty() {
            return Err(ThumbnailError::NotFound {
                finder: self.finder.name().to_string(),
            });
        }

        debug!(
            "{} finder found {} for {} ({} mode)",
            self.finder.name(),
            thumb_url,
            self.url,
            self.options.download_mode
        );

        match self.options.download_mode {
            DownloadMode::HotlinkStrict => self.thumbnail_strict_hotlink(thumb_url),
            DownloadMode::Hotlink => self.thumbnail_hotlink(thumb_url).await,
            DownloadMode::Download => self.thumbnail_download(&thumb_url).await,
        }
    }

    fn thumbnail_strict_hotlink(&self, thumb_url: String) -> ThumbnailResult<String> {
        if !self.finder.is_hotlink_allowed() {
            return Err(ThumbnailError::HotlinkNotSupported);
        }
        Ok(thumb_url)
    }

    async fn thumbnail_hotlink(&self, thumb_url: String) -> ThumbnailResult<String> {
        if !self.finder.is_hotlink_allowed() {
            debug!("Hotlink not allowed for {}, downloading", thumb_url);
            return self.thumbnail_download(&thumb_url).await;
        }
        Ok(thumb_url)
    }

    async fn thumbnail_download(&self, thumb_url: &str) -> ThumbnailResult<String> {
        let domains = self.finder.domains();
        let thumb_path = self
            .cache
            .get_cache_file_path(
                thumb_url,
                &domains,
                CacheType::Thumb,
                self.options.max_width,
                self.options.max_height,
            )
            .await?;

        // Serve from the cache when possible
        if !self.options.no_cache && self.cache.is_cache_valid(&thumb_path, CacheType::Thumb).await
        {
            debug!("Thumbnail found in cache: {}", thumb_path.display());
            return Ok(generate_relative_url_from_path(self.server, &thumb_path));
        }

        let timeout = self.options.timeout();
        let redirected = match self
            .web_access
            .get_redirected_headers(thumb_url, timeout)
            .await
        {
            Ok(redirected) => redirected,
            Err(e) => {
                warn!("Couldn't resolve {}: {}", thumb_url, e);
                return Err(ThumbnailError::UnreachableThumbnail {
                    status: 0,
                    original: thumb_url.to_string(),
                    redirected: thumb_url.to_string(),
                });
            }
        };

        if redirected.status != 200 {
            return Err(ThumbnailError::UnreachableThumbnail {
                status: redirected.status,
                original: thumb_url.to_string(),
                redirected: redirected.final_url,
            });
        }

        let content = self
            .web_access
            .get_web_content(
                &redirected.final_url,
                self.options.download_max_size,
                timeout,
            )
            .await
            .map_err(|e| match e {
                ThumbnailError::DownloadFailed { .. } => e,
                other => ThumbnailError::DownloadFailed {
                    url: redirected.final_url.clone(),
                    reason: other.to_string(),
                },
            })?;

        images::render_thumbnail(
            &content.data,
            &thumb_path,
            self.options.max_width,
            self.options.max_height,
            self.options.crop,
        )?;

        if !tokio::fs::try_exists(&thumb_path).await.unwrap_or(false) {
            return Err(ThumbnailError::GenerationFailed(
                thumb_path.display().to_string(),
            ));
        }

        info!(
            "Thumbnail generated for {}: {}",
            redirected.final_url,
            thumb_path.display()
        );
        Ok(generate_relative_url_from_path(self.server, &thumb_path))
    }
}
