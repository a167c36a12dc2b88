//! Thumbnails for arbitrary web pages.
//!
//! A [`WebThumbnailer`] finds a representative image for a URL, then either
//! hotlinks it or downloads, resizes and caches a local copy.

pub mod cache;
pub mod config;
pub mod finders;
pub mod images;
pub mod options;
pub mod thumbnailer;
pub mod utils;
pub mod web;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use log::debug;

pub use cache::CacheManager;
pub use config::AppConfig;
pub use finders::{Finder, FinderContext, FinderRegistry};
pub use options::{DownloadMode, ResolvedOptions, SizeOption, UserOptions};
pub use thumbnailer::{ErrorPolicy, ThumbnailError, ThumbnailResult, Thumbnailer};
pub use utils::ServerContext;
pub use web::{HttpWebAccess, WebAccess};

/// Thumbnail service. Immutable once built, safe to share between requests.
pub struct WebThumbnailer {
    config: AppConfig,
    defaults: UserOptions,
    server: ServerContext,
    cache: CacheManager,
    registry: Arc<FinderRegistry>,
    web_access: Arc<dyn WebAccess>,
}

impl WebThumbnailer {
    pub fn new(config: AppConfig) -> ThumbnailResult<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: AppConfig) -> WebThumbnailerBuilder {
        WebThumbnailerBuilder::new(config)
    }

    pub fn defaults(&self) -> &UserOptions {
        &self.defaults
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn server_context(&self) -> &ServerContext {
        &self.server
    }

    /// Thumbnail URL for `url`: the origin image URL when hotlinking, or a
    /// path relative to the serving root when downloaded.
    ///
    /// `Ok(None)` means no thumbnail. Failures are only returned as errors
    /// in debug mode, except for missing requirements which always are.
    pub async fn thumbnail(
        &self,
        url: &str,
        options: &UserOptions,
    ) -> ThumbnailResult<Option<String>> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(None);
        }

        let resolved = match ResolvedOptions::resolve(&self.defaults, options, &self.config) {
            Ok(resolved) => resolved,
            Err(e) => {
                let merged = options.merged_over(&self.defaults);
                let policy = ErrorPolicy::new(
                    merged.debug.unwrap_or(false),
                    merged.verbose.unwrap_or(false),
                );
                return policy.apply(Err(e));
            }
        };

        let policy = ErrorPolicy::new(resolved.debug, resolved.verbose);
        policy.apply(self.get_thumbnail(url, resolved).await)
    }

    async fn get_thumbnail(&self, url: &str, resolved: ResolvedOptions) -> ThumbnailResult<String> {
        debug!("Thumbnail request for {} with {:?}", url, resolved);

        let finder = self
            .registry
            .get_finder(url, &resolved, self.web_access.clone());

        Thumbnailer::new(
            url,
            finder,
            resolved,
            &self.server,
            &self.cache,
            self.web_access.clone(),
        )
        .get_thumbnail()
        .await
    }
}

/// Collects instance defaults and collaborators for a [`WebThumbnailer`].
pub struct WebThumbnailerBuilder {
    config: AppConfig,
    defaults: UserOptions,
    server: Option<ServerContext>,
    registry: FinderRegistry,
    web_access: Option<Arc<dyn WebAccess>>,
}

impl WebThumbnailerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            defaults: UserOptions::new(),
            server: None,
            registry: FinderRegistry::new(),
            web_access: None,
        }
    }

    pub fn max_width(mut self, width: impl Into<SizeOption>) -> Self {
        self.defaults.max_width = Some(width.into());
        self
    }

    pub fn max_height(mut self, height: impl Into<SizeOption>) -> Self {
        self.defaults.max_height = Some(height.into());
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.defaults.debug = Some(debug);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.defaults.verbose = Some(verbose);
        self
    }

    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.defaults.no_cache = Some(no_cache);
        self
    }

    pub fn crop(mut self, crop: bool) -> Self {
        self.defaults.crop = Some(crop);
        self
    }

    pub fn download_timeout(mut self, seconds: u64) -> Self {
        self.defaults.download_timeout = Some(seconds);
        self
    }

    pub fn download_max_size(mut self, bytes: u64) -> Self {
        self.defaults.download_max_size = Some(bytes);
        self
    }

    pub fn mode_download(self) -> Self {
        self.mode(DownloadMode::Download)
    }

    pub fn mode_hotlink(self) -> Self {
        self.mode(DownloadMode::Hotlink)
    }

    pub fn mode_hotlink_strict(self) -> Self {
        self.mode(DownloadMode::HotlinkStrict)
    }

    fn mode(mut self, mode: DownloadMode) -> Self {
        self.defaults.modes.push(mode);
        self
    }

    pub fn server_context(mut self, server: ServerContext) -> Self {
        self.server = Some(server);
        self
    }

    pub fn registry(mut self, registry: FinderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn web_access(mut self, web_access: Arc<dyn WebAccess>) -> Self {
        self.web_access = Some(web_access);
        self
    }

    pub fn build(self) -> ThumbnailResult<WebThumbnailer> {
        options::check_options(&self.defaults)?;

        let web_access = match self.web_access {
            Some(web_access) => web_access,
            None => Arc::new(HttpWebAccess::new(&self.config.user_agent)?),
        };

        let server = self
            .server
            .unwrap_or_else(|| ServerContext::from_config(&self.config));

        Ok(WebThumbnailer {
            cache: CacheManager::from_config(&self.config),
            config: self.config,
            defaults: self.defaults,
            server,
            registry: Arc::new(self.registry),
            web_access,
        })
    }
}
