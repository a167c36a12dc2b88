mod default;
mod registry;

use std::sync::Arc;

use async_trait::async_trait;

use crate::options::ResolvedOptions;
use crate::thumbnailer::ThumbnailResult;
use crate::web::WebAccess;

pub use default::{extract_og_image, DefaultFinder};
pub use registry::{FinderFactory, FinderRegistry};

/// Everything a finder is bound to for the duration of one request.
#[derive(Clone)]
pub struct FinderContext {
    pub domain: String,
    pub url: String,
    // Opaque per-domain rules, `Null` for the default finder
    pub rules: serde_json::Value,
    pub options: ResolvedOptions,
    pub web_access: Arc<dyn WebAccess>,
}

/// Turns a user URL into the URL of a thumbnail image.
#[async_trait]
pub trait Finder: Send + Sync {
    /// Candidate thumbnail URL, or `NotFound`.
    async fn find(&self) -> ThumbnailResult<String>;

    /// Whether the found image may be served straight from its origin.
    fn is_hotlink_allowed(&self) -> bool;

    /// Domains used as the cache namespace.
    fn domains(&self) -> Vec<String>;

    fn name(&self) -> &str;
}
